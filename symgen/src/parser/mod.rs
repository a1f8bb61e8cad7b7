pub mod pinout;

// Re-export for convenience
pub use pinout::{DeviceTable, PinRow, Pinout, PinoutParseError, PinoutParser};
