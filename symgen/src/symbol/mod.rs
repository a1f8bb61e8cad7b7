//! Symbol construction pipeline.
//!
//! ```text
//!  PinRecord ──► Device (group resolver) ──► EdgeClassifier ──► LayoutEngine ──► SymbolEmitter
//!               add_pin / seal              edge per group     coordinates      DEF block text
//! ```
//!
//! Each stage takes the [`SymbolConfig`](crate::config::SymbolConfig) by
//! reference and owns no global state.

pub mod classify;
pub mod device;
pub mod emit;
pub mod layout;
pub mod patterns;
pub mod pin;

pub use classify::{EdgeClassifier, EdgeLoads};
pub use device::{unit_letter, Device, DeviceError, PinGroup};
pub use emit::{symbol_name, SymbolEmitter};
pub use layout::{DrawItem, Layout, LayoutEngine, LayoutError, Point};
pub use patterns::{PatternBook, PatternSet};
pub use pin::{Edge, Orientation, PinRecord, PinShape};
