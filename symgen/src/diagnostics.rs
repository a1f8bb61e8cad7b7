//! Non-fatal findings collected during a conversion.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Symbol the finding belongs to.
    pub device: String,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            device: device.into(),
            message: message.into(),
        }
    }

    pub fn info(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            device: device.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(f, "{} [{}]: {}", level, self.device, self.message)
    }
}
