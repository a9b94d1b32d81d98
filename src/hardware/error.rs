use thiserror::Error;

/// Why a hardware enumeration tool produced no data.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{tool} not found! Please install {package}.")]
    ToolMissing {
        tool: &'static str,
        package: &'static str,
    },

    #[error("{tool} failed: {reason}")]
    ExecutionFailed { tool: &'static str, reason: String },
}

impl ProbeError {
    pub fn code(&self) -> &'static str {
        match self {
            ProbeError::ToolMissing { .. } => "hardware.tool.missing",
            ProbeError::ExecutionFailed { .. } => "hardware.tool.failed",
        }
    }
}
