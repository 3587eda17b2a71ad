use thiserror::Error;

/// Reasons a scan is rejected as a whole. A rejected scan never touches the map.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    /// The scan or the pose contains values that cannot be projected (NaN or negative ranges,
    /// a non-finite pose, a sensor origin too far away to be expressed as a cell).
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
}

impl ScanError {
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateInput(reason.into())
    }
}

/// Errors found while validating a [`crate::GridMapConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
