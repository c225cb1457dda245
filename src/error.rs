//! Error types for motion beat extraction
//!
//! Only malformed input and invalid configuration are errors. Degenerate
//! signals (empty clips, zero variance, too few events, no overlap between
//! audio and motion) are absorbed by each component and produce an empty or
//! neutral result instead.

use thiserror::Error;

/// Errors that can occur while loading, resolving or analysing a clip
#[derive(Error, Debug)]
pub enum MotionError {
    /// The BVH hierarchy section could not be parsed
    #[error("Malformed hierarchy at line {line}: {message}")]
    Hierarchy {
        /// 1-based line number inside the file
        line: usize,
        /// What went wrong
        message: String,
    },

    /// A joint declares an unusable channel layout
    #[error("Invalid channels for joint '{joint}': {message}")]
    Channels {
        /// Joint name
        joint: String,
        /// What went wrong
        message: String,
    },

    /// The MOTION section is malformed
    #[error("Malformed motion data: {0}")]
    Motion(String),

    /// The joint hierarchy cannot be resolved in parent-before-child order
    #[error("Invalid topology at joint '{joint}': {message}")]
    Topology {
        /// Joint name
        joint: String,
        /// What went wrong
        message: String,
    },

    /// Invalid input arrays (shape mismatch, non-monotonic time axis, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration validation failed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Wrapper around standard IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias carrying [`MotionError`]
pub type Result<T> = std::result::Result<T, MotionError>;

impl MotionError {
    /// Create a hierarchy error at the given line.
    pub fn hierarchy(line: usize, msg: impl Into<String>) -> Self {
        Self::Hierarchy {
            line,
            message: msg.into(),
        }
    }

    /// Create a channel layout error for a joint.
    pub fn channels(joint: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Channels {
            joint: joint.into(),
            message: msg.into(),
        }
    }

    /// Create a motion section error.
    pub fn motion(msg: impl Into<String>) -> Self {
        Self::Motion(msg.into())
    }

    /// Create a topology error for a joint.
    pub fn topology(joint: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Topology {
            joint: joint.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether the error stems from a malformed input file (as opposed to a
    /// caller-side configuration or shape problem).
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::Hierarchy { .. } | Self::Channels { .. } | Self::Motion(_) | Self::Topology { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_context() {
        let err = MotionError::hierarchy(12, "unbalanced braces");
        let text = err.to_string();
        assert!(text.contains("12"), "line number missing: {}", text);
        assert!(text.contains("unbalanced"), "message missing: {}", text);

        let err = MotionError::channels("LeftKnee", "expected 3 or 6 channels, got 4");
        assert!(err.to_string().contains("LeftKnee"));
    }

    #[test]
    fn test_malformed_input_classification() {
        assert!(MotionError::motion("no frames").is_malformed_input());
        assert!(MotionError::topology("Hips", "second root").is_malformed_input());
        assert!(!MotionError::invalid_config("smooth_win = 0").is_malformed_input());
        assert!(!MotionError::invalid_input("length mismatch").is_malformed_input());
    }
}
