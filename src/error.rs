//! Error types for timer operations

use thiserror::Error;

/// Errors raised by [`CodeTimer`](crate::timer::CodeTimer) and its configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimerError {
    #[error("timer {} released without being acquired", display_name(.name))]
    NotStarted { name: Option<String> },

    #[error("threshold must be a finite number, got {0}")]
    InvalidThreshold(f64),
}

fn display_name(name: &Option<String>) -> String {
    match name {
        Some(name) => format!("'{name}'"),
        None => "<unnamed>".to_string(),
    }
}

/// Result alias for timer operations
pub type Result<T> = std::result::Result<T, TimerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_started_message() {
        let named = TimerError::NotStarted {
            name: Some("load".into()),
        };
        assert_eq!(
            named.to_string(),
            "timer 'load' released without being acquired"
        );

        let unnamed = TimerError::NotStarted { name: None };
        assert_eq!(
            unnamed.to_string(),
            "timer <unnamed> released without being acquired"
        );
    }

    #[test]
    fn test_invalid_threshold_message() {
        let err = TimerError::InvalidThreshold(f64::INFINITY);
        assert_eq!(err.to_string(), "threshold must be a finite number, got inf");
    }
}
