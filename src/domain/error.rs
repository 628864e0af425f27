use crate::encoder::EncodeError;
use crate::rollbar::ClientError;
use thiserror::Error;

/// Error type returned by every `Core` operation.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Encoding(#[from] EncodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("{} core errors: {}", .0.len(), join_errors(.0))]
    Multiple(Vec<CoreError>),
}

impl CoreError {
    /// Folds the errors of several cores into one result.
    pub fn combine(mut errors: Vec<CoreError>) -> Result<(), CoreError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(CoreError::Multiple(errors)),
        }
    }
}

fn join_errors(errors: &[CoreError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_empty_is_ok() {
        assert!(CoreError::combine(Vec::new()).is_ok());
    }

    #[test]
    fn test_combine_single_error_is_not_wrapped() {
        let result = CoreError::combine(vec![CoreError::Configuration("bad".into())]);
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_combine_multiple_errors() {
        let result = CoreError::combine(vec![
            CoreError::Configuration("first".into()),
            CoreError::Io(std::io::Error::other("second")),
        ]);
        let err = result.unwrap_err();
        assert!(matches!(err, CoreError::Multiple(ref errors) if errors.len() == 2));
        assert_eq!(
            err.to_string(),
            "2 core errors: Configuration error: first; second"
        );
    }
}
