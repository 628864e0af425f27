use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity understood by the Rollbar API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbarLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl RollbarLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RollbarLevel::Debug => "debug",
            RollbarLevel::Info => "info",
            RollbarLevel::Warning => "warning",
            RollbarLevel::Error => "error",
            RollbarLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RollbarLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_api_names() {
        let levels = [
            RollbarLevel::Debug,
            RollbarLevel::Info,
            RollbarLevel::Warning,
            RollbarLevel::Error,
            RollbarLevel::Critical,
        ];
        for level in levels {
            assert_eq!(
                serde_json::to_string(&level).unwrap(),
                format!("\"{}\"", level.as_str())
            );
        }
    }
}
