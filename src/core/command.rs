use async_trait::async_trait;
use crate::core::library::LibraryError;

#[derive(Debug)]
pub enum CommandError {
    Conflict {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Serialization {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
}

impl CommandError {
    pub fn reason_code(&self) -> Option<&str> {
        match self {
            CommandError::Conflict { reason_code, .. } => reason_code.as_deref(),
            CommandError::Database { reason_code, .. } => reason_code.as_deref(),
            CommandError::Runtime { reason_code, .. } => reason_code.as_deref(),
            CommandError::Validation { reason_code, .. } => reason_code.as_deref(),
            _ => None,
        }
    }
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl From<LibraryError> for CommandError {
    fn from(other: LibraryError) -> Self {
        match other {
            LibraryError::Database { message, reason_code, retryable } => {
                CommandError::Database { message, reason_code, retryable }
            }
            LibraryError::DuplicateKey { message } => {
                CommandError::DuplicateKey { message }
            }
            LibraryError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                CommandError::Conflict { message, reason_code, retryable }
            }
            LibraryError::Validation { message, reason_code } => {
                CommandError::Validation { message, reason_code }
            }
            LibraryError::LoanRuleViolation { rule, message } => {
                CommandError::Validation { message, reason_code: Some(rule.to_string()) }
            }
            LibraryError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            LibraryError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code, retryable: true }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::command::CommandError;
    use crate::core::library::{LibraryError, LoanRule};

    #[tokio::test]
    async fn test_should_map_rule_violation_to_validation() {
        let err = CommandError::from(LibraryError::loan_rule(LoanRule::Minor, "too young"));
        assert!(matches!(err, CommandError::Validation { .. }));
        assert_eq!(Some("Minor"), err.reason_code());
    }

    #[tokio::test]
    async fn test_should_map_stale_write_to_conflict() {
        let err = CommandError::from(LibraryError::conflict("stale"));
        assert!(matches!(err, CommandError::Conflict { retryable: true, .. }));
        assert_eq!(Some("409"), err.reason_code());
    }
}
