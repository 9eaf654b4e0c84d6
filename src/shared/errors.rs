use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Validation failure carrying per-field messages.
    pub fn validation(details: Vec<String>) -> Self {
        Self::Validation {
            message: "Validation Error".to_string(),
            details,
        }
    }

    /// Validation failure with a single top-level message and no field list.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn lead_not_found(id: i32) -> Self {
        Self::NotFound {
            entity: "Lead",
            id: id.to_string(),
        }
    }

    pub fn duplicate_lead_email() -> Self {
        Self::Conflict("Lead with this email already exists".to_string())
    }

    pub fn duplicate_user_email() -> Self {
        Self::Conflict("User with this email already exists".to_string())
    }

    /// Whether this error came from the store rather than from the caller's input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        DomainError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_keeps_details() {
        let err = DomainError::validation(vec!["Score must be between 0 and 100".into()]);
        assert_eq!(err.to_string(), "Validation Error");
        match err {
            DomainError::Validation { details, .. } => assert_eq!(details.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn not_found_message_names_entity() {
        assert_eq!(DomainError::lead_not_found(7).to_string(), "Lead not found");
    }

    #[test]
    fn duplicate_emails_are_conflicts() {
        let err = DomainError::duplicate_lead_email();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(err.to_string(), "Lead with this email already exists");
        assert_eq!(
            DomainError::duplicate_user_email().to_string(),
            "User with this email already exists"
        );
    }

    #[test]
    fn infra_errors_become_internal() {
        let err: DomainError = InfraError::Crypto("bad key".into()).into();
        assert!(err.is_internal());
    }
}
