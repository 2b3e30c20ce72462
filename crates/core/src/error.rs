use thiserror::Error;

/// A required field of a [`Message`](crate::Message) is missing.
///
/// Validation stops at the first violation, checked in field order:
/// `from`, `to`, `subject`, `body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The sender address is empty.
    #[error("from address is required")]
    MissingFrom,

    /// The `to` list has no entries.
    #[error("at least one recipient is required")]
    MissingRecipient,

    /// The subject line is empty.
    #[error("subject is required")]
    MissingSubject,

    /// The body is empty.
    #[error("body is required")]
    MissingBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            ValidationError::MissingFrom.to_string(),
            "from address is required"
        );
        assert_eq!(
            ValidationError::MissingRecipient.to_string(),
            "at least one recipient is required"
        );
        assert_eq!(
            ValidationError::MissingSubject.to_string(),
            "subject is required"
        );
        assert_eq!(ValidationError::MissingBody.to_string(), "body is required");
    }
}
