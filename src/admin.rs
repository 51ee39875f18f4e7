use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::types::ReplicaSetConfig;

/// Server error code for "NotYetInitialized".
pub const NOT_YET_INITIALIZED_CODE: i32 = 94;

const NOT_YET_INITIALIZED_MESSAGES: [&str; 2] =
    ["no replset config has been received", "NotYetInitialized"];

/// Administrative operations the initializer needs from a replica set member.
#[async_trait]
pub trait ReplicaSetAdmin: Send + Sync {
    /// `replSetGetStatus`
    async fn replica_set_status(&self) -> Result<Value, AdminError>;

    /// `replSetInitiate`
    async fn initiate(&self, config: &ReplicaSetConfig) -> Result<Value, AdminError>;
}

#[async_trait]
impl<A: ReplicaSetAdmin + ?Sized> ReplicaSetAdmin for std::sync::Arc<A> {
    async fn replica_set_status(&self) -> Result<Value, AdminError> {
        (**self).replica_set_status().await
    }

    async fn initiate(&self, config: &ReplicaSetConfig) -> Result<Value, AdminError> {
        (**self).initiate(config).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminErrorKind {
    NotYetInitialized,
    Other,
}

/// Failure reported by the admin interface.
///
/// `code` and `code_name` are present when the server answered with a
/// command error; transport failures only carry a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminError {
    pub code: Option<i32>,
    pub code_name: Option<String>,
    pub message: String,
}

impl AdminError {
    pub fn command(code: i32, code_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            code_name: Some(code_name.into()),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            code: None,
            code_name: None,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> AdminErrorKind {
        if self.code == Some(NOT_YET_INITIALIZED_CODE)
            || self.code_name.as_deref() == Some("NotYetInitialized")
        {
            return AdminErrorKind::NotYetInitialized;
        }

        // Message text is only consulted when the server gave no code.
        if self.code.is_none()
            && self.code_name.is_none()
            && NOT_YET_INITIALIZED_MESSAGES
                .iter()
                .any(|needle| self.message.contains(needle))
        {
            return AdminErrorKind::NotYetInitialized;
        }

        AdminErrorKind::Other
    }

    pub fn is_not_yet_initialized(&self) -> bool {
        self.kind() == AdminErrorKind::NotYetInitialized
    }
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code_name, self.code) {
            (Some(name), Some(code)) => write!(f, "{} ({} {})", self.message, name, code),
            (None, Some(code)) => write!(f, "{} (code {})", self.message, code),
            _ => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for AdminError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_code() {
        let err = AdminError::command(94, "NotYetInitialized", "whatever the server says");
        assert_eq!(err.kind(), AdminErrorKind::NotYetInitialized);

        let err = AdminError {
            code: Some(94),
            code_name: None,
            message: String::new(),
        };
        assert!(err.is_not_yet_initialized());
    }

    #[test]
    fn test_code_wins_over_message() {
        let err = AdminError::command(
            13,
            "Unauthorized",
            "NotYetInitialized appears in this text but the code says otherwise",
        );
        assert_eq!(err.kind(), AdminErrorKind::Other);
    }

    #[test]
    fn test_message_fallback_without_code() {
        assert!(AdminError::transport("no replset config has been received").is_not_yet_initialized());
        assert!(AdminError::transport("error: NotYetInitialized").is_not_yet_initialized());
        assert!(!AdminError::transport("connection refused").is_not_yet_initialized());
    }

    #[test]
    fn test_display() {
        let err = AdminError::command(94, "NotYetInitialized", "no replset config has been received");
        assert_eq!(
            err.to_string(),
            "no replset config has been received (NotYetInitialized 94)"
        );
        assert_eq!(AdminError::transport("connection refused").to_string(), "connection refused");
    }
}
