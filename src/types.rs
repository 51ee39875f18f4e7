use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{Result, RsInitError};

pub const DEFAULT_SET_NAME: &str = "rs0";
pub const DEFAULT_MEMBER_HOST: &str = "localhost:27017";

/// `myState` value a member reports once it has become PRIMARY.
pub const PRIMARY_STATE: i64 = 1;

/// Replica set configuration document as `replSetInitiate` expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaSetConfig {
    #[serde(rename = "_id")]
    pub id: String,
    pub members: Vec<MemberConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberConfig {
    #[serde(rename = "_id")]
    pub id: u32,
    pub host: String,
}

impl ReplicaSetConfig {
    /// Config with a single seed member at index 0.
    pub fn single_member(set_name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            id: set_name.into(),
            members: vec![MemberConfig {
                id: 0,
                host: host.into(),
            }],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(RsInitError::InvalidConfig(
                "replica set name must not be empty".into(),
            ));
        }
        if self.members.is_empty() {
            return Err(RsInitError::InvalidConfig(
                "at least one member is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for member in &self.members {
            if member.host.trim().is_empty() {
                return Err(RsInitError::InvalidConfig(format!(
                    "member {} has an empty host",
                    member.id
                )));
            }
            if !seen.insert(member.id) {
                return Err(RsInitError::InvalidConfig(format!(
                    "duplicate member id {}",
                    member.id
                )));
            }
        }
        Ok(())
    }
}

impl Default for ReplicaSetConfig {
    fn default() -> Self {
        Self::single_member(DEFAULT_SET_NAME, DEFAULT_MEMBER_HOST)
    }
}

/// Reads `myState` from a `replSetGetStatus` reply.
///
/// Relaxed extended JSON renders the field either as a plain number or as
/// `{"$numberInt": "1"}`, so both shapes are accepted.
pub fn member_state(status: &Value) -> Option<i64> {
    match status.get("myState")? {
        Value::Number(n) => n.as_i64(),
        Value::Object(wrapped) => wrapped
            .get("$numberInt")
            .or_else(|| wrapped.get("$numberLong"))
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok()),
        _ => None,
    }
}

pub fn is_primary(status: &Value) -> bool {
    member_state(status) == Some(PRIMARY_STATE)
}

/// How a run of the initializer ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    AlreadyInitialized { status: Value },
    JustInitialized { result: Value },
}

impl Outcome {
    pub fn is_newly_initialized(&self) -> bool {
        matches!(self, Outcome::JustInitialized { .. })
    }
}
