//! # rsinit
//!
//! Idempotent bootstrap for a single-member MongoDB replica set.
//!
//! The [`Initializer`] asks a member for its replica set status. A member
//! that answers is left alone. A member that reports it has never received a
//! config is sent `replSetInitiate` with a one-member config, and the
//! initializer then waits for it to settle.
//!
//! The database is reached through the [`ReplicaSetAdmin`] trait, so the
//! flow can run against the MongoDB driver (see the `rsinit-mongo` crate) or
//! against an in-memory fake.
//!
//! ```rust,no_run
//! use rsinit::{AdminError, Initializer, ReplicaSetAdmin, ReplicaSetConfig};
//! use serde_json::{json, Value};
//!
//! struct AlwaysUp;
//!
//! #[async_trait::async_trait]
//! impl ReplicaSetAdmin for AlwaysUp {
//!     async fn replica_set_status(&self) -> Result<Value, AdminError> {
//!         Ok(json!({"set": "rs0", "myState": 1}))
//!     }
//!     async fn initiate(&self, _: &ReplicaSetConfig) -> Result<Value, AdminError> {
//!         Ok(json!({"ok": 1}))
//!     }
//! }
//!
//! # async fn run() -> rsinit::Result<()> {
//! let initializer = Initializer::new(AlwaysUp, ReplicaSetConfig::default());
//! let outcome = initializer.ensure_initialized(&mut std::io::stdout()).await?;
//! assert!(!outcome.is_newly_initialized());
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod config;
pub mod error;
pub mod initializer;
pub mod settle;
pub mod types;

pub use admin::{AdminError, AdminErrorKind, ReplicaSetAdmin};
pub use config::{ConnectionSettings, InitConfig};
pub use error::{Result, RsInitError};
pub use initializer::Initializer;
pub use settle::SettlePolicy;
pub use types::{MemberConfig, Outcome, ReplicaSetConfig};
