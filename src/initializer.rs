use serde_json::Value;
use std::io::Write;
use tokio_util::sync::CancellationToken;

use crate::admin::{AdminErrorKind, ReplicaSetAdmin};
use crate::error::{Result, RsInitError};
use crate::settle::{cancellable, wait_until_ready, SettlePolicy};
use crate::types::{Outcome, ReplicaSetConfig};

/// Brings a replica set member from "never configured" to "initiated".
///
/// Running it against an already initiated member only prints the current
/// status, so repeated runs are safe.
pub struct Initializer<A> {
    admin: A,
    config: ReplicaSetConfig,
    settle: SettlePolicy,
    cancel: CancellationToken,
}

impl<A: ReplicaSetAdmin> Initializer<A> {
    pub fn new(admin: A, config: ReplicaSetConfig) -> Self {
        Self {
            admin,
            config,
            settle: SettlePolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_settle_policy(mut self, settle: SettlePolicy) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn admin(&self) -> &A {
        &self.admin
    }

    /// Check status, initiate if the member has no config yet, then wait.
    ///
    /// Progress lines are written to `out`. Failures are returned, not
    /// written; their `Display` is the operator-facing message. Every admin
    /// call and wait gives way to the cancellation token.
    pub async fn ensure_initialized<W: Write>(&self, out: &mut W) -> Result<Outcome> {
        self.config.validate()?;

        let err = match cancellable(self.admin.replica_set_status(), &self.cancel).await? {
            Ok(status) => {
                tracing::info!(set = %self.config.id, "replica set already initialized");
                writeln!(out, "Replica set already initialized")?;
                print_json(out, &status)?;
                return Ok(Outcome::AlreadyInitialized { status });
            }
            Err(e) => e,
        };

        if err.kind() != AdminErrorKind::NotYetInitialized {
            tracing::error!(
                code = ?err.code,
                code_name = ?err.code_name,
                "replica set status check failed: {}",
                err.message
            );
            return Err(RsInitError::StatusCheck(err));
        }

        tracing::info!(
            set = %self.config.id,
            members = self.config.members.len(),
            "replica set not initialized, initiating"
        );
        writeln!(out, "Initializing replica set...")?;

        let result = cancellable(self.admin.initiate(&self.config), &self.cancel)
            .await?
            .map_err(RsInitError::Initiate)?;

        writeln!(out, "Replica set initialization result:")?;
        print_json(out, &result)?;

        writeln!(out, "Waiting for replica set to be ready...")?;
        wait_until_ready(&self.admin, &self.settle, &self.cancel).await?;

        writeln!(out, "Replica set initialized successfully!")?;
        tracing::info!(set = %self.config.id, "replica set initialized");

        Ok(Outcome::JustInitialized { result })
    }
}

fn print_json<W: Write>(out: &mut W, value: &Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
