use clap::Parser;
use rsinit::{InitConfig, Initializer, MemberConfig, Outcome, RsInitError};
use rsinit_mongo::MongoAdmin;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize a single-member MongoDB replica set if it has no config yet.
///
/// Flags override values from `--config`; anything left unset falls back to
/// `mongodb://localhost:27017`, set `rs0` and member `localhost:27017`.
#[derive(Parser, Debug)]
#[command(name = "rsinit", version)]
struct Cli {
    /// Connection string of the member to initialize
    #[arg(long, env = "RSINIT_URI")]
    uri: Option<String>,

    /// Replica set name (`_id` of the config)
    #[arg(long, env = "RSINIT_SET_NAME")]
    set_name: Option<String>,

    /// Host of the seed member (`members[0].host`)
    #[arg(long, env = "RSINIT_MEMBER_HOST")]
    member_host: Option<String>,

    /// JSON config file
    #[arg(long, env = "RSINIT_CONFIG")]
    config: Option<PathBuf>,

    /// Fixed wait after initiating, in milliseconds [default: 2000]
    #[arg(long, env = "RSINIT_SETTLE_MS")]
    settle_ms: Option<u64>,

    /// Status polls waiting for PRIMARY after the fixed wait; 0 disables [default: 10]
    #[arg(long, env = "RSINIT_POLL_ATTEMPTS")]
    poll_attempts: Option<u32>,

    /// Server selection timeout for each admin command [default: 30000]
    #[arg(long, env = "RSINIT_SERVER_SELECTION_TIMEOUT_MS")]
    server_selection_timeout_ms: Option<u64>,
}

impl Cli {
    fn into_config(self) -> Result<InitConfig, RsInitError> {
        let mut config = InitConfig::load_or_default(self.config.as_deref())?;

        if let Some(uri) = self.uri {
            config.connection.uri = uri;
        }
        if let Some(ms) = self.server_selection_timeout_ms {
            config.connection.server_selection_timeout_ms = ms;
        }
        if let Some(set_name) = self.set_name {
            config.replica_set.id = set_name;
        }
        if let Some(host) = self.member_host {
            config.replica_set.members = vec![MemberConfig { id: 0, host }];
        }
        if let Some(ms) = self.settle_ms {
            config.settle.delay = Duration::from_millis(ms);
        }
        if let Some(attempts) = self.poll_attempts {
            config.settle.poll_attempts = attempts;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<Outcome, RsInitError> {
    let config = cli.into_config()?;

    tracing::info!(
        uri = %config.connection.uri,
        set = %config.replica_set.id,
        "checking replica set"
    );

    let admin = MongoAdmin::connect(&config.connection)
        .await
        .map_err(RsInitError::Connect)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            on_signal.cancel();
        }
    });

    let initializer = Initializer::new(admin, config.replica_set)
        .with_settle_policy(config.settle)
        .with_cancellation(cancel);

    initializer.ensure_initialized(&mut std::io::stdout()).await
}

/// Both outcomes are a success for the caller; any error is exit 1.
fn exit_code(result: &Result<Outcome, RsInitError>) -> u8 {
    match result {
        Ok(Outcome::AlreadyInitialized { .. }) | Ok(Outcome::JustInitialized { .. }) => 0,
        Err(_) => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = run(cli).await;
    if let Err(e) = &result {
        eprintln!("{}", e);
    }
    ExitCode::from(exit_code(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_success_for_both_outcomes() {
        let already = Ok(Outcome::AlreadyInitialized {
            status: Default::default(),
        });
        let fresh = Ok(Outcome::JustInitialized {
            result: Default::default(),
        });

        assert_eq!(exit_code(&already), 0);
        assert_eq!(exit_code(&fresh), 0);
    }

    #[test]
    fn test_exit_code_failure_for_errors() {
        let status = Err(RsInitError::StatusCheck(rsinit::AdminError::transport(
            "connection refused",
        )));
        let cancelled = Err(RsInitError::Cancelled);

        assert_eq!(exit_code(&status), 1);
        assert_eq!(exit_code(&cancelled), 1);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "rsinit",
            "--set-name",
            "main",
            "--member-host",
            "db-0:27017",
            "--settle-ms",
            "100",
            "--poll-attempts",
            "0",
        ]);

        let config = cli.into_config().unwrap();

        assert_eq!(config.replica_set.id, "main");
        assert_eq!(config.replica_set.members.len(), 1);
        assert_eq!(config.replica_set.members[0].host, "db-0:27017");
        assert_eq!(config.settle.delay, Duration::from_millis(100));
        assert_eq!(config.settle.poll_attempts, 0);
    }
}
