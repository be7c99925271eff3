//! Deployment init-check tool.
//!
//! This binary connects to an Atlas-style deployment with the configured
//! credentials and answers whether the target collection is safe to
//! initialize, or simply whether the deployment is reachable.
//!
//! # Security Guarantees
//! - The password comes from an environment variable or a hidden prompt,
//!   never from a command-line argument
//! - No credentials stored or logged; connection targets are redacted

use atlaslink_core::{
    ClientSession, ConnectionConfig, InitCheck, Result, error::AtlasLinkError, init_logging,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "atlaslink-check")]
#[command(about = "Collection init-check tool for Atlas-style deployments")]
#[command(version)]
#[command(long_about = "
atlaslink-check - Collection init-check for managed document-store deployments

This tool builds a TLS-enforced session against a DNS-seed-list endpoint and
answers the question every initializer has to ask first: is the target
collection safe to populate?

OUTCOMES:
- database missing      (legacy code 1, may initialize)
- collection missing    (legacy code 2, may initialize)
- collection empty      (legacy code 3, may initialize)
- collection non-empty  (legacy code 0, must not initialize)

SECURITY FEATURES:
- Password read from the environment or a hidden prompt, never argv
- Credential-free logging and error output

EXAMPLES:
  atlaslink-check --endpoint cluster0.abcde.mongodb.net --user app \\
      --database appdb --collection records check
  ATLASLINK_PASSWORD=... atlaslink-check check --json
  atlaslink-check ping
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub target: TargetArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

#[derive(Args)]
pub struct TargetArgs {
    /// Cluster endpoint
    #[arg(
        long,
        env = "ATLASLINK_ENDPOINT",
        help = "DNS seed-list hostname, e.g. cluster0.abcde.mongodb.net"
    )]
    pub endpoint: String,

    /// Database user
    #[arg(long, env = "ATLASLINK_USER", help = "Database user")]
    pub user: String,

    /// Environment variable holding the password
    #[arg(
        long,
        default_value = "ATLASLINK_PASSWORD",
        help = "Environment variable holding the password; prompts when unset"
    )]
    pub password_env: String,

    /// Target database name
    #[arg(long, env = "ATLASLINK_DATABASE", help = "Target database name")]
    pub database: String,

    /// Target collection name
    #[arg(long, env = "ATLASLINK_COLLECTION", help = "Target collection name")]
    pub collection: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the init check against the target collection
    Check(CheckArgs),
    /// Verify the deployment is reachable with the configured credentials
    Ping,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Emit a JSON report
    #[arg(long, help = "Emit a machine-readable JSON report instead of text")]
    pub json: bool,
}

/// Machine-readable init-check report.
#[derive(Serialize)]
struct CheckReport {
    target: String,
    outcome: InitCheck,
    legacy_code: u8,
    can_initialize: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let result = match &cli.command {
        Command::Check(args) => run_check(&cli.target, args).await,
        Command::Ping => run_ping(&cli.target).await,
    };

    if let Err(error) = result {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }

    Ok(())
}

/// Reads the password from the named environment variable, falling back to a
/// hidden interactive prompt. The password never appears on the command line.
fn read_password(password_env: &str) -> Result<String> {
    if let Ok(password) = std::env::var(password_env)
        && !password.is_empty()
    {
        return Ok(password);
    }

    rpassword::prompt_password("Password: ")
        .map_err(|e| AtlasLinkError::configuration(format!("Failed to read password: {}", e)))
}

/// Builds the session for the configured target.
async fn connect(target: &TargetArgs) -> Result<ClientSession> {
    let password = read_password(&target.password_env)?;

    let config = ConnectionConfig::new(
        target.endpoint.clone(),
        target.user.clone(),
        password,
        target.database.clone(),
        target.collection.clone(),
    );

    info!("Connecting to {}", config);

    ClientSession::new(config).await.map_err(|e| {
        error!("Failed to construct client session: {}", e);
        e
    })
}

/// Runs the init check and prints the outcome.
async fn run_check(target: &TargetArgs, args: &CheckArgs) -> Result<()> {
    let session = connect(target).await?;

    let outcome = session.collection_init_check().await.map_err(|e| {
        error!("Init check failed: {}", e);
        e
    })?;

    info!("✓ Init check completed");

    if args.json {
        let report = CheckReport {
            target: format!("{}.{}", target.database, target.collection),
            outcome,
            legacy_code: outcome.legacy_code(),
            can_initialize: outcome.can_initialize(),
        };

        let rendered = serde_json::to_string_pretty(&report).map_err(|e| {
            AtlasLinkError::configuration(format!("Failed to serialize report: {}", e))
        })?;
        println!("{}", rendered);
    } else {
        println!("Target: {}.{}", target.database, target.collection);
        println!("Outcome: {} (legacy code {})", outcome, outcome.legacy_code());
        if outcome.can_initialize() {
            println!("Initialization may proceed");
        } else {
            println!("Collection already holds data; initialization must not proceed");
        }
    }

    Ok(())
}

/// Pings the deployment and reports reachability.
async fn run_ping(target: &TargetArgs) -> Result<()> {
    let session = connect(target).await?;

    session.ping().await.map_err(|e| {
        error!("Ping failed: {}", e);
        e
    })?;

    info!("✓ Deployment reachable");
    println!("Deployment {} is reachable", target.endpoint);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_target_args_fall_back_to_environment() {
        temp_env::with_vars(
            [
                ("ATLASLINK_ENDPOINT", Some("cluster0.example.net")),
                ("ATLASLINK_USER", Some("app_user")),
                ("ATLASLINK_DATABASE", Some("appdb")),
                ("ATLASLINK_COLLECTION", Some("records")),
            ],
            || {
                let cli = Cli::try_parse_from(["atlaslink-check", "check"]).unwrap();

                assert_eq!(cli.target.endpoint, "cluster0.example.net");
                assert_eq!(cli.target.user, "app_user");
                assert_eq!(cli.target.database, "appdb");
                assert_eq!(cli.target.collection, "records");
                assert_eq!(cli.target.password_env, "ATLASLINK_PASSWORD");
                assert!(matches!(cli.command, Command::Check(CheckArgs { json: false })));
            },
        );
    }

    #[test]
    fn test_flags_override_environment() {
        temp_env::with_vars(
            [
                ("ATLASLINK_ENDPOINT", Some("cluster0.example.net")),
                ("ATLASLINK_USER", Some("app_user")),
                ("ATLASLINK_DATABASE", Some("appdb")),
                ("ATLASLINK_COLLECTION", Some("records")),
            ],
            || {
                let cli = Cli::try_parse_from([
                    "atlaslink-check",
                    "--database",
                    "otherdb",
                    "check",
                    "--json",
                ])
                .unwrap();

                assert_eq!(cli.target.database, "otherdb");
                assert!(matches!(cli.command, Command::Check(CheckArgs { json: true })));
            },
        );
    }

    #[test]
    fn test_password_read_from_named_env_var() {
        temp_env::with_var("CHECK_TEST_PASSWORD", Some("s3cret"), || {
            let password = read_password("CHECK_TEST_PASSWORD").unwrap();
            assert_eq!(password, "s3cret");
        });
    }

    #[test]
    fn test_check_report_serialization() {
        let report = CheckReport {
            target: "appdb.records".to_string(),
            outcome: InitCheck::DatabaseMissing,
            legacy_code: InitCheck::DatabaseMissing.legacy_code(),
            can_initialize: true,
        };

        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["target"], "appdb.records");
        assert_eq!(value["outcome"], "database_missing");
        assert_eq!(value["legacy_code"], 1);
        assert_eq!(value["can_initialize"], true);
    }
}
