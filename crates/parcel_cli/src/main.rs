//! Command-line front end for the parcel tracker.
//!
//! # Responsibility
//! - Map subcommands onto `ParcelService` use cases.
//! - Print one JSON document per invocation on stdout.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use parcel_core::{
    core_version, default_log_level, init_logging, open_db, ClientId, ParcelNumber,
    ParcelRepository, ParcelService, ParcelStatus, SqliteParcelStore,
};
use serde::Serialize;
use std::path::PathBuf;

/// Track parcels stored in a local SQLite database.
#[derive(Parser, Debug)]
#[command(name = "parcel", version = core_version(), about)]
struct Cli {
    /// SQLite database file; created when missing.
    #[arg(long, default_value = "tracker.db")]
    db: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long)]
    log_dir: Option<String>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, requires = "log_dir")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Register a new parcel for a client.
    Register {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        address: String,
    },
    /// Show one parcel.
    Show { number: ParcelNumber },
    /// List all parcels of a client.
    List {
        #[arg(long)]
        client: ClientId,
    },
    /// Advance a parcel to its next status.
    NextStatus { number: ParcelNumber },
    /// Overwrite the status of a parcel.
    SetStatus {
        number: ParcelNumber,
        status: ParcelStatus,
    },
    /// Change the address of a registered parcel.
    SetAddress { number: ParcelNumber, address: String },
    /// Delete a registered parcel.
    Delete { number: ParcelNumber },
}

#[derive(Serialize)]
struct GateOutcome {
    number: ParcelNumber,
    applied: bool,
}

#[derive(Serialize)]
struct StatusOutcome {
    number: ParcelNumber,
    status: Option<ParcelStatus>,
    applied: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            bail!("failed to initialize logging: {err}");
        }
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let service = ParcelService::new(SqliteParcelStore::try_new(&conn)?);

    println!("{}", run(cli.command, &service)?);
    Ok(())
}

fn run<R: ParcelRepository>(
    command: Command,
    service: &ParcelService<R>,
) -> anyhow::Result<String> {
    let output = match command {
        Command::Register { client, address } => {
            serde_json::to_string_pretty(&service.register(client, address)?)?
        }
        Command::Show { number } => serde_json::to_string_pretty(&service.parcel(number)?)?,
        Command::List { client } => {
            serde_json::to_string_pretty(&service.client_parcels(client)?)?
        }
        Command::NextStatus { number } => {
            let status = service.next_status(number)?;
            serde_json::to_string_pretty(&StatusOutcome {
                number,
                status,
                applied: status.is_some(),
            })?
        }
        Command::SetStatus { number, status } => serde_json::to_string_pretty(&StatusOutcome {
            number,
            status: Some(status),
            applied: service.set_status(number, status)?,
        })?,
        Command::SetAddress { number, address } => serde_json::to_string_pretty(&GateOutcome {
            number,
            applied: service.change_address(number, &address)?,
        })?,
        Command::Delete { number } => serde_json::to_string_pretty(&GateOutcome {
            number,
            applied: service.remove(number)?,
        })?,
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Command};
    use clap::{CommandFactory, Parser};
    use parcel_core::{open_db_in_memory, ParcelService, ParcelStatus, SqliteParcelStore};
    use serde_json::Value;
    use std::path::Path;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("parcel").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn version_comes_from_core() {
        let command = Cli::command();
        assert_eq!(command.get_version(), Some(parcel_core::core_version()));
    }

    #[test]
    fn db_defaults_to_tracker_db() {
        let cli = parse(&["show", "1"]).unwrap();
        assert_eq!(cli.db, Path::new("tracker.db"));
        assert_eq!(cli.command, Command::Show { number: 1 });
    }

    #[test]
    fn parses_every_subcommand_shape() {
        let cases: Vec<(Vec<&str>, Command)> = vec![
            (
                vec!["register", "--client", "1000", "--address", "test"],
                Command::Register {
                    client: 1000,
                    address: "test".to_string(),
                },
            ),
            (vec!["list", "--client", "7"], Command::List { client: 7 }),
            (vec!["next-status", "3"], Command::NextStatus { number: 3 }),
            (
                vec!["set-status", "3", "delivered"],
                Command::SetStatus {
                    number: 3,
                    status: ParcelStatus::Delivered,
                },
            ),
            (
                vec!["set-address", "3", "new address"],
                Command::SetAddress {
                    number: 3,
                    address: "new address".to_string(),
                },
            ),
            (vec!["delete", "3"], Command::Delete { number: 3 }),
        ];

        for (args, expected) in cases {
            assert_eq!(parse(&args).unwrap().command, expected, "args: {args:?}");
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(parse(&["set-status", "1", "lost"]).is_err());
    }

    #[test]
    fn log_level_requires_log_dir() {
        assert!(parse(&["--log-level", "bogus", "list", "--client", "1"]).is_err());
        let cli = parse(&["--log-dir", "/tmp/logs", "--log-level", "warn", "show", "1"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn run_reports_applied_only_when_a_row_changed() {
        let conn = open_db_in_memory().unwrap();
        let service = ParcelService::new(SqliteParcelStore::try_new(&conn).unwrap());

        let missing = run(
            Command::SetStatus {
                number: 999,
                status: ParcelStatus::Sent,
            },
            &service,
        )
        .unwrap();
        let missing: Value = serde_json::from_str(&missing).unwrap();
        assert_eq!(missing["applied"], Value::Bool(false));

        let registered = run(
            Command::Register {
                client: 1000,
                address: "test".to_string(),
            },
            &service,
        )
        .unwrap();
        let registered: Value = serde_json::from_str(&registered).unwrap();
        assert_eq!(registered["status"], "registered");
        let number = registered["number"].as_i64().unwrap();

        let sent = run(
            Command::SetStatus {
                number,
                status: ParcelStatus::Sent,
            },
            &service,
        )
        .unwrap();
        let sent: Value = serde_json::from_str(&sent).unwrap();
        assert_eq!(sent["applied"], Value::Bool(true));
        assert_eq!(sent["status"], "sent");

        let blocked = run(
            Command::SetAddress {
                number,
                address: "blocked".to_string(),
            },
            &service,
        )
        .unwrap();
        let blocked: Value = serde_json::from_str(&blocked).unwrap();
        assert_eq!(blocked["applied"], Value::Bool(false));

        let listed = run(Command::List { client: 1000 }, &service).unwrap();
        let listed: Value = serde_json::from_str(&listed).unwrap();
        assert_eq!(listed.as_array().map(Vec::len), Some(1));
        assert_eq!(listed[0]["address"], "test");
    }

    #[test]
    fn run_surfaces_missing_parcel_as_error() {
        let conn = open_db_in_memory().unwrap();
        let service = ParcelService::new(SqliteParcelStore::try_new(&conn).unwrap());

        let err = run(Command::Show { number: 42 }, &service).unwrap_err();
        assert!(err.to_string().contains("parcel not found: 42"));
    }
}
