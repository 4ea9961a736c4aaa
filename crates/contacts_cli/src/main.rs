//! `contacts` command-line front end.
//!
//! # Responsibility
//! - Parse storage/logging flags and one contact subcommand.
//! - Print the boundary response body as JSON on stdout.
//!
//! Exit status is 0 for 2xx responses, 1 for any other response or a
//! startup failure.

use clap::{Args, Parser, Subcommand};
use contacts_api::{ApiResponse, ContactApi, ContactRequest};
use contacts_core::{
    core_version, init_logging, ContactService, DatabaseConfig, LogLevel, DEFAULT_DATABASE_URI,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "contacts")]
#[command(about = "Contact book backed by SQLite", long_about = None)]
struct Cli {
    /// Storage URI, e.g. `sqlite:///contacts.db` or `sqlite://` for memory
    #[arg(long, default_value = DEFAULT_DATABASE_URI)]
    database_uri: String,

    /// Log every SQL statement (needs --log-dir)
    #[arg(long)]
    echo_sql: bool,

    /// Log level: trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off without it
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all contacts
    List,
    /// Show one contact
    Get { id: i64 },
    /// Create a contact
    Create(ContactFields),
    /// Overwrite every field of a contact
    Update {
        id: i64,
        #[command(flatten)]
        fields: ContactFields,
    },
    /// Delete a contact
    Delete { id: i64 },
    /// Print the core library version
    Version,
}

#[derive(Debug, Args)]
struct ContactFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    surname: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    email: String,
}

impl From<ContactFields> for ContactRequest {
    fn from(fields: ContactFields) -> Self {
        Self {
            name: fields.name,
            surname: fields.surname,
            phone: fields.phone,
            email: fields.email,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(response) => {
            println!("{}", render(&response));
            if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ApiResponse, Box<dyn Error>> {
    if let Some(log_dir) = &cli.log_dir {
        let level = match cli.log_level.as_deref() {
            Some(raw) => raw.parse::<LogLevel>()?,
            None => LogLevel::default(),
        };
        init_logging(level, log_dir)?;
    }

    let open_api = || -> Result<ContactApi, Box<dyn Error>> {
        let config = DatabaseConfig::from_uri(&cli.database_uri)?.echo_sql(cli.echo_sql);
        Ok(ContactApi::new(ContactService::open(&config)?))
    };

    let response = match cli.command {
        Command::Version => ApiResponse {
            status: 200,
            body: serde_json::json!({ "version": core_version() }),
        },
        Command::List => open_api()?.list_contacts(),
        Command::Get { id } => open_api()?.get_contact(id),
        Command::Create(fields) => open_api()?.create_contact(&fields.into()),
        Command::Update { id, fields } => open_api()?.update_contact(id, &fields.into()),
        Command::Delete { id } => open_api()?.delete_contact(id),
    };
    Ok(response)
}

fn render(response: &ApiResponse) -> String {
    serde_json::to_string_pretty(&response.body).unwrap_or_else(|_| response.body.to_string())
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Command};
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("contacts").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn update_takes_id_and_all_fields() {
        let cli = parse(&[
            "update", "7", "--name", "Ada", "--surname", "King", "--phone", "555-123-4567",
            "--email", "ada@example.com",
        ]);
        match cli.command {
            Command::Update { id, fields } => {
                assert_eq!(id, 7);
                assert_eq!(fields.surname, "King");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn create_requires_every_field() {
        let result = Cli::try_parse_from(["contacts", "create", "--name", "Ada"]);
        assert!(result.is_err());
    }

    #[test]
    fn file_store_round_trip_through_subcommands() {
        let dir = tempfile::tempdir().unwrap();
        let uri = format!("sqlite:///{}", dir.path().join("contacts.db").display());

        let created = run(parse(&[
            "--database-uri", uri.as_str(), "create", "--name", "Ada", "--surname", "Lovelace",
            "--phone", "555-123-4567", "--email", "ada@example.com",
        ]))
        .unwrap();
        assert_eq!(created.status, 200);

        let fetched = run(parse(&["--database-uri", uri.as_str(), "get", "1"])).unwrap();
        assert_eq!(fetched.body, created.body);

        let deleted = run(parse(&["--database-uri", uri.as_str(), "delete", "1"])).unwrap();
        assert_eq!(deleted.status, 200);

        let missing = run(parse(&["--database-uri", uri.as_str(), "get", "1"])).unwrap();
        assert_eq!(missing.status, 404);
        assert_eq!(missing.body["detail"], "Contact not found");
    }
}
