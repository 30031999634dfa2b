use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use platform_config::{AppRef, ConfigStore, Patch, VarName};
use platform_config_settings::{BackendType, Settings};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Manage versioned config vars for platform applications
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Storage backend (memory or postgres)
    #[arg(long, env = "CONFIG_STORE_BACKEND")]
    backend: Option<BackendType>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print plain NAME=value lines instead of JSON
    #[arg(long)]
    shell: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current config of an application
    Show { app: String },
    /// Show a config record by id
    Get { id: Uuid },
    /// Set one or more variables (NAME=value)
    Set {
        app: String,
        #[arg(required = true, value_parser = parse_assignment)]
        vars: Vec<(VarName, String)>,
    },
    /// Unset one or more variables
    Unset {
        app: String,
        #[arg(required = true)]
        names: Vec<VarName>,
    },
    /// List config versions, newest first
    History {
        app: String,
        #[arg(long)]
        limit: Option<u32>,
    },
}

fn parse_assignment(raw: &str) -> Result<(VarName, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=value, got '{}'", raw))?;
    let name = VarName::new(name).map_err(|e| e.to_string())?;
    Ok((name, value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = load_settings(&args)?;
    info!(backend = ?settings.backend_type, "Opening config store");

    let store = ConfigStore::from_settings(&settings)
        .await
        .context("Failed to open config store")?;

    run(&store, &args).await
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::from_env().context("Invalid config store settings")?;
    if let Some(backend) = args.backend {
        settings.backend_type = backend;
    }
    if let Some(url) = &args.database_url {
        settings.database_url = url.clone();
    }
    settings.validate()?;
    Ok(settings)
}

async fn run(store: &ConfigStore, args: &Args) -> Result<()> {
    let record = match &args.command {
        Command::Show { app } => store.current(&AppRef::new(app.as_str())?).await?,
        Command::Get { id } => store.get(*id).await?,
        Command::Set { app, vars } => {
            let patch = vars
                .iter()
                .fold(Patch::new(), |patch, (name, value)| {
                    patch.set(name.clone(), value.as_str())
                });
            store.apply(&AppRef::new(app.as_str())?, &patch).await?
        }
        Command::Unset { app, names } => {
            let patch = names
                .iter()
                .fold(Patch::new(), |patch, name| patch.unset(name.clone()));
            store.apply(&AppRef::new(app.as_str())?, &patch).await?
        }
        Command::History { app, limit } => {
            let history = store.history(&AppRef::new(app.as_str())?, *limit).await?;
            let entries: Vec<_> = history
                .iter()
                .map(|record| {
                    json!({
                        "id": record.id,
                        "version": record.version,
                        "vars": record.vars.len(),
                        "checksum": record.checksum(),
                        "created_at": record.created_at,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }
    };

    if args.shell {
        for line in record.vars.to_env_lines() {
            println!("{}", line);
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&record)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let (name, value) = parse_assignment("DATABASE_URL=postgres://a=b").unwrap();
        assert_eq!(name.as_str(), "DATABASE_URL");
        assert_eq!(value, "postgres://a=b");

        let (_, empty) = parse_assignment("EMPTY=").unwrap();
        assert_eq!(empty, "");

        assert!(parse_assignment("NO_EQUALS").is_err());
        assert!(parse_assignment("1BAD=x").is_err());
    }

    #[test]
    fn test_args_parse_set_and_unset() {
        let args = Args::try_parse_from(["platform-config", "set", "acme", "A=1", "B=2"]).unwrap();
        match args.command {
            Command::Set { app, vars } => {
                assert_eq!(app, "acme");
                assert_eq!(vars.len(), 2);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let args = Args::try_parse_from(["platform-config", "unset", "acme", "A"]).unwrap();
        assert!(matches!(args.command, Command::Unset { .. }));

        assert!(Args::try_parse_from(["platform-config", "unset", "acme", "9X"]).is_err());
    }
}
