use anyhow::{anyhow, bail, Context, Result};
use conference_bot::config::Config;
use conference_bot::database::connection::{sqlite_path, DatabaseManager};
use std::io::{self, Write};
use std::path::Path;

/// Subcommands of the schema tool.
#[derive(Debug, PartialEq, Eq)]
enum Action {
    Up,
    Status,
    Reset { confirmed: bool },
    Help,
}

impl Action {
    fn parse(args: &[String]) -> Result<Self> {
        let confirmed = args.iter().any(|arg| arg == "--yes");
        match args.first().map(String::as_str) {
            None | Some("up") | Some("migrate") => Ok(Action::Up),
            Some("status") | Some("check") => Ok(Action::Status),
            Some("reset") => Ok(Action::Reset { confirmed }),
            Some("help") | Some("--help") | Some("-h") => Ok(Action::Help),
            Some(other) => bail!("Unknown command: {other}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let action = match Action::parse(&args) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{e}");
            print_help();
            std::process::exit(2);
        }
    };

    match action {
        Action::Help => {
            print_help();
            Ok(())
        }
        Action::Up => {
            let config = Config::from_env()?;
            migrate_up(&config.database_url).await
        }
        Action::Status => {
            let config = Config::from_env()?;
            show_status(&config.database_url).await
        }
        Action::Reset { confirmed } => {
            let config = Config::from_env()?;
            reset(&config.database_url, confirmed).await
        }
    }
}

async fn connect(database_url: &str) -> Result<DatabaseManager> {
    log::info!("Connecting to {}", display_url(database_url));
    DatabaseManager::new(database_url)
        .await
        .context("Could not open the conference database")
}

async fn migrate_up(database_url: &str) -> Result<()> {
    let db = connect(database_url).await?;
    db.run_migrations().await.context("Migration failed")?;

    let applied = db.applied_migrations().await?;
    println!(
        "✅ Schema is up to date ({} migration(s) applied) at {}",
        applied.len(),
        display_url(database_url)
    );
    Ok(())
}

async fn show_status(database_url: &str) -> Result<()> {
    let db = connect(database_url).await?;

    let applied = db.applied_migrations().await?;
    if applied.is_empty() {
        println!("⚠️  No migrations applied to {}", display_url(database_url));
        println!("   Run `migrate up` to create the schema.");
        return Ok(());
    }

    println!("Applied migrations:");
    for (version, description) in applied {
        println!("  {version}  {description}");
    }

    let tables: Vec<String> = db
        .table_names()
        .await?
        .into_iter()
        .filter(|name| !name.starts_with('_'))
        .collect();
    println!("Tables: {}", tables.join(", "));
    Ok(())
}

async fn reset(database_url: &str, confirmed: bool) -> Result<()> {
    let path = sqlite_path(database_url)
        .ok_or_else(|| anyhow!("reset only works with a file-backed SQLite database"))?;

    if !confirmed && !confirm(&format!("Delete {path} and every record in it?"))? {
        println!("Reset cancelled.");
        return Ok(());
    }

    if Path::new(path).exists() {
        std::fs::remove_file(path).with_context(|| format!("Could not delete {path}"))?;
        log::warn!("Deleted database file {path}");
    }

    migrate_up(database_url).await
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} Type 'yes' to continue: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

/// Hides the directory part of file URLs in console output.
fn display_url(database_url: &str) -> String {
    match sqlite_path(database_url).and_then(|path| Path::new(path).file_name()) {
        Some(file_name) => format!("sqlite:.../{}", file_name.to_string_lossy()),
        None => database_url.to_string(),
    }
}

fn print_help() {
    println!("Schema tool for the conference bot database");
    println!();
    println!("USAGE: migrate [up | status | reset [--yes] | help]");
    println!();
    println!("  up            apply pending migrations (default)");
    println!("  status        list applied migrations and tables");
    println!("  reset         delete the SQLite file and migrate from scratch");
    println!();
    println!("DATABASE_URL selects the database (default sqlite:./data/conference.db).");
}
