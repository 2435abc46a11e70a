use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use favorite_eats::config::{AppConfig, ENV_DATABASE_PATH};
use favorite_eats::editor::{Direction, EditTarget, KeyCommand};
use favorite_eats::{EditSession, RecipeStore};

#[derive(Parser, Debug)]
#[command(name = "favorite-eats", version, about = "Browse and edit recipes")]
struct Cli {
    /// Path to the recipe database
    #[arg(long, env = ENV_DATABASE_PATH)]
    db: Option<PathBuf>,

    /// Skip the pre-save backup
    #[arg(long)]
    no_backup: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List recipes, optionally filtered by title
    List { query: Option<String> },
    /// Print a rendered recipe
    Show {
        id: i64,
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the text of one step
    EditStep {
        id: i64,
        section: usize,
        step: usize,
        text: String,
    },
    /// Move a step up or down within its section
    MoveStep {
        id: i64,
        section: usize,
        step: usize,
        #[arg(value_enum)]
        direction: MoveDirection,
    },
    /// Renumber all steps 1..N and save
    Renumber { id: i64 },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MoveDirection {
    Up,
    Down,
}

impl From<MoveDirection> for Direction {
    fn from(value: MoveDirection) -> Self {
        match value {
            MoveDirection::Up => Direction::Up,
            MoveDirection::Down => Direction::Down,
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = AppConfig::from_env()?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    if cli.no_backup {
        config.backup.enabled = false;
    }

    info!("Starting Favorite Eats v{}", env!("CARGO_PKG_VERSION"));
    let store = RecipeStore::open(&config)
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;

    if let Err(e) = run(&store, cli.command).await {
        error!("{e:#}");
        return Err(e);
    }
    Ok(())
}

async fn run(store: &RecipeStore, command: Command) -> Result<()> {
    match command {
        Command::List { query } => {
            for recipe in store.list_recipes(query.as_deref()).await? {
                println!("{:>5}  {}", recipe.id, recipe.title);
            }
        }
        Command::Show { id, json } => {
            let view = favorite_eats::render_recipe(&store.load_recipe(id).await?);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("{}\n\n{}", view.title, view.to_text());
            }
        }
        Command::EditStep {
            id,
            section,
            step,
            text,
        } => {
            let mut session = EditSession::new(store.load_recipe(id).await?);
            session.begin_edit(EditTarget::StepText { section, step })?;
            session.set_input(&text)?;
            session.handle_key(KeyCommand::Enter)?;
            report(session.save(store).await?, id);
        }
        Command::MoveStep {
            id,
            section,
            step,
            direction,
        } => {
            let mut session = EditSession::new(store.load_recipe(id).await?);
            session.select_step(section, step)?;
            session.handle_key(KeyCommand::MoveStep(direction.into()))?;
            report(session.save(store).await?, id);
        }
        Command::Renumber { id } => {
            let mut session = EditSession::new(store.load_recipe(id).await?);
            session.renumber_steps();
            report(session.save(store).await?, id);
        }
    }
    Ok(())
}

fn report(saved: bool, id: i64) {
    if saved {
        println!("Saved recipe {id}");
    } else {
        println!("No changes to recipe {id}");
    }
}
