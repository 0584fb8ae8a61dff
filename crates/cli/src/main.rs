//! Soirn CLI - Database migrations and storefront tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! soirn-cli migrate
//!
//! # Validate a product catalog
//! soirn-cli catalog validate crates/storefront/content/catalog.json
//!
//! # Join the waitlist on a running storefront
//! soirn-cli waitlist join --email someone@example.com --source cli
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "soirn-cli")]
#[command(author, version, about = "Soirn storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Product catalog tools
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Waitlist tools
    Waitlist {
        #[command(subcommand)]
        action: WaitlistAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Load and validate a catalog file
    Validate {
        /// Path to the catalog JSON file
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum WaitlistAction {
    /// Submit a waitlist signup to a running storefront
    Join {
        /// Email address to register
        #[arg(short, long)]
        email: String,

        /// Signup source tag
        #[arg(short, long)]
        source: Option<String>,

        /// Storefront base URL
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: Url,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Catalog { action } => match action {
            CatalogAction::Validate { path } => commands::catalog::validate(&path)?,
        },
        Commands::Waitlist { action } => match action {
            WaitlistAction::Join { email, source, url } => {
                let state = commands::waitlist::join(&url, &email, source.as_deref()).await?;
                let message = state.message().unwrap_or_default();

                if matches!(state, soirn_core::SubmissionState::Failed(_)) {
                    return Err(message.into());
                }

                #[allow(clippy::print_stdout)]
                {
                    println!("{message}");
                }
            }
        },
    }
    Ok(())
}
