//! Flatshop CLI - data directory and user management.
//!
//! # Usage
//!
//! ```bash
//! # Create the empty JSON documents
//! flatshop init --data-dir ./data
//!
//! # Load products and coupons from a YAML file
//! flatshop seed fixtures/shop.yaml
//!
//! # Register a user without going through the API
//! flatshop user create -u alice -p 'correct horse'
//! ```
//!
//! # Commands
//!
//! - `init` - Create missing documents in the data directory
//! - `seed` - Add products and coupons from YAML
//! - `user create` - Register a user
//!
//! `--data-dir` defaults to `FLATSHOP_DATA_DIR`, then `data`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "flatshop")]
#[command(author, version, about = "Flatshop management tools")]
struct Cli {
    /// Directory holding the JSON documents
    #[arg(long, global = true, env = "FLATSHOP_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create any missing documents in the data directory
    Init,
    /// Add products and coupons from a YAML file
    Seed {
        /// YAML file with `products` and `coupons` lists
        file: PathBuf,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a new user
    Create {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long, env = "FLATSHOP_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

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
        Commands::Init => {
            commands::init::run(&cli.data_dir).await?;
        }
        Commands::Seed { file } => {
            commands::seed::run(&cli.data_dir, &file).await?;
        }
        Commands::User { action } => match action {
            UserAction::Create { username, password } => {
                let password = SecretString::from(password);
                commands::user::create(&cli.data_dir, &username, &password).await?;
            }
        },
    }
    Ok(())
}
