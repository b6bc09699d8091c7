//! Product catalog CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (catalog schema and session table)
//! catalog-cli migrate
//!
//! # Seed roles and the super admin
//! catalog-cli seed
//!
//! # Create a user (add --admin for the Admin role)
//! catalog-cli user create -e jane@example.com -f Jane -l Doe --admin
//!
//! # List users with their role
//! catalog-cli user list
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(author, version, about = "Product catalog CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed roles and the configured super admin
    Seed,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// First name
        #[arg(short, long)]
        first_name: String,

        /// Last name
        #[arg(short, long)]
        last_name: String,

        /// Initial password
        #[arg(long, env = "CATALOG_USER_PASSWORD", hide_env_values = true)]
        password: String,

        /// Grant the Admin role in addition to User
        #[arg(long)]
        admin: bool,
    },
    /// List users with their role
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                first_name,
                last_name,
                password,
                admin,
            } => {
                commands::user::create(&email, &first_name, &last_name, password, admin).await?;
            }
            UserAction::List => commands::user::list().await?,
        },
    }
    Ok(())
}
