//! Pur Beurre CLI - Database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (schema + session table)
//! pur-beurre migrate
//!
//! # Create a user (password read from PUR_BEURRE_NEW_USER_PASSWORD)
//! pur-beurre user create -e user@test.fr -u user
//!
//! # List a user's favorite substitutes
//! pur-beurre favorites list -e user@test.fr
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pur-beurre")]
#[command(author, version, about = "Pur Beurre CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Inspect favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address (login)
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        username: String,
    },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List a user's favorites, newest first
    List {
        /// Email address of the user
        #[arg(short, long)]
        email: String,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create { email, username } => {
                commands::user::create(&email, &username).await?;
            }
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List { email } => commands::favorites::list(&email).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_user_create() {
        let cli = Cli::try_parse_from([
            "pur-beurre",
            "user",
            "create",
            "-e",
            "user@test.fr",
            "-u",
            "user",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::User {
                action: UserAction::Create { .. }
            })
        ));
    }
}
