//! Bewear CLI - Database migrations, catalog seeding and account tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! bw-cli migrate
//!
//! # Load (or refresh) the catalog
//! bw-cli seed catalog --file crates/cli/seeds/catalog.yaml
//!
//! # Create a customer account
//! bw-cli user create -e jane@example.com -n "Jane Doe" --password 'correct horse'
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bw-cli")]
#[command(author, version, about = "Bewear CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage customer accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert categories, products and variants from a YAML file
    Catalog {
        /// Path to the catalog YAML file
        #[arg(short, long, default_value = "crates/cli/seeds/catalog.yaml")]
        file: String,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a password account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (at least 8 characters)
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file } => {
                commands::seed::catalog(&file).await?;
            }
        },
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
            } => commands::user::create(&name, &email, &password).await?,
        },
    }
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
    fn test_seed_catalog_default_file() {
        let cli = Cli::try_parse_from(["bw-cli", "seed", "catalog"]).unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Commands::Seed {
                target: SeedTarget::Catalog { file },
            } => assert_eq!(file, "crates/cli/seeds/catalog.yaml"),
            _ => panic!("expected seed catalog"),
        }
    }
}
