pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "spaces")]
#[command(about = "Spaces CLI - Command-line client for the Spaces API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "SPACES_API_URL", default_value = "http://localhost:3000", help = "Base URL of the Spaces API")]
    pub url: String,

    #[arg(long, global = true, env = "SPACES_API_TOKEN", help = "Bearer token sent with every request")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List, read, create, update and delete spaces")]
    Space {
        #[command(subcommand)]
        cmd: commands::space::SpaceCommands,
    },

    #[command(about = "Mint a bearer token signed with SECURITY_JWT_SECRET")]
    Token(commands::token::TokenArgs),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Space { cmd } => {
            let client = client::ApiClient::new(&cli.url, cli.token)?;
            commands::space::handle(cmd, &client, output_format).await
        }
        Commands::Token(args) => commands::token::handle(args, output_format),
    }
}
