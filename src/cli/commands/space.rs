use anyhow::Context;
use clap::Subcommand;
use reqwest::Method;
use serde_json::Value;
use std::io::Read;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_space, output_spaces, output_success};
use crate::cli::OutputFormat;

const SPACES_PATH: &str = "/api/spaces/space";

#[derive(Subcommand)]
pub enum SpaceCommands {
    #[command(about = "List all spaces")]
    List,

    #[command(about = "Show a single space")]
    Get {
        #[arg(help = "Space ID")]
        id: String,
    },

    #[command(about = "Create a space from a JSON definition on stdin")]
    Create,

    #[command(about = "Update a space from a JSON definition on stdin")]
    Update {
        #[arg(help = "Space ID to update")]
        id: String,
    },

    #[command(about = "Delete a space")]
    Delete {
        #[arg(help = "Space ID to delete")]
        id: String,
    },
}

fn read_stdin_json() -> anyhow::Result<Value> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read space definition from stdin")?;
    serde_json::from_str(&input).context("stdin is not valid JSON")
}

fn space_path(id: &str) -> String {
    format!("{}/{}", SPACES_PATH, id)
}

pub async fn handle(
    cmd: SpaceCommands,
    client: &ApiClient,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        SpaceCommands::List => {
            let body = client.send(Method::GET, SPACES_PATH, None).await?;
            let spaces = body.unwrap_or(Value::Array(vec![]));
            output_spaces(output_format, &spaces)
        }
        SpaceCommands::Get { id } => {
            let body = client.send(Method::GET, &space_path(&id), None).await?;
            output_space(output_format, &body.unwrap_or(Value::Null))
        }
        SpaceCommands::Create => {
            let definition = read_stdin_json()?;
            let body = client.send(Method::POST, SPACES_PATH, Some(&definition)).await?;
            output_space(output_format, &body.unwrap_or(Value::Null))
        }
        SpaceCommands::Update { id } => {
            let definition = read_stdin_json()?;
            let body = client
                .send(Method::PUT, &space_path(&id), Some(&definition))
                .await?;
            output_space(output_format, &body.unwrap_or(Value::Null))
        }
        SpaceCommands::Delete { id } => {
            client.send(Method::DELETE, &space_path(&id), None).await?;
            output_success(output_format, &format!("Deleted space '{}'", id))
        }
    }
}
