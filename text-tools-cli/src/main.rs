//! Command-line host for the text tools registry.
//!
//! Tool output goes to stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use text_tools::{TextToolsConfig, Tool, ToolEdit, ToolRegistry};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "text-tools", version, about = "Run and manage text transformation tools")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for custom tools. Overrides the configuration file.
    #[arg(long, global = true, env = "TEXT_TOOLS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List built-in and custom tools.
    List {
        /// Print the catalog as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show a tool, including its code.
    Show { id: String },
    /// Run a tool on a file or on stdin.
    Run {
        id: String,
        /// Read input from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Create a custom tool.
    New {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[command(flatten)]
        code: CodeArgs,
    },
    /// Edit a custom tool.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        code: CodeArgs,
    },
    /// Save a copy of a tool as a new custom tool.
    Clone {
        id: String,
        /// Name for the copy. Defaults to "<name> (Copy)".
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a custom tool.
    Delete { id: String },
    /// Remove every custom tool, including an unreadable record.
    Reset,
}

#[derive(Debug, clap::Args)]
struct CodeArgs {
    /// Tool body. The input is available as `input`.
    #[arg(long, conflicts_with = "code_file")]
    code: Option<String>,

    /// Read the tool body from a file.
    #[arg(long)]
    code_file: Option<PathBuf>,
}

impl CodeArgs {
    async fn resolve(&self) -> Result<Option<String>> {
        match (&self.code, &self.code_file) {
            (Some(code), _) => Ok(Some(code.clone())),
            (None, Some(path)) => {
                let code = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Ok(Some(code))
            }
            (None, None) => Ok(None),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli).await?;
    let registry = ToolRegistry::open(&config).await;

    match cli.command {
        Command::List { json } => {
            let catalog = registry.catalog().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                for tool in &catalog {
                    let marker = if tool.is_custom { "*" } else { " " };
                    println!("{marker} {:<38} {}", tool.id, tool.name);
                }
            }
        }
        Command::Show { id } => {
            let tool = find(&registry, &id).await?;
            println!("{}", serde_json::to_string_pretty(&tool)?);
        }
        Command::Run { id, file } => {
            let tool = find(&registry, &id).await?;
            let input = read_input(file).await?;
            println!("{}", registry.run_tool(&tool, &input));
        }
        Command::New {
            name,
            description,
            code,
        } => {
            let mut tool = registry
                .new_tool()
                .with_name(name)
                .with_description(description);
            if let Some(code) = code.resolve().await? {
                tool = tool.with_code(code);
            }
            tool.validate()?;
            registry.create_or_update_tool(tool.clone()).await?;
            println!("{}", tool.id);
        }
        Command::Edit {
            id,
            name,
            description,
            code,
        } => {
            let edit = ToolEdit {
                name,
                description,
                code: code.resolve().await?,
            };
            registry.edit_tool(&id, edit).await?;
        }
        Command::Clone { id, name } => {
            let original = find(&registry, &id).await?;
            let mut draft = registry.clone_tool(&original);
            if let Some(name) = name {
                draft.name = name;
            }
            draft.validate()?;

            let before = registry.store().load_custom().await.len();
            let custom = registry.create_or_update_tool(draft).await?;
            if custom.len() == before {
                bail!("clone of {id} was not saved");
            }
            if let Some(saved) = custom.last() {
                println!("{}", saved.id);
            }
        }
        Command::Delete { id } => {
            registry.remove_tool(&id).await?;
        }
        Command::Reset => {
            registry.store().reset_custom().await?;
        }
    }

    Ok(())
}

async fn load_config(cli: &Cli) -> Result<TextToolsConfig> {
    let mut config = match &cli.config {
        Some(path) => TextToolsConfig::load(path)
            .await
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TextToolsConfig::default(),
    };
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    Ok(config)
}

async fn find(registry: &ToolRegistry, id: &str) -> Result<Tool> {
    registry
        .get(id)
        .await
        .with_context(|| format!("no tool with id {id}"))
}

async fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}
