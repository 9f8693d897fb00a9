//! CLI module for the CM3588 assistant.
//!
//! Subcommands:
//! - `mcp`: Run the MCP server (stdio transport)
//! - `init`: Create the collections, optionally seed built-in knowledge
//! - `embedding`: Embedding model management

mod embedding;
mod init;
mod mcp;

use clap::{Parser, Subcommand};

pub use embedding::EmbeddingCommand;

/// CM3588 NAS assistant - knowledge base, changelog and device control over MCP
#[derive(Parser)]
#[command(name = "cm3588-mcp")]
#[command(about = "MCP server with a semantic knowledge base and changelog for a CM3588 NAS")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the MCP server (stdio transport)
    Mcp,

    /// Create the knowledge and changelog collections
    Init {
        /// Also save the built-in knowledge entries
        #[arg(long)]
        seed: bool,
    },

    /// Embedding model management
    Embedding {
        #[command(subcommand)]
        command: EmbeddingCommand,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Mcp => self.run_mcp().await,
            Command::Init { seed } => self.run_init(seed).await,
            Command::Embedding { ref command } => command.run().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_init_with_seed() {
        let app = App::try_parse_from(["cm3588-mcp", "-v", "init", "--seed"]).unwrap();
        assert!(app.verbose);
        assert!(matches!(app.command, Command::Init { seed: true }));
    }

    #[test]
    fn test_parse_embedding_warmup() {
        let app = App::try_parse_from(["cm3588-mcp", "embedding", "warmup"]).unwrap();
        assert!(!app.verbose);
        assert!(matches!(
            app.command,
            Command::Embedding {
                command: EmbeddingCommand::Warmup
            }
        ));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(App::try_parse_from(["cm3588-mcp", "serve"]).is_err());
    }
}
