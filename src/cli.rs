use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "readsmith")]
#[command(about = "Bilingual README generation straight from your source tree")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a project and generate its README (default command)
    Generate {
        /// Target project directory (defaults to current directory)
        path: Option<PathBuf>,

        /// Main entry file name used to anchor code analysis
        main_file: Option<String>,

        /// Project config file included verbatim in the analysis context
        #[arg(long)]
        include_config: Option<PathBuf>,
    },

    /// Translate a previously generated README to English
    Translate {
        /// Target project directory (defaults to current directory)
        path: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        let command = self.command.unwrap_or(Commands::Generate {
            path: None,
            main_file: None,
            include_config: None,
        });

        match command {
            Commands::Generate { path, main_file, include_config } => {
                engine.generate(path, main_file, include_config).await
            }
            Commands::Translate { path } => {
                engine.translate(path).await
            }
        }
    }
}
