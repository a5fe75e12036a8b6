// CLI subcommand handlers
//
// Thin consumers of the engine handle: load constitutions from files, run
// the requested operation, print JSON to stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::load_config;
use crate::constitution::{library, Constitution, PrincipleCategory};
use crate::critique::LoopOptions;
use crate::engine::CritiqueEngine;
use crate::providers::ClaudeGenerator;

#[derive(Parser)]
#[command(name = "tenet", about = "Constitutional critique and revision engine", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Critique an existing response against a constitution
    Critique {
        #[arg(long)]
        prompt: String,
        /// The response to critique
        #[arg(long)]
        response: String,
        /// Constitution JSON file; built-in default when omitted
        #[arg(long)]
        constitution: Option<PathBuf>,
        #[arg(long, default_value_t = 3)]
        max_rounds: usize,
        #[arg(long)]
        model: Option<String>,
    },
    /// Generate a response to a prompt, then critique and revise it
    Pipeline {
        #[arg(long)]
        prompt: String,
        #[arg(long)]
        constitution: Option<PathBuf>,
        #[arg(long, default_value_t = 3)]
        max_rounds: usize,
        #[arg(long)]
        model: Option<String>,
        /// Print progress events as JSON lines instead of one final result
        #[arg(long)]
        stream: bool,
    },
    /// Compare constitutions on the same prompt
    Compare {
        #[arg(long)]
        prompt: String,
        /// Constitution JSON files (repeatable)
        #[arg(long = "constitution", required = true)]
        constitutions: Vec<PathBuf>,
        #[arg(long, default_value_t = 3)]
        max_rounds: usize,
        #[arg(long)]
        model: Option<String>,
    },
    /// List built-in principles
    Principles {
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Safety,
    Honesty,
    Helpfulness,
    Ethics,
    Custom,
}

impl From<CategoryArg> for PrincipleCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Safety => PrincipleCategory::Safety,
            CategoryArg::Honesty => PrincipleCategory::Honesty,
            CategoryArg::Helpfulness => PrincipleCategory::Helpfulness,
            CategoryArg::Ethics => PrincipleCategory::Ethics,
            CategoryArg::Custom => PrincipleCategory::Custom,
        }
    }
}

fn load_constitution(path: Option<&PathBuf>) -> Result<Constitution> {
    match path {
        Some(path) => Constitution::from_file(path),
        None => Ok(library::default_constitution()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

/// Build the engine handle from configuration: one generator, constructed
/// at startup and passed down by handle.
fn build_engine() -> Result<CritiqueEngine> {
    let config = load_config()?;
    let mut generator = ClaudeGenerator::new(config.api_key)?;
    if let Some(model) = config.model {
        generator = generator.with_model(model);
    }
    Ok(CritiqueEngine::new(Arc::new(generator)))
}

/// Dispatch a parsed CLI command.
pub async fn run(cli: Cli) -> Result<()> {
    // Listing principles needs no configuration or network
    if let Command::Principles { category } = &cli.command {
        let principles = match category {
            Some(category) => library::principles_by_category((*category).into()),
            None => library::all_principles(),
        };
        return print_json(&principles);
    }

    let engine = build_engine()?;

    match cli.command {
        Command::Critique {
            prompt,
            response,
            constitution,
            max_rounds,
            model,
        } => {
            let constitution = load_constitution(constitution.as_ref())?;
            let options = LoopOptions::default().with_max_rounds(max_rounds);
            let result = engine
                .critique(&prompt, &response, &constitution, model.as_deref(), &options)
                .await;
            print_json(&result)
        }
        Command::Pipeline {
            prompt,
            constitution,
            max_rounds,
            model,
            stream,
        } => {
            let constitution = load_constitution(constitution.as_ref())?;
            let options = LoopOptions::default().with_max_rounds(max_rounds);

            if stream {
                let mut events =
                    engine.stream_pipeline(&prompt, constitution, model.as_deref(), options);
                while let Some(event) = events.recv().await {
                    println!(
                        "{}",
                        serde_json::to_string(&event).context("Failed to serialize event")?
                    );
                }
                Ok(())
            } else {
                let result = engine
                    .full_pipeline(&prompt, &constitution, model.as_deref(), &options)
                    .await?;
                print_json(&result)
            }
        }
        Command::Compare {
            prompt,
            constitutions,
            max_rounds,
            model,
        } => {
            let constitutions: Vec<Constitution> = constitutions
                .iter()
                .map(Constitution::from_file)
                .collect::<Result<_>>()?;
            let options = LoopOptions::default().with_max_rounds(max_rounds);
            let results = engine
                .compare(&prompt, &constitutions, model.as_deref(), &options)
                .await?;
            print_json(&results)
        }
        Command::Principles { .. } => unreachable!("handled before engine construction"),
    }
}
