//! CLI module for MathMentor.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// MathMentor - retrieval-augmented math tutoring
///
/// Answers math questions with a tool-calling LLM backed by a growing
/// knowledge base of solved problems and web search.
#[derive(Parser, Debug)]
#[command(name = "mathmentor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (default from config: 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (default from config: 8010)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask the tutor a math question
    Ask {
        /// The question to ask
        question: String,
    },

    /// Improve an answer based on feedback
    Feedback {
        /// The original question
        question: String,

        /// The answer to improve
        answer: String,

        /// What should change
        feedback: String,
    },

    /// Search the knowledge base for similar solved problems
    Search {
        /// Search query
        query: String,

        /// Maximum number of results (default from config)
        #[arg(short = 'k', long)]
        limit: Option<usize>,
    },

    /// Build the knowledge base from a question/answer dataset
    Seed {
        /// Local JSON or JSONL file with question/answer rows
        /// (default: download the configured Hugging Face dataset)
        #[arg(short, long)]
        input: Option<String>,

        /// Number of rows to index (default from config: 500)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Replace an existing knowledge base
        #[arg(short, long)]
        force: bool,
    },

    /// Benchmark the tutor on a multiple-choice dataset
    Bench {
        /// Maximum number of rows to evaluate (default from config: 20)
        #[arg(short, long)]
        max: Option<usize>,

        /// Local JSON or JSONL file with benchmark rows
        /// (default: download the configured Hugging Face dataset)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Start MCP server exposing the tutor's tools over stdio
    Mcp,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}
