use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "parley", version, about = "Parley LLM Chat Client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,

    /// Load environment variables from this file instead of `.env`
    #[arg(short, long, global = true)]
    pub env_file: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enter interactive chat REPL mode
    Chat,

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Check whether the backend reports itself healthy
    Health,

    /// Show recently served chats from the backend
    Stats,
}
