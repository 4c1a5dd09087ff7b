pub mod commands;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::api::{ApiClient, ChatHistory, Health, HealthMonitor};
use crate::chat::{ChatSession, Message, SendOutcome, Sender};
use crate::cli::commands::Commands;
use crate::config::AppConfig;
use crate::llm::ChatTransport;

pub async fn run_cli(
    command: Commands,
    config: AppConfig,
    transport: Arc<dyn ChatTransport>,
    api: ApiClient,
) -> ExitCode {
    match command {
        Commands::Chat => {
            let session = ChatSession::from_config(&config, transport);
            match run_repl(session).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Terminal error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Ask { message } => {
            let mut session = ChatSession::configured(&config, transport);
            match session.send(&message.join(" ")).await {
                SendOutcome::Replied(reply) => {
                    println!("{}", reply.content);
                    ExitCode::SUCCESS
                }
                SendOutcome::FellBack { reply, error } => {
                    println!("{}", reply.content);
                    eprintln!("Error: {}", error);
                    ExitCode::FAILURE
                }
                SendOutcome::Ignored | SendOutcome::Busy => {
                    eprintln!("Nothing to send.");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Health => {
            let mut monitor = HealthMonitor::new(api);
            match monitor.check().await {
                Health::Healthy => {
                    println!("Backend is healthy");
                    ExitCode::SUCCESS
                }
                _ => {
                    match monitor.error() {
                        Some(e) => println!("Backend is unhealthy: {}", e),
                        None => println!("Backend is unhealthy"),
                    }
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Stats => {
            let mut history = ChatHistory::new(api);
            history.fetch().await;
            if let Some(e) = history.error() {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }

            let entries = history.entries();
            if entries.is_empty() {
                println!("No recent chats.");
            } else {
                println!("{:<26} | {:<16} | {:>8} | {:>8}", "Timestamp", "Model", "Messages", "Tokens");
                println!("{:-<26}-+-{:-<16}-+-{:->8}-+-{:->8}", "", "", "", "");
                for e in entries {
                    println!(
                        "{:<26} | {:<16} | {:>8} | {:>8}",
                        e.timestamp, e.model, e.messages_count, e.tokens_used.total_tokens
                    );
                }
            }
            ExitCode::SUCCESS
        }
    }
}

fn print_message(message: &Message) {
    let who = match message.sender {
        Sender::User => "You",
        Sender::Ai => "AI",
    };
    println!("[{}] {}> {}", message.timestamp.format("%H:%M:%S"), who, message.content);
}

/// Partial reply text stays on its own line; otherwise the typing indicator
/// is overwritten.
fn fallback_prefix(printed: bool) -> &'static str {
    if printed {
        "\n"
    } else {
        "\r"
    }
}

async fn run_repl(mut session: ChatSession) -> io::Result<()> {
    println!("--- Parley Terminal Chat ---");
    println!("Transport: {}", session.transport_name());
    println!("Type /exit to quit, /clear to start over, /history to reprint.");
    println!("----------------------------");

    for message in session.messages() {
        print_message(message);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\nYou> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let text = line.trim();

        if text.is_empty() {
            continue;
        }
        match text {
            "/exit" | "/quit" => break,
            "/clear" => {
                session.clear();
                println!("Conversation cleared.");
                continue;
            }
            "/history" => {
                for message in session.messages() {
                    print_message(message);
                }
                continue;
            }
            _ => {}
        }

        // Typing indicator until the first chunk arrives.
        print!("AI is typing...");
        io::stdout().flush()?;

        let (tx, mut rx) = mpsc::channel::<String>(100);
        let printer = async {
            let mut printed = false;
            while let Some(chunk) = rx.recv().await {
                if !printed {
                    print!("\rAI> ");
                    printed = true;
                }
                print!("{}", chunk);
                let _ = io::stdout().flush();
            }
            printed
        };

        let (outcome, printed) = tokio::join!(session.send_streaming(&line, tx), printer);

        match outcome {
            SendOutcome::Replied(reply) => {
                if !printed {
                    print!("\rAI> {}", reply.content);
                }
                println!();
            }
            SendOutcome::FellBack { reply, error } => {
                println!("{}AI> {}", fallback_prefix(printed), reply.content);
                eprintln!("[error] {}", error);
            }
            SendOutcome::Ignored | SendOutcome::Busy => println!(),
        }
    }

    Ok(())
}
