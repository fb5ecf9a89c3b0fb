mod config;
mod error;

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use runtime::tools::ServerScript;
use runtime::{Backend, Conversation, McpGateway, ToolHost};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::Result;

#[derive(Parser)]
#[command(name = "toolbridge")]
#[command(about = "Answer questions with a language model and an MCP tool server", long_about = None)]
#[command(version)]
struct Cli {
    /// MCP server script to launch (.py or .js)
    server_script: PathBuf,

    /// Question to answer; omit for an interactive session
    query: Option<String>,

    /// Print the full transcript as JSON instead of the answer
    #[arg(long)]
    json: bool,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // stdout carries answers only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let script = ServerScript::from_path(&cli.server_script)?;
    let config = Config::from_env()?;
    let backend = config.backend();
    info!(backend = %backend, server = %script, "starting");

    let mut gateway = McpGateway::new();
    gateway.connect(script.path()).await?;

    let outcome = {
        let mut conversation = Conversation::new(backend, &gateway);
        match cli.query.as_deref() {
            Some(query) => cmd_query(&mut conversation, query, cli.json).await,
            None => cmd_chat(&mut conversation, cli.json).await,
        }
    };

    // Release the server on every path before reporting the outcome.
    let released = gateway.cleanup().await;
    outcome?;
    released?;
    Ok(())
}

async fn cmd_query<B: Backend, H: ToolHost>(
    conversation: &mut Conversation<B, H>,
    query: &str,
    json: bool,
) -> Result<()> {
    conversation.process_query(query).await?;
    print_outcome(conversation, json)
}

async fn cmd_chat<B: Backend, H: ToolHost>(
    conversation: &mut Conversation<B, H>,
    json: bool,
) -> Result<()> {
    let tools: Vec<&str> = conversation
        .tools()
        .specs()
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    println!("toolbridge v{}", env!("CARGO_PKG_VERSION"));
    println!("Tools: {}", tools.join(", "));
    println!("Type 'quit' or Ctrl+D to exit.\n");

    chat_loop(conversation, BufReader::new(tokio::io::stdin()), json).await?;
    Ok(())
}

/// Answer each line of `reader` until EOF or `quit`/`exit`.
///
/// Returns the number of queries sent to the conversation.
async fn chat_loop<B, H, R>(
    conversation: &mut Conversation<B, H>,
    reader: R,
    json: bool,
) -> Result<usize>
where
    B: Backend,
    H: ToolHost,
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stdout = io::stdout();
    let mut queries = 0;

    loop {
        print!("> ");
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else {
            // EOF
            break;
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        queries += 1;
        match conversation.process_query(input).await {
            Ok(_) => {
                println!();
                print_outcome(conversation, json)?;
                println!();
            }
            Err(e) => {
                eprintln!("Error: {e}\n");
            }
        }
    }

    Ok(queries)
}

fn print_outcome<B: Backend, H: ToolHost>(
    conversation: &Conversation<B, H>,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(conversation.transcript())?);
    } else {
        println!("{}", conversation.answer().unwrap_or_default());
    }
    Ok(())
}
