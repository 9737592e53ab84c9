mod config;
mod error;
mod logging;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use mcp::LaunchTarget;
use runtime::{GeminiBackend, McpToolHost, Session};
use tracing::error;

use config::Config;
use error::Result;

const QUIT_COMMAND: &str = "quit";

#[derive(Parser)]
#[command(name = "switchboard")]
#[command(about = "Chat with a Gemini model that can call tools on an MCP server", long_about = None)]
#[command(version)]
struct Cli {
    /// MCP server to launch: a .py or .js script, or an executable
    server: String,

    /// Config file (defaults to ./switchboard.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model to use, overriding config and SWITCHBOARD_MODEL
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging();

    if let Err(e) = run(cli).await {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::discover(cli.config.as_deref())?;
    let model = config.model(cli.model.as_deref());
    let backend = build_backend(&config, &model)?;

    let target = launch_target(&cli.server, &config)?;
    let host = McpToolHost::spawn(target).await?;

    // On failure the host is dropped here, which kills the server process.
    let mut session = Session::connect(host, backend).await?;
    if let Some(timeout) = config.call_timeout() {
        session = session.with_call_timeout(timeout);
    }

    println!(
        "Connected to server with tools: {:?}",
        session.tools().allowed_names()
    );
    println!("Model: {}", session.backend());
    println!("Type your queries or '{QUIT_COMMAND}' to exit.");

    let outcome = chat_loop(&session).await;
    session.into_executor().shutdown().await?;
    outcome
}

fn build_backend(config: &Config, model: &str) -> Result<GeminiBackend> {
    let settings = &config.backend;
    let mut builder = GeminiBackend::builder(config.api_key()?, model);
    if let Some(base_url) = &settings.base_url {
        builder = builder.base_url(base_url);
    }
    if let Some(system) = &settings.system {
        builder = builder.system(system);
    }
    if let Some(temperature) = settings.temperature {
        builder = builder.temperature(temperature);
    }
    if let Some(max_output_tokens) = settings.max_output_tokens {
        builder = builder.max_output_tokens(max_output_tokens);
    }
    Ok(builder.build())
}

fn launch_target(server: &str, config: &Config) -> Result<LaunchTarget> {
    let target = config
        .tools
        .env
        .iter()
        .fold(LaunchTarget::from_script(server)?, |target, (key, value)| {
            target.with_env(key, value)
        });
    Ok(target)
}

async fn chat_loop(session: &Session<McpToolHost, GeminiBackend>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("\nQuery: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case(QUIT_COMMAND) {
            break;
        }

        match session.process(query).await {
            Ok(answer) => println!("\n{answer}"),
            Err(e) => eprintln!("\nError: {e}"),
        }
    }

    Ok(())
}
