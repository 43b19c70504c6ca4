use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use flowchat_core::{Conversation, HttpTransport, MessageStatus, WidgetConfig};

mod app;
mod handler;
mod layout;
mod theme;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "flowchat")]
#[command(about = "Terminal chat window for a remote chat flow")]
#[command(version)]
struct Cli {
    /// Config file (defaults to <config dir>/flowchat/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Flow server base URL
    #[arg(long)]
    host: Option<String>,

    /// Flow to invoke for every message
    #[arg(long)]
    flow_id: Option<String>,

    /// API key sent as x-api-key (FLOWCHAT_API_KEY also works)
    #[arg(long)]
    api_key: Option<String>,

    /// Result field holding the reply text
    #[arg(long)]
    output_key: Option<String>,

    /// Window title
    #[arg(long)]
    title: Option<String>,

    /// Log file for the chat window (logs go to stderr for `ask`)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Ask {
        /// Message text
        text: String,
    },
}

impl Cli {
    fn load_config(&self) -> Result<WidgetConfig> {
        let mut config = match &self.config {
            Some(path) => WidgetConfig::load_from(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => WidgetConfig::load()?,
        };
        config.apply_env();

        // Flags override both file and environment
        if let Some(host) = &self.host {
            config.host_url = host.clone();
        }
        if let Some(flow_id) = &self.flow_id {
            config.flow_id = flow_id.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = Some(api_key.clone());
        }
        if let Some(output_key) = &self.output_key {
            config.output_key = Some(output_key.clone());
        }
        if let Some(title) = &self.title {
            config.window_title = title.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// The terminal is in raw mode while the window is up, so logs go to a file
fn init_file_logging(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?
            .join("flowchat")
            .join("flowchat.log"),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::options().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Ask { text }) => {
            init_stderr_logging();
            let config = cli.load_config()?;
            if !ask(&config, text).await? {
                std::process::exit(1);
            }
        }
        None => {
            init_file_logging(cli.log_file.clone())?;
            let config = cli.load_config()?;
            run_window(config).await?;
        }
    }

    Ok(())
}

/// Returns false when the reply is an error
async fn ask(config: &WidgetConfig, text: &str) -> Result<bool> {
    let transport = HttpTransport::from_config(config)?;
    let mut conversation = Conversation::new(config);

    let reply = conversation
        .send(&transport, text)
        .await?
        .ok_or_else(|| anyhow!("Nothing to send: message is empty"))?;

    if reply.is_error {
        eprintln!("{}", reply.text);
        return Ok(false);
    }
    if reply.status == MessageStatus::Abandoned {
        eprintln!("The flow returned no result");
        return Ok(true);
    }
    println!("{}", reply.text);
    Ok(true)
}

async fn run_window(config: WidgetConfig) -> Result<()> {
    let mut app = App::new(config)?;
    tracing::info!(host = %app.config.host_url, flow = %app.config.flow_id, "opening chat window");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut tui::Tui, app: &mut App, events: &mut tui::EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
        app.poll_exchange().await;
    }
    Ok(())
}
