//! Shopping assistant terminal client
//!
//! Mounts one chat widget on stdin/stdout against the configured agent
//! backend.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use shop_assistant_widget::agent::{AgentClient, HttpAgentClient};
use shop_assistant_widget::config::{AppConfig, Cli};
use shop_assistant_widget::error::SubmitError;
use shop_assistant_widget::telemetry;
use shop_assistant_widget::widget::{Applied, ChatWidget, ExchangeId, Message, ScrollAnchor};

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Open,
    Close,
    Toggle,
    Retry,
    Thread,
    Help,
    Quit,
    Say(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "/open" => Self::Open,
            "/close" => Self::Close,
            "/toggle" => Self::Toggle,
            "/retry" => Self::Retry,
            "/thread" => Self::Thread,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Say(line),
        }
    }
}

/// Prints messages as they are appended.
#[derive(Debug, Default)]
struct TerminalAnchor {
    printed: usize,
}

impl ScrollAnchor for TerminalAnchor {
    fn scroll_to_end(&mut self, messages: &[Message]) {
        for message in messages.iter().skip(self.printed) {
            let who = if message.is_agent() { "assistant" } else { "you" };
            println!("{who}> {}", message.text());
        }
        self.printed = messages.len();
    }
}

const HELP: &str = "\
Commands:
  /open /close /toggle   show or hide the chat panel
  /retry                 resend the last message that failed
  /thread                show the current conversation thread
  /quit                  exit
Anything else is sent to the assistant.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before clap reads env-backed flags
    let _ = dotenv();

    let cli = Cli::parse();
    let config = AppConfig::load_from_cli(&cli).context("failed to load configuration")?;

    telemetry::init(config.logging.format);

    info!(
        name: "backend.config.loaded",
        base_url = %config.backend.base_url,
        timeout_secs = config.backend.request_timeout_secs,
        "Backend configuration loaded"
    );

    let client = HttpAgentClient::from_config(&config.backend)
        .context("failed to build backend client")?;

    match client.health().await {
        Ok(banner) => info!(name: "backend.reachable", server = %banner.message, "Backend reachable"),
        Err(e) => warn!(name: "backend.unreachable", error = %e, "Backend health check failed"),
    }

    let client: Arc<dyn AgentClient> = Arc::new(client);
    let mut widget = ChatWidget::mount(client, config.widget.clone())
        .with_scroll_anchor(TerminalAnchor::default());

    println!("{HELP}");
    if config.widget.start_open {
        widget.toggle();
    } else {
        println!("(chat is closed, type /open to start)");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Command::Quit => break,
                    Command::Help => println!("{HELP}"),
                    Command::Toggle => {
                        if !widget.toggle() {
                            println!("(chat closed)");
                        }
                    }
                    Command::Open => {
                        if !widget.is_open() {
                            widget.toggle();
                        }
                    }
                    Command::Close => {
                        if widget.is_open() {
                            widget.toggle();
                            println!("(chat closed)");
                        }
                    }
                    Command::Thread => match widget.thread_id() {
                        Some(id) => println!("(thread {id})"),
                        None => println!("(no conversation yet)"),
                    },
                    Command::Retry => report_submit(widget.retry()),
                    Command::Say(text) => {
                        widget.set_draft(text);
                        report_submit(widget.submit());
                    }
                }
            }
            Some(completion) = widget.next_completion(), if widget.is_pending() => {
                if widget.apply(completion) == Applied::Failure {
                    let silent = widget
                        .last_failure()
                        .is_some_and(|f| !f.error.has_fallback_reply());
                    if silent {
                        println!("(message not delivered, type /retry to resend)");
                    }
                }
            }
        }
    }

    widget.unmount();
    Ok(())
}

fn report_submit(result: Result<ExchangeId, SubmitError>) {
    match result {
        Ok(_) | Err(SubmitError::EmptyDraft) => {}
        Err(SubmitError::Closed) => println!("(chat is closed, type /open first)"),
        Err(SubmitError::Busy) => println!("(still waiting for the assistant)"),
        Err(SubmitError::NothingToRetry) => println!("(nothing to retry)"),
    }
}
