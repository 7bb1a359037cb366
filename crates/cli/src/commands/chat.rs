//! `sydia chat` — Interactive or single-message chat mode.

use futures::StreamExt;
use std::io::Write;
use std::sync::Arc;
use sydia_agent::ChatSession;
use sydia_config::{AppConfig, SharedSettings};
use sydia_core::error::Error;
use sydia_memory::{InMemoryHistory, InMemoryMemories};
use sydia_providers::Gateway;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line typed at the interactive prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Exit,
    Reset,
    Remember(&'a str),
    Message(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Input::Exit;
    }
    if line == "/reset" {
        return Input::Reset;
    }
    if let Some(rest) = line.strip_prefix("/remember") {
        let rest = rest.trim();
        return if rest.is_empty() { Input::Empty } else { Input::Remember(rest) };
    }
    Input::Message(line)
}

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(Error::from)?;

    // Check for API key early to give a clear error
    if config.chat.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set the SYDIA_API_KEY environment variable, or add it to:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let gateway = Gateway::from_config(&config.http)?;
    let provider = config.chat.provider.clone();
    let model = config.chat.model.clone();
    let session = ChatSession::new(
        gateway,
        Arc::new(InMemoryHistory::new()),
        Arc::new(InMemoryMemories::new()),
        Arc::new(SharedSettings::new(config)),
    );

    if let Some(msg) = message {
        // Single message mode
        respond(&session, &msg, "").await?;
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Sydia — interactive mode");
    println!();
    println!("  Provider:  {provider}");
    println!("  Model:     {model}");
    println!();
    println!("  /remember TEXT  store a memory");
    println!("  /reset          start a fresh context");
    println!("  exit            quit");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Empty => {}
            Input::Exit => break,
            Input::Reset => {
                session.reset_context().await?;
                println!("  --- Context Reset ---");
            }
            Input::Remember(text) => {
                session.add_memory(text).await?;
                println!("  Remembered.");
            }
            Input::Message(text) => {
                if let Err(e) = respond(&session, text, "  Sydia > ").await {
                    eprintln!("  [Error] {e}");
                }
                println!();
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

/// Send one message, printing deltas as they arrive when streaming is
/// enabled.
async fn respond(session: &ChatSession, text: &str, prefix: &str) -> Result<(), Error> {
    let prepared = session.prepare(text).await?;

    if !prepared.stream {
        return match session.gateway().chat(&prepared.config, &prepared.turns).await {
            Ok(reply) => {
                println!("{prefix}{reply}");
                session.record_reply(&prepared, &reply).await
            }
            Err(e) => fail(session, e.into()).await,
        };
    }

    let mut stream = match session.gateway().chat_stream(&prepared.config, &prepared.turns).await {
        Ok(stream) => stream,
        Err(e) => return fail(session, e.into()).await,
    };

    print!("{prefix}");
    let mut reply = String::new();
    while let Some(delta) = stream.next().await {
        match delta {
            Ok(delta) => {
                print!("{delta}");
                std::io::stdout().flush()?;
                reply.push_str(delta.as_str());
            }
            Err(e) => {
                println!();
                return fail(session, e.into()).await;
            }
        }
    }
    println!();

    session.record_reply(&prepared, &reply).await
}

async fn fail(session: &ChatSession, err: Error) -> Result<(), Error> {
    session.record_error(&err).await?;
    Err(err)
}
