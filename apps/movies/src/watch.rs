//! Interactive session: re-renders on every controller state change and
//! turns stdin lines into controller commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use client_core::{ControllerEvent, MovieController};
use shared::domain::{MovieId, NewMovie};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{debug, warn};

use crate::render::render_state;

pub const WATCH_HELP: &str = "Commands: r (refresh), c (cancel retry), d <id> (delete), \
a <title>|<opening text>|<release date> (add), q (quit)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Refresh,
    CancelRetry,
    Delete(MovieId),
    Add(NewMovie),
    Quit,
}

pub fn parse_watch_command(line: &str) -> Option<WatchCommand> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match (verb, rest) {
        ("r" | "refresh", "") => Some(WatchCommand::Refresh),
        ("c" | "cancel", "") => Some(WatchCommand::CancelRetry),
        ("q" | "quit", "") => Some(WatchCommand::Quit),
        ("d" | "delete", id) if !id.is_empty() => Some(WatchCommand::Delete(MovieId::from(id))),
        ("a" | "add", fields) if !fields.is_empty() => {
            let mut parts = fields.splitn(3, '|').map(str::trim);
            let title = parts.next().unwrap_or_default();
            let opening_text = parts.next().unwrap_or_default();
            let release_date = parts.next().unwrap_or_default();
            Some(WatchCommand::Add(NewMovie::new(
                title,
                opening_text,
                release_date,
            )))
        }
        _ => None,
    }
}

pub async fn run_watch(controller: Arc<MovieController>) -> Result<()> {
    let mut events = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{WATCH_HELP}");
    tokio::spawn(controller.fetch_movies());

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(ControllerEvent::StateChanged { phase, state }) => {
                    debug!(?phase, "state changed");
                    println!("{}\n", render_state(&state));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "renderer fell behind controller events");
                    println!("{}\n", render_state(&controller.snapshot().await));
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read command from stdin")? else {
                    break;
                };
                if !dispatch(&controller, &line).await {
                    break;
                }
            }
        }
    }

    controller.cancel_retry().await;
    Ok(())
}

/// Returns `false` once the session should end.
async fn dispatch(controller: &Arc<MovieController>, line: &str) -> bool {
    let Some(cmd) = parse_watch_command(line) else {
        if !line.trim().is_empty() {
            println!("{WATCH_HELP}");
        }
        return true;
    };

    match cmd {
        WatchCommand::Refresh => {
            tokio::spawn(controller.fetch_movies());
        }
        WatchCommand::CancelRetry => {
            if !controller.cancel_retry().await {
                println!("No retry pending.");
            }
        }
        WatchCommand::Delete(id) => {
            let controller = Arc::clone(controller);
            tokio::spawn(async move {
                if let Err(err) = controller.delete_movie(&id).await {
                    warn!(%id, error = %err, "delete from watch session failed");
                }
            });
        }
        WatchCommand::Add(movie) => {
            let controller = Arc::clone(controller);
            tokio::spawn(async move {
                match controller.create_movie(movie).await {
                    Ok(created) => println!("Added movie {}. Enter 'r' to refresh.", created.id),
                    Err(err) => println!("Could not add movie: {err}"),
                }
            });
        }
        WatchCommand::Quit => return false,
    }
    true
}
