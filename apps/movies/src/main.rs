use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{HttpMovieStore, MovieController};
use shared::domain::{MovieId, NewMovie};
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod watch;

use config::{load_settings, DEFAULT_CONFIG_PATH};
use render::render_state;

#[derive(Parser, Debug)]
#[command(name = "movies", about = "Browse, add and delete movies held by a remote store")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    list_url: Option<String>,
    #[arg(long)]
    store_url: Option<String>,
    #[arg(long)]
    resource_suffix: Option<String>,
    #[arg(long)]
    retry_delay_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the collection once and print it.
    List {
        #[arg(long)]
        json: bool,
    },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        opening_text: String,
        #[arg(long, default_value = "")]
        release_date: String,
    },
    Delete {
        id: String,
    },
    /// Keep the list on screen, retrying failed fetches automatically.
    Watch,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(v) = args.list_url {
        settings.list_url = v;
    }
    if let Some(v) = args.store_url {
        settings.store_base_url = v;
    }
    if let Some(v) = args.resource_suffix {
        settings.resource_suffix = v;
    }
    if let Some(v) = args.retry_delay_ms {
        settings.retry_delay_ms = v;
    }

    let endpoints = settings
        .endpoints()
        .context("invalid movie store configuration")?;
    let controller = MovieController::with_retry_delay(
        Arc::new(HttpMovieStore::new(endpoints)),
        settings.retry_delay(),
    );

    match args.command {
        Command::List { json } => {
            controller.fetch_movies().await;
            // One-shot listing: no point waiting on the automatic retry.
            controller.cancel_retry().await;
            let state = controller.snapshot().await;
            if let Some(error) = state.error {
                return Err(anyhow!(error));
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&state.movies)?);
            } else {
                println!("{}", render_state(&state));
            }
        }
        Command::Add {
            title,
            opening_text,
            release_date,
        } => {
            let created = controller
                .create_movie(NewMovie::new(title, opening_text, release_date))
                .await
                .context("failed to add movie")?;
            println!("Added movie {} ({})", created.title, created.id);
        }
        Command::Delete { id } => {
            let id = MovieId::from(id);
            controller
                .delete_movie(&id)
                .await
                .with_context(|| format!("failed to delete movie {id}"))?;
            println!("Deleted movie {id}");
        }
        Command::Watch => watch::run_watch(controller).await?,
    }

    Ok(())
}
