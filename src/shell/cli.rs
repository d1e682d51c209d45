//! Command line surface over the review queue.

use crate::modules::reviews::core::feed::FeedEvent;
use crate::modules::reviews::core::review::{Rating, Review, ReviewDraft};
use crate::modules::reviews::core::rotation::Rotation;
use crate::shell::config::Config;
use crate::shell::state::LiveAppState;
use crate::shell::workers::spawn_resync_worker;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

/// Submit reviews optimistically and keep undelivered ones queued until the API accepts them
#[derive(Parser, Debug)]
#[command(name = "reviews")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a review; it is queued locally if the API cannot be reached
    Submit {
        #[arg(long)]
        name: String,

        /// Whole number from 1 to 5
        #[arg(long, value_parser = Rating::parse, default_value = "5")]
        rating: Rating,

        #[arg(long)]
        message: String,
    },

    /// Show the merged feed, queued reviews first
    List {
        /// Viewport width used to pick how many reviews a page shows
        #[arg(long, default_value_t = 1024)]
        width: u32,

        /// Number of pages to advance the rotation by
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Print every review instead of one page
        #[arg(long)]
        all: bool,
    },

    /// Show reviews waiting in the local queue
    Pending,

    /// Run a single resync pass
    Sync,

    /// Run the resync loop until Ctrl-C
    Watch {
        /// Seconds between carousel rotations, 0 disables rotation
        #[arg(long, default_value_t = 0)]
        rotate_every: u64,

        #[arg(long, default_value_t = 1024)]
        width: u32,
    },
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let state = LiveAppState::live(&config).context("failed to build the review API client")?;

    match cli.command {
        Command::Submit {
            name,
            rating,
            message,
        } => {
            let draft = ReviewDraft::new(name, rating, message)?;
            match state.submit_handler.handle(draft).await {
                Ok(review) => println!("saved review {}", review.id),
                Err(e) if e.queued => println!("{e}; queued for retry"),
                Err(e) => println!("{e}"),
            }
        }
        Command::List { width, page, all } => {
            state
                .load_handler
                .handle()
                .await
                .context("failed to load reviews")?;
            let reviews = state.feed.snapshot().await;
            if all {
                reviews.iter().for_each(print_review);
            } else {
                let mut rotation = Rotation::for_width(width);
                rotation.advance_pages(page, reviews.len());
                for index in rotation.window(reviews.len()) {
                    print_review(&reviews[index]);
                }
            }
        }
        Command::Pending => {
            let queued = state
                .drafts
                .load_all()
                .await
                .context("failed to read the local queue")?;
            if queued.is_empty() {
                println!("no queued reviews");
            }
            for pending in queued {
                println!(
                    "{} {} ({}/5): {}",
                    pending.created_at.to_rfc3339(),
                    pending.name,
                    pending.rating,
                    pending.message
                );
            }
        }
        Command::Sync => {
            let report = state.resync_handler.tick().await;
            println!(
                "attempted {}, delivered {}, still queued {}, discarded {}",
                report.attempted, report.delivered, report.remaining, report.discarded
            );
        }
        Command::Watch {
            rotate_every,
            width,
        } => watch(&state, &config, rotate_every, width).await?,
    }
    Ok(())
}

async fn watch(
    state: &LiveAppState,
    config: &Config,
    rotate_every: u64,
    width: u32,
) -> Result<()> {
    if let Err(e) = state.load_handler.handle().await {
        warn!(error = %e, "could not load reviews, showing queued reviews only");
    }
    let mut events = state.feed.subscribe();
    let handle = spawn_resync_worker(state, config.resync_interval);

    let mut rotation = Rotation::for_width(width);
    let mut rotate = tokio::time::interval(Duration::from_secs(rotate_every.max(1)));
    print_page(state, &rotation).await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            event = events.recv() => match event {
                Ok(FeedEvent::Confirmed { review_id, replaced }) => {
                    println!("confirmed review {review_id} (replaced {replaced})");
                    rotation.reset();
                }
                Ok(FeedEvent::PlaceholderInserted(id)) => println!("queued review {id}"),
                Ok(FeedEvent::Reloaded { len }) => println!("feed reloaded with {len} reviews"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "missed feed events"),
                Err(RecvError::Closed) => break,
            },
            _ = rotate.tick(), if rotate_every > 0 => {
                let len = state.feed.len().await;
                if rotation.should_auto_rotate(len, false) {
                    rotation.next(len);
                    print_page(state, &rotation).await;
                }
            }
        }
    }

    handle.stop().await;
    Ok(())
}

async fn print_page(state: &LiveAppState, rotation: &Rotation) {
    let reviews = state.feed.snapshot().await;
    for index in rotation.window(reviews.len()) {
        print_review(&reviews[index]);
    }
}

fn print_review(review: &Review) {
    let marker = if review.is_placeholder() { " [pending]" } else { "" };
    println!(
        "#{} {} ({}/5){}: {}",
        review.id, review.name, review.rating, marker, review.message
    );
}
