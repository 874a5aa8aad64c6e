// src/collect/mod.rs
pub mod chrome;
pub mod sink;
pub mod store;
pub mod types;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::Instant;

use crate::collect::sink::JsonLinesSink;
use crate::collect::store::SeenPosts;
use crate::collect::types::{Post, PostSink, SnapshotSource};
use crate::config::RunConfig;

/// Tally of the cycle loop: accepted posts and cycles run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectStats {
    pub accepted: usize,
    pub cycles: usize,
}

/// Outcome of a whole run, for the caller's final report.
#[derive(Debug)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub accepted: usize,
    pub cycles: usize,
}

/// Runs one full collection: feed handshake, run-scoped output file, then
/// snapshot cycles until the window elapses.
///
/// The handshake is a precondition; if it fails the run aborts before any
/// output file exists. Capture failures mid-run abort the run as well, while
/// per-post persistence failures are logged and skipped inside the loop.
pub async fn run<S: SnapshotSource>(cfg: &RunConfig, source: &mut S) -> Result<RunSummary> {
    let url = cfg.feed_url();
    tracing::info!(target: "collect", %url, "navigating to the channel feed");
    source
        .handshake(&url)
        .await
        .context("channel feed handshake")?;
    tracing::info!(target: "collect", "feed is visible, collecting unique posts");

    let path = sink::unique_post_path(&cfg.output_dir, &cfg.channel);
    let mut sink = JsonLinesSink::open(&path)?;

    let deadline = Instant::now() + cfg.window;
    let stats = collect_until(source, &mut sink, deadline).await?;

    tracing::info!(
        target: "collect",
        accepted = stats.accepted,
        cycles = stats.cycles,
        path = %path.display(),
        "collection window elapsed"
    );
    Ok(RunSummary {
        output_path: path,
        accepted: stats.accepted,
        cycles: stats.cycles,
    })
}

/// Repeats the reveal → capture → dedupe → persist → report cycle until
/// `deadline`. The deadline is checked once per cycle boundary, so the loop
/// never stops early and finishes within one cycle of the deadline.
pub async fn collect_until<S, K>(
    source: &mut S,
    sink: &mut K,
    deadline: Instant,
) -> Result<CollectStats>
where
    S: SnapshotSource + ?Sized,
    K: PostSink + ?Sized,
{
    let mut seen = SeenPosts::new();
    let mut cycles = 0usize;

    while Instant::now() < deadline {
        let snapshot = source
            .reveal_and_capture()
            .await
            .context("capturing feed snapshot")?;
        let new = persist_new_posts(&snapshot, &mut seen, sink);
        cycles += 1;

        let remaining = deadline.saturating_duration_since(Instant::now());
        tracing::info!(
            target: "collect",
            new,
            total = seen.len(),
            time_left = %format_mm_ss(remaining),
            "collection cycle finished"
        );
    }

    Ok(CollectStats {
        accepted: seen.len(),
        cycles,
    })
}

/// Accepts the not-yet-seen texts of one snapshot, in the order received,
/// and returns how many were newly accepted. A post whose append fails stays
/// marked seen, so it is neither retried nor re-logged on later cycles.
fn persist_new_posts<K>(snapshot: &[String], seen: &mut SeenPosts, sink: &mut K) -> usize
where
    K: PostSink + ?Sized,
{
    let mut accepted = 0usize;
    for text in snapshot {
        if !seen.insert(text) {
            continue;
        }
        accepted += 1;
        let post = Post { text: text.clone() };
        if let Err(error) = sink.append(&post) {
            tracing::warn!(target: "collect", %error, "failed to persist post, dropping it");
            continue;
        }
        tracing::debug!(target: "collect", chars = text.chars().count(), "collected unique post");
    }
    accepted
}

fn format_mm_ss(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
