// tests/collect_failures.rs
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use tokio::time::Instant;

use telegram_post_collector::collect::{collect_until, run};
use telegram_post_collector::config::RunConfig;
use telegram_post_collector::{Post, PostSink, SnapshotSource};

struct UnreachableFeed;

#[async_trait]
impl SnapshotSource for UnreachableFeed {
    async fn handshake(&mut self, url: &str) -> Result<()> {
        bail!("navigation to {url} failed")
    }

    async fn reveal_and_capture(&mut self) -> Result<Vec<String>> {
        unreachable!("handshake never succeeds")
    }
}

/// Returns the same snapshot every cycle, with a short settling delay.
struct RepeatingFeed {
    snapshot: Vec<String>,
}

#[async_trait]
impl SnapshotSource for RepeatingFeed {
    async fn handshake(&mut self, _url: &str) -> Result<()> {
        Ok(())
    }

    async fn reveal_and_capture(&mut self) -> Result<Vec<String>> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(self.snapshot.clone())
    }
}

/// Serves one good snapshot, then dies on the next capture.
struct DyingFeed {
    captures: usize,
}

#[async_trait]
impl SnapshotSource for DyingFeed {
    async fn handshake(&mut self, _url: &str) -> Result<()> {
        Ok(())
    }

    async fn reveal_and_capture(&mut self) -> Result<Vec<String>> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.captures += 1;
        if self.captures > 1 {
            bail!("feed went away");
        }
        Ok(vec!["survivor".to_string()])
    }
}

/// Accepts every post except the poisoned text, which always errors.
struct FlakySink {
    stored: Vec<Post>,
    poison: &'static str,
    poison_attempts: usize,
}

impl FlakySink {
    fn new(poison: &'static str) -> Self {
        Self {
            stored: Vec::new(),
            poison,
            poison_attempts: 0,
        }
    }
}

impl PostSink for FlakySink {
    fn append(&mut self, post: &Post) -> Result<()> {
        if post.text == self.poison {
            self.poison_attempts += 1;
            return Err(anyhow!("simulated io error"));
        }
        self.stored.push(post.clone());
        Ok(())
    }
}

#[tokio::test]
async fn failed_handshake_creates_no_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("posts");
    let cfg = RunConfig {
        channel: "rustlang".into(),
        window: Duration::from_millis(100),
        output_dir: out.clone(),
    };

    let result = run(&cfg, &mut UnreachableFeed).await;

    assert!(result.is_err());
    assert!(!out.exists(), "output directory should not have been created");
}

#[tokio::test]
async fn capture_failure_mid_run_is_fatal() {
    let mut feed = DyingFeed { captures: 0 };
    let mut sink = FlakySink::new("");

    let result = collect_until(&mut feed, &mut sink, Instant::now() + Duration::from_secs(5)).await;

    assert!(result.is_err());
    // The cycle before the failure still persisted its post.
    assert_eq!(sink.stored.len(), 1);
    assert_eq!(sink.stored[0].text, "survivor");
}

#[tokio::test]
async fn append_failure_drops_the_post_without_retry() {
    let mut feed = RepeatingFeed {
        snapshot: vec!["X".to_string(), "Y".to_string()],
    };
    let mut sink = FlakySink::new("X");

    let stats = collect_until(&mut feed, &mut sink, Instant::now() + Duration::from_millis(120))
        .await
        .unwrap();

    // "Y" made it, "X" was lost for the run and never reattempted even
    // though every later snapshot contained it again.
    assert_eq!(sink.stored.len(), 1);
    assert_eq!(sink.stored[0].text, "Y");
    assert_eq!(sink.poison_attempts, 1);

    // Both texts still count as seen, so the run kept going.
    assert!(stats.cycles >= 2);
    assert_eq!(stats.accepted, 2);
}
