// src/collect/chrome.rs
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::collect::types::SnapshotSource;

/// CSS selector for rendered post bodies on `t.me/s/<channel>` pages.
pub const POST_SELECTOR: &str = ".tgme_widget_message_text";

/// Settling delay after nudging the feed, before reading it back.
const SETTLE: Duration = Duration::from_secs(4);
/// How long the handshake waits for the first post to render.
const VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);
const VISIBILITY_POLL: Duration = Duration::from_millis(250);

const VISIBILITY_JS: &str = "document.querySelector('.tgme_widget_message_text') !== null";
const CAPTURE_JS: &str =
    "Array.from(document.querySelectorAll('.tgme_widget_message_text')).map(el => el.innerText)";

/// Headless-Chrome implementation of [`SnapshotSource`] for public Telegram
/// channel feeds.
pub struct ChromeFeedSource {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Option<Page>,
}

impl ChromeFeedSource {
    /// Launches a headless browser and spawns its CDP event handler.
    pub async fn launch() -> Result<Self> {
        let config = BrowserConfig::builder()
            .arg("--start-maximized")
            .build()
            .map_err(|message| anyhow!("building browser config: {message}"))?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("launching headless chrome")?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        Ok(Self {
            browser,
            handler_task,
            page: None,
        })
    }

    /// Closes the browser process and stops the event handler.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await.context("closing browser")?;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        Ok(())
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| anyhow!("feed page not open, handshake has not run"))
    }
}

#[async_trait]
impl SnapshotSource for ChromeFeedSource {
    async fn handshake(&mut self, url: &str) -> Result<()> {
        let page = self
            .browser
            .new_page(url)
            .await
            .context("opening the channel feed page")?;
        page.wait_for_navigation()
            .await
            .context("waiting for the feed to load")?;

        let deadline = Instant::now() + VISIBILITY_TIMEOUT;
        loop {
            let visible: bool = page
                .evaluate(VISIBILITY_JS)
                .await
                .context("probing for visible posts")?
                .into_value()
                .context("decoding visibility probe")?;
            if visible {
                break;
            }
            if Instant::now() >= deadline {
                bail!("no posts became visible at {url}");
            }
            tokio::time::sleep(VISIBILITY_POLL).await;
        }

        self.page = Some(page);
        Ok(())
    }

    async fn reveal_and_capture(&mut self) -> Result<Vec<String>> {
        let page = self.page()?;
        page.find_element(POST_SELECTOR)
            .await
            .context("locating the feed")?
            .scroll_into_view()
            .await
            .context("scrolling the feed")?;
        tokio::time::sleep(SETTLE).await;

        let texts: Vec<String> = page
            .evaluate(CAPTURE_JS)
            .await
            .context("reading visible posts")?
            .into_value()
            .context("decoding visible posts")?;
        Ok(texts)
    }
}
