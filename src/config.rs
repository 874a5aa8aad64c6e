// src/config.rs
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const ENV_CHANNEL: &str = "CHANNEL_NAME";
const ENV_MINUTES: &str = "COLLECT_MINUTES";
const ENV_OUTPUT_DIR: &str = "OUTPUT_DIR";
const DEFAULT_OUTPUT_DIR: &str = "posts";

pub const MIN_WINDOW_MINUTES: u64 = 1;
pub const MAX_WINDOW_MINUTES: u64 = 60;

/// Bounds for one collection run, fixed before the loop starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub channel: String,
    pub window: Duration,
    pub output_dir: PathBuf,
}

impl RunConfig {
    /// Builds a config from the environment, prompting on stdin for anything
    /// missing: `CHANNEL_NAME` and `COLLECT_MINUTES` fall back to prompts,
    /// `OUTPUT_DIR` falls back to `posts`.
    pub fn from_env() -> Result<Self> {
        let raw_channel = match non_empty_env(ENV_CHANNEL) {
            Some(value) => value,
            None => prompt("Enter the channel name: ")?,
        };
        let channel = extract_channel_name(&raw_channel);
        anyhow::ensure!(!channel.is_empty(), "channel name is empty");

        let window = match non_empty_env(ENV_MINUTES) {
            Some(value) => parse_window_minutes(&value).with_context(|| {
                format!(
                    "{ENV_MINUTES} must be a number between \
                     {MIN_WINDOW_MINUTES} and {MAX_WINDOW_MINUTES}"
                )
            })?,
            None => prompt_window_minutes()?,
        };

        let output_dir = PathBuf::from(
            non_empty_env(ENV_OUTPUT_DIR).unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
        );

        Ok(Self {
            channel,
            window,
            output_dir,
        })
    }

    /// Public preview address of the channel feed.
    pub fn feed_url(&self) -> String {
        format!("https://t.me/s/{}", self.channel)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Accepts `@name`, `https://t.me/name`, `t.me/name` or a bare name and
/// returns the channel identifier.
pub fn extract_channel_name(input: &str) -> String {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix("https://t.me/").unwrap_or(trimmed);
    match trimmed.split_once('/') {
        Some((_, rest)) => rest.to_string(),
        None => trimmed.to_string(),
    }
}

/// Parses a whole number of minutes within [1, 60] into the run window.
pub fn parse_window_minutes(input: &str) -> Result<Duration> {
    let minutes: u64 = input.trim().parse().context("not a number")?;
    anyhow::ensure!(
        (MIN_WINDOW_MINUTES..=MAX_WINDOW_MINUTES).contains(&minutes),
        "minutes out of range"
    );
    Ok(Duration::from_secs(minutes * 60))
}

fn prompt_window_minutes() -> Result<Duration> {
    loop {
        let answer = prompt(&format!(
            "How many minutes do you want to collect? \
             ({MIN_WINDOW_MINUTES}-{MAX_WINDOW_MINUTES}): "
        ))?;
        match parse_window_minutes(&answer) {
            Ok(window) => return Ok(window),
            Err(_) => println!(
                "Invalid input. Please enter a number between \
                 {MIN_WINDOW_MINUTES} and {MAX_WINDOW_MINUTES}."
            ),
        }
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().context("flushing prompt")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading stdin")?;
    Ok(line.trim().to_string())
}
