//! Cross-posting to third-party blogging platforms.
//!
//! Every platform gets a [`Publisher`] that turns a [`Post`] into the
//! platform's payload and sends it. [`run`] decides which posts still need to
//! go out, drives the publisher one post at a time and keeps the per-platform
//! [`Ledger`](crate::ledger::Ledger) up to date.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{anyhow, bail, Context as _};
use serde_json::Value;

use crate::{context::Context, metadata::Post};

mod devto;
mod hashnode;
mod markdown;
mod medium;
mod run;
mod tags;

pub(crate) use run::{run, RunOptions};

const TIMEOUT_SECONDS: u64 = 60;
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Platform {
    DevTo,
    Hashnode,
    Medium,
}

impl Platform {
    pub fn key(self) -> &'static str {
        match self {
            Platform::DevTo => "devto",
            Platform::Hashnode => "hashnode",
            Platform::Medium => "medium",
        }
    }

    /// Pause between two consecutive posts.
    pub fn delay(self) -> Duration {
        match self {
            Platform::DevTo | Platform::Hashnode => Duration::from_secs(31),
            Platform::Medium => Duration::from_secs(60),
        }
    }

    pub fn ledger_path(self, ledger_dir: &Path) -> PathBuf {
        ledger_dir.join(format!("{}-published.json", self.key()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Platform::DevTo => "dev.to",
            Platform::Hashnode => "Hashnode",
            Platform::Medium => "Medium",
        })
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "devto" | "dev.to" => Ok(Platform::DevTo),
            "hashnode" => Ok(Platform::Hashnode),
            "medium" => Ok(Platform::Medium),
            _ => Err(anyhow!("unknown platform: {s}")),
        }
    }
}

/// What a platform handed back for a newly created post.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Published {
    /// Numeric on dev.to, a string elsewhere. Stored in the ledger as is.
    pub id: Value,
    pub url: Option<String>,
}

pub(crate) trait Publisher {
    fn platform(&self) -> Platform;

    /// Called once before the first post of a run.
    fn prepare(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn publish(&mut self, post: &Post) -> anyhow::Result<Published>;
}

/// Builds the publisher for `platform` from its API credentials in the
/// environment. A missing variable is an error.
pub(crate) fn publisher_from_env(
    platform: Platform,
    context: &Context,
) -> anyhow::Result<Box<dyn Publisher>> {
    let client = http_client()?;
    Ok(match platform {
        Platform::DevTo => Box::new(devto::DevTo::new(
            client,
            required_env("DEVTO_API_KEY")?,
            &context.blog_url,
        )),
        Platform::Hashnode => Box::new(hashnode::Hashnode::new(
            client,
            required_env("HASHNODE_API_KEY")?,
            required_env("HASHNODE_PUBLICATION_ID")?,
            &context.blog_url,
            &context.blog_host,
        )),
        Platform::Medium => Box::new(medium::Medium::new(
            client,
            required_env("MEDIUM_API_KEY")?,
            &context.blog_url,
        )),
    })
}

fn required_env(name: &str) -> anyhow::Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{name} environment variable required"),
    }
}

fn http_client() -> anyhow::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECONDS))
        .user_agent(USER_AGENT)
        .build()
        .with_context(|| "Failed to create HTTP client")
}

/// Reads a JSON body, turning a non-success status into an error carrying the
/// status line and whatever text the platform sent.
fn read_json(resp: reqwest::blocking::Response) -> anyhow::Result<Value> {
    let status = resp.status();
    let text = resp.text().with_context(|| "api response error")?;
    if !status.is_success() {
        bail!("HTTP {status}: {text}");
    }
    serde_json::from_str(&text).with_context(|| format!("api response parse error {text:?}"))
}
