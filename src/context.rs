use std::path::PathBuf;

use anyhow::{bail, Context as _};
use url::Url;

pub(crate) const DEFAULT_BLOG_NAME: &str = "Letanure Blog";
pub(crate) const DEFAULT_BLOG_URL: &str = "https://www.letanure.dev";
pub(crate) const DEFAULT_DESCRIPTION: &str = "Thoughts on web development, AI, and technology";

/// Site identity and working directories for one invocation.
#[derive(Debug, Clone)]
pub(crate) struct Context {
    pub posts_dir: PathBuf,
    pub out_dir: PathBuf,
    pub ledger_dir: PathBuf,

    pub blog_name: String,
    /// Canonical origin without a trailing slash.
    pub blog_url: String,
    /// Host part of `blog_url` with any leading `www.` dropped.
    pub blog_host: String,
    pub description: String,
}

impl Context {
    pub fn new(posts_dir: PathBuf, out_dir: PathBuf, ledger_dir: PathBuf) -> anyhow::Result<Self> {
        let mut context = Self {
            posts_dir,
            out_dir,
            ledger_dir,
            blog_name: DEFAULT_BLOG_NAME.to_string(),
            blog_url: String::new(),
            blog_host: String::new(),
            description: DEFAULT_DESCRIPTION.to_string(),
        };
        context.set_blog_url(DEFAULT_BLOG_URL)?;
        Ok(context)
    }

    /// Like [`Context::new`], with `BLOG_NAME`, `BLOG_URL` and
    /// `BLOG_DESCRIPTION` taken from the environment when set.
    /// An invalid `BLOG_URL` is an error.
    pub fn from_env(
        posts_dir: PathBuf,
        out_dir: PathBuf,
        ledger_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        let mut context = Self::new(posts_dir, out_dir, ledger_dir)?;
        if let Ok(name) = std::env::var("BLOG_NAME") {
            context.blog_name = name;
        }
        if let Ok(url) = std::env::var("BLOG_URL") {
            context.set_blog_url(&url)?;
        }
        if let Ok(description) = std::env::var("BLOG_DESCRIPTION") {
            context.description = description;
        }
        Ok(context)
    }

    pub fn set_blog_url(&mut self, value: &str) -> anyhow::Result<()> {
        let url = parse_blog_url(value)?;
        let host = url.host_str().unwrap_or_default();
        self.blog_host = host.strip_prefix("www.").unwrap_or(host).to_string();
        self.blog_url = url.as_str().trim_end_matches('/').to_string();
        Ok(())
    }

    pub fn site_url(&self, path: &str) -> String {
        format!("{}/{}", self.blog_url, path.trim_start_matches('/'))
    }

    pub fn post_url(&self, slug: &str) -> String {
        self.site_url(&format!("blog/{slug}"))
    }
}

fn parse_blog_url(value: &str) -> anyhow::Result<Url> {
    let url = Url::parse(value.trim())
        .with_context(|| format!("BLOG_URL {value:?} is not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        bail!("BLOG_URL {value:?} must be an absolute http(s) URL");
    }
    Ok(url)
}
