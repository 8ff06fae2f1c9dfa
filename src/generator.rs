use std::path::Path;

use anyhow::Context as _;
use log::info;

use crate::{context::Context, dates, metadata::Post};

mod feed;
mod sitemap;

pub(crate) const FEED_FILE: &str = "feed.xml";
pub(crate) const SITEMAP_FILE: &str = "sitemap.xml";

/// Writes `feed.xml` and `sitemap.xml` into `context.out_dir`. Other files
/// already in there are left alone.
pub(crate) fn generate(context: &Context, posts: &[Post]) -> anyhow::Result<()> {
    fs_extra::dir::create_all(&context.out_dir, false)
        .with_context(|| format!("while creating {:?}", context.out_dir))?;

    let channel = feed::channel(context, posts)?;
    write(&context.out_dir.join(FEED_FILE), &channel.to_string())?;
    info!("Generated RSS feed with {} posts", channel.items().len());

    let entries = sitemap::entries(context, posts, dates::today());
    write(&context.out_dir.join(SITEMAP_FILE), &sitemap::to_xml(&entries))?;
    info!("Generated sitemap with {} URLs", entries.len());

    Ok(())
}

fn write(path: &Path, content: &str) -> anyhow::Result<()> {
    std::fs::write(path, content).with_context(|| format!("while writing {path:?}"))
}
