use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context};
use log::debug;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::{dates, frontmatter, metadata::Post};

const POST_EXTENSIONS: [&str; 2] = ["md", "mdx"];
const SUMMARY_LIMIT: usize = 200;

fn preprocess_file(path: &Path) -> anyhow::Result<Post> {
    let slug = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("Invalid file name: {path:?}"))?
        .to_string();

    let content = std::fs::read_to_string(path)?;
    let doc = frontmatter::parse(&content)?;

    let title = doc
        .get("title")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| anyhow!("Missing `title` in frontmatter"))?
        .to_string();
    let date = dates::parse_date(
        doc.get("date")
            .ok_or_else(|| anyhow!("Missing `date` in frontmatter"))?,
    )?;
    let summary = match doc.get("summary") {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => first_paragraph(&doc.body),
    };

    Ok(Post {
        slug,
        title,
        date,
        summary,
        tags: doc.tags,
        body: doc.body,
    })
}

/// Plain text of the first paragraph, cut at [`SUMMARY_LIMIT`] characters.
fn first_paragraph(body: &str) -> String {
    let mut text = String::new();
    let mut in_paragraph = false;
    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Paragraph) => in_paragraph = true,
            Event::End(TagEnd::Paragraph) if in_paragraph => break,
            Event::Text(t) | Event::Code(t) if in_paragraph => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
            _ => {}
        }
    }

    let text = text.trim();
    match text.char_indices().nth(SUMMARY_LIMIT) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

/// Newest first; posts sharing a date are ordered by slug.
pub(crate) fn sort_post(a: &Post, b: &Post) -> Ordering {
    b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug))
}

/// Reads every `.md`/`.mdx` file directly under `dir`. Two files sharing a
/// stem (`a.md` and `a.mdx`) would share a slug and are rejected.
pub(crate) fn load_posts(dir: &Path) -> anyhow::Result<Vec<Post>> {
    let mut posts = vec![];
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("while reading {dir:?}"))? {
        let entry = entry?;
        let path = entry.path();
        let recognized = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| POST_EXTENSIONS.contains(&e));
        if !entry.file_type()?.is_file() || !recognized {
            debug!("skipping {path:?}");
            continue;
        }
        let post = preprocess_file(&path).with_context(|| format!("while preprocessing {path:?}"))?;
        if let Some(other) = seen.insert(post.slug.clone(), path.clone()) {
            bail!("duplicate slug {:?}: {other:?} and {path:?}", post.slug);
        }
        posts.push(post);
    }
    posts.sort_by(sort_post);
    Ok(posts)
}

pub(crate) fn find<'a>(posts: &'a [Post], slug: &str) -> Option<&'a Post> {
    posts.iter().find(|p| p.slug == slug)
}

pub(crate) fn filter_by_tag<'a>(posts: &'a [Post], tag: &str) -> Vec<&'a Post> {
    posts.iter().filter(|p| p.tags.iter().any(|t| t == tag)).collect()
}

pub(crate) fn distinct_tags(posts: &[Post]) -> Vec<String> {
    posts
        .iter()
        .flat_map(|p| p.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Tag usage, most used first, then alphabetical.
pub(crate) fn tag_counts(posts: &[Post]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tag in posts.iter().flat_map(|p| p.tags.iter()) {
        *counts.entry(tag.as_str()).or_default() += 1;
    }
    let mut counts: Vec<(String, usize)> =
        counts.into_iter().map(|(t, c)| (t.to_string(), c)).collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}
