//! `sitemap.xml` listing the fixed pages, every post, the workshop pages and
//! every tag page.

use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::{context::Context, metadata::Post, post};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// path, change frequency, priority
const STATIC_PAGES: &[(&str, &str, &str)] = &[
    ("", "daily", "1.0"),
    ("about", "monthly", "0.8"),
    ("blog", "daily", "0.9"),
    ("projects", "monthly", "0.7"),
    ("now", "weekly", "0.6"),
    ("workshop-diy", "monthly", "0.7"),
];

/// Slugs of the pages under `/workshop-diy/`.
const WORKSHOP_ITEMS: &[&str] = &[
    "raspberry-pi-home-server",
    "esp32-home-automation",
    "3d-printing-basics",
];

#[derive(Debug, PartialEq, Eq)]
pub(super) struct UrlEntry {
    pub loc: String,
    pub lastmod: Option<NaiveDate>,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

pub(super) fn entries(context: &Context, posts: &[Post], today: NaiveDate) -> Vec<UrlEntry> {
    let mut entries: Vec<UrlEntry> = STATIC_PAGES
        .iter()
        .map(|&(path, changefreq, priority)| UrlEntry {
            loc: if path.is_empty() {
                context.blog_url.clone()
            } else {
                context.site_url(path)
            },
            lastmod: Some(today),
            changefreq,
            priority,
        })
        .collect();

    entries.extend(posts.iter().map(|p| UrlEntry {
        loc: context.post_url(&p.slug),
        lastmod: Some(p.date),
        changefreq: "weekly",
        priority: "0.8",
    }));

    entries.extend(WORKSHOP_ITEMS.iter().map(|slug| UrlEntry {
        loc: context.site_url(&format!("workshop-diy/{slug}")),
        lastmod: Some(today),
        changefreq: "monthly",
        priority: "0.6",
    }));

    entries.extend(post::distinct_tags(posts).iter().map(|tag| UrlEntry {
        loc: context.site_url(&format!("blog/tag/{}", urlencoding::encode(tag))),
        // newest post carrying the tag
        lastmod: post::filter_by_tag(posts, tag).first().map(|p| p.date),
        changefreq: "weekly",
        priority: "0.5",
    }));

    entries
}

pub(super) fn to_xml(entries: &[UrlEntry]) -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<urlset xmlns=\"{SITEMAP_NS}\">");
    for entry in entries {
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{}</loc>", escape_xml(&entry.loc));
        if let Some(lastmod) = entry.lastmod {
            let _ = writeln!(xml, "    <lastmod>{}</lastmod>", lastmod.format("%Y-%m-%d"));
        }
        let _ = writeln!(xml, "    <changefreq>{}</changefreq>", entry.changefreq);
        let _ = writeln!(xml, "    <priority>{}</priority>", entry.priority);
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
