use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::dates;

/// Posts dated before this year get the "may be outdated" banner.
pub(super) const DISCLAIMER_CUTOFF_YEAR: i32 = 2025;

const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{2014}', "--"),
    ('\u{2013}', "-"),
    ('\u{2026}', "..."),
    ('\u{00A0}', " "),
    ('\u{2002}', " "),
    ('\u{2003}', " "),
    ('\u{2009}', " "),
    ('\u{200B}', ""),
    ('\u{2060}', ""),
    ('\u{00AD}', ""),
    ('\u{FEFF}', ""),
];

static CITATION_ARTIFACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"citeturn\d+search\d+").unwrap());
static MDX_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\s*/\*.*?\*/\s*\}").unwrap());
static ORPHAN_SOURCES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Sources?:[ \t]*$").unwrap());
// `//host/...` is protocol-relative, not root-relative
static ROOT_RELATIVE_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(/([^/)][^)]*)\)").unwrap());

/// Makes a post body safe for third-party editors: ASCII punctuation, no
/// invisible characters, no leftover artifacts, absolute image links.
pub(super) fn clean(content: &str, site_url: &str) -> String {
    let mut processed = String::with_capacity(content.len());
    for c in content.chars() {
        match REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => processed.push_str(to),
            None => processed.push(c),
        }
    }

    let processed = CITATION_ARTIFACT.replace_all(&processed, "");
    let processed = MDX_COMMENT.replace_all(&processed, "");
    let processed = ORPHAN_SOURCES.replace_all(&processed, "");
    let processed = processed.trim();

    let replacement = format!("![$1]({}/$2)", site_url.trim_end_matches('/'));
    ROOT_RELATIVE_IMAGE
        .replace_all(processed, replacement.as_str())
        .into_owned()
}

pub(super) fn needs_disclaimer(date: NaiveDate) -> bool {
    date.year() < DISCLAIMER_CUTOFF_YEAR
}

/// Prefixes the stale-content note when `date` is before the cutoff.
pub(super) fn with_disclaimer(body: String, date: NaiveDate) -> String {
    if !needs_disclaimer(date) {
        return body;
    }
    format!(
        "> **Note:** This article was originally published on {}. Some information may be outdated.\n\n{body}",
        dates::format_long(date)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = "https://www.letanure.dev";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn typography_is_ascii() {
        assert_eq!(
            clean("\u{201C}Hi\u{201D} it\u{2019}s \u{2014} 1\u{2013}2\u{2026}", SITE),
            "\"Hi\" it's -- 1-2..."
        );
    }

    #[test]
    fn invisible_characters() {
        assert_eq!(clean("a\u{00A0}b\u{200B}c\u{00AD}d\u{2009}e\u{2060}", SITE), "a bcd e");
    }

    #[test]
    fn artifacts_and_sources() {
        let input = "Intro citeturn0search3 text.\n{/* hidden\nnote */}\nSources:\nReal line\nSources: https://example.com\n";
        assert_eq!(
            clean(input, SITE),
            "Intro  text.\n\n\nReal line\nSources: https://example.com"
        );
    }

    #[test]
    fn root_relative_images_become_absolute() {
        let input = "![diagram](/images/a.png) ![cdn](//cdn.example/x.png) ![abs](https://x.io/y.png) [link](/blog/x)";
        assert_eq!(
            clean(input, SITE),
            "![diagram](https://www.letanure.dev/images/a.png) ![cdn](//cdn.example/x.png) ![abs](https://x.io/y.png) [link](/blog/x)"
        );
    }

    #[test]
    fn disclaimer_before_cutoff_only() {
        let old = with_disclaimer("Body".to_string(), ymd(2023, 5, 1));
        assert_eq!(
            old,
            "> **Note:** This article was originally published on May 1, 2023. Some information may be outdated.\n\nBody"
        );
        assert_eq!(with_disclaimer("Body".to_string(), ymd(2025, 5, 1)), "Body");
        assert!(needs_disclaimer(ymd(2024, 12, 31)));
        assert!(!needs_disclaimer(ymd(2025, 1, 1)));
    }
}
