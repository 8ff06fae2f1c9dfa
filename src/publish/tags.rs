//! Per-platform tag shaping. Every platform lower-cases and strips characters
//! it rejects; duplicates are collapsed after that cleanup and before the
//! count limit, so a repeated tag never costs one of the platform's slots.

use serde::Serialize;

pub(super) struct TagRules {
    pub max_tags: usize,
    pub max_len: Option<usize>,
    /// Whitespace becomes `-` and `-` survives; otherwise both are dropped.
    pub hyphenate: bool,
}

pub(super) const DEVTO: TagRules = TagRules {
    max_tags: 4,
    max_len: None,
    hyphenate: false,
};

pub(super) const MEDIUM: TagRules = TagRules {
    max_tags: 5,
    max_len: Some(25),
    hyphenate: false,
};

pub(super) const HASHNODE: TagRules = TagRules {
    max_tags: 10,
    max_len: None,
    hyphenate: true,
};

pub(super) fn normalize_tag(tag: &str, rules: &TagRules) -> String {
    let mut out = String::with_capacity(tag.len());
    for c in tag.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if rules.hyphenate && (c == '-' || c.is_whitespace()) && !out.ends_with('-') {
            out.push('-');
        }
    }
    let mut out = if rules.hyphenate {
        out.trim_matches('-').to_string()
    } else {
        out
    };
    if let Some(max) = rules.max_len {
        out.truncate(max);
    }
    out
}

pub(super) fn normalize(tags: &[String], rules: &TagRules) -> Vec<String> {
    let mut out: Vec<String> = vec![];
    for tag in tags {
        let tag = normalize_tag(tag, rules);
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
        if out.len() == rules.max_tags {
            break;
        }
    }
    out
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(super) struct HashnodeTag {
    pub slug: String,
    pub name: String,
}

/// Hashnode wants a slug plus a display name (first letter capitalised).
pub(super) fn hashnode_tags(tags: &[String]) -> Vec<HashnodeTag> {
    let mut out: Vec<HashnodeTag> = vec![];
    for tag in tags {
        let slug = normalize_tag(tag, &HASHNODE);
        if slug.is_empty() || out.iter().any(|t| t.slug == slug) {
            continue;
        }
        out.push(HashnodeTag {
            slug,
            name: capitalize(tag.trim()),
        });
        if out.len() == HASHNODE.max_tags {
            break;
        }
    }
    out
}

fn capitalize(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn devto_tags() {
        assert_eq!(
            normalize(&strings(&["C++", "Web Dev", "ai", "ai"]), &DEVTO),
            vec!["c", "webdev", "ai"]
        );
        assert_eq!(
            normalize(&strings(&["one", "two", "three", "four", "five"]), &DEVTO),
            vec!["one", "two", "three", "four"]
        );
        assert_eq!(normalize(&strings(&["!!!", "next.js"]), &DEVTO), vec!["nextjs"]);
    }

    #[test]
    fn duplicates_do_not_use_up_slots() {
        assert_eq!(
            normalize(&strings(&["AI", "ai", "A.I.", "rust", "go", "web"]), &DEVTO),
            vec!["ai", "rust", "go", "web"]
        );
    }

    #[test]
    fn medium_tags_are_capped() {
        let long = "a".repeat(40);
        let tags = normalize(&strings(&[&long, "b", "c", "d", "e", "f"]), &MEDIUM);
        assert_eq!(tags.len(), 5);
        assert_eq!(tags[0].len(), 25);
    }

    #[test]
    fn hashnode_slug_and_name() {
        let tags = hashnode_tags(&strings(&["Web  Dev", "--Next.js--", "REACT", "react", "??"]));
        assert_eq!(
            tags,
            vec![
                HashnodeTag { slug: "web-dev".to_string(), name: "Web  dev".to_string() },
                HashnodeTag { slug: "nextjs".to_string(), name: "--next.js--".to_string() },
                HashnodeTag { slug: "react".to_string(), name: "React".to_string() },
            ]
        );
    }
}
