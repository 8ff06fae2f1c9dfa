use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Parsed `---` header plus whatever follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Frontmatter {
    pub fields: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub body: String,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub(crate) enum FrontmatterError {
    #[error("document does not begin with a `---` frontmatter block")]
    MissingOpeningFence,
    #[error("frontmatter block is not closed by a `---` line")]
    MissingClosingFence,
    #[error("invalid frontmatter line {line}: {content:?}")]
    InvalidLine { line: usize, content: String },
}

// pandoc-style metadata block; the header group is absent for `---\n---`
static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"\A---[ \t]*\r?\n(?:(.*?)\r?\n)??---[ \t]*(?:\r?\n|\z)(.*)\z")
        .dot_matches_new_line(true)
        .build()
        .unwrap()
});

static BLOCK_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s+(.*)$").unwrap());

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

pub(crate) fn parse(raw: &str) -> Result<Frontmatter, FrontmatterError> {
    let content = raw.trim_start_matches('\u{feff}').trim_start_matches(['\r', '\n']);
    let first_line = content.lines().next().unwrap_or_default();
    if first_line.trim_end_matches([' ', '\t']) != "---" {
        return Err(FrontmatterError::MissingOpeningFence);
    }
    let caps = HEADER_PATTERN
        .captures(content)
        .ok_or(FrontmatterError::MissingClosingFence)?;
    let header = caps.get(1).map_or("", |m| m.as_str());
    let body = caps[2].trim_start_matches(['\r', '\n']).to_string();

    let mut fields = BTreeMap::new();
    let mut tags = vec![];
    // set while collecting `- item` lines under a bare `tags:` key
    let mut in_tag_block = false;

    for (i, line) in header.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if in_tag_block {
            if let Some(item) = BLOCK_ITEM.captures(line) {
                let item = strip_quotes(item[1].trim());
                if !item.is_empty() {
                    tags.push(item.to_string());
                }
                continue;
            }
            in_tag_block = false;
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(FrontmatterError::InvalidLine {
                line: i + 2,
                content: line.to_string(),
            });
        };
        let name = name.trim();
        let value = value.trim();
        if name == "tags" {
            if value.is_empty() {
                in_tag_block = true;
            } else {
                tags = parse_tags(value);
            }
        } else {
            fields.insert(name.to_string(), strip_quotes(value).to_string());
        }
    }

    Ok(Frontmatter { fields, tags, body })
}

/// Accepts `[a, b]`, a JSON array (optionally quoted as a string), or `a, b`.
pub(crate) fn parse_tags(value: &str) -> Vec<String> {
    let value = value.trim();
    let unquoted = strip_quotes(value);

    for candidate in [value, unquoted] {
        if let Ok(parsed) = serde_json::from_str::<Vec<String>>(candidate) {
            return parsed
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }
    }
    // quoted JSON keeps its escapes until decoded as a JSON string
    if let Ok(decoded) = serde_json::from_str::<String>(value) {
        if let Ok(parsed) = serde_json::from_str::<Vec<String>>(&decoded) {
            return parsed
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }
    }

    let list = unquoted.trim();
    let list = list.strip_prefix('[').unwrap_or(list);
    let list = list.strip_suffix(']').unwrap_or(list);
    list.split(',')
        .map(|t| strip_quotes(t.trim()).trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
