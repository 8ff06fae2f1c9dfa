use anyhow::Context as _;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{markdown, read_json, tags, Platform, Published, Publisher};
use crate::metadata::Post;

const API_URL: &str = "https://dev.to/api";

pub(super) struct DevTo {
    client: reqwest::blocking::Client,
    api_key: String,
    api_url: String,
    site_url: String,
}

#[derive(Serialize, Debug)]
struct ArticleRequest<'a> {
    article: Article<'a>,
}

#[derive(Serialize, Debug)]
struct Article<'a> {
    title: &'a str,
    published: bool,
    body_markdown: String,
    tags: Vec<String>,
    canonical_url: String,
    description: &'a str,
}

#[derive(Deserialize, Debug)]
struct ArticleResponse {
    id: u64,
    url: Option<String>,
}

impl DevTo {
    pub fn new(client: reqwest::blocking::Client, api_key: String, site_url: &str) -> Self {
        Self {
            client,
            api_key,
            api_url: API_URL.to_string(),
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    fn article<'a>(&self, post: &'a Post) -> ArticleRequest<'a> {
        let body = markdown::clean(&post.body, &self.site_url);
        ArticleRequest {
            article: Article {
                title: &post.title,
                published: true,
                body_markdown: markdown::with_disclaimer(body, post.date),
                tags: tags::normalize(&post.tags, &tags::DEVTO),
                canonical_url: format!("{}/blog/{}", self.site_url, post.slug),
                description: &post.summary,
            },
        }
    }
}

fn parse_response(value: Value) -> anyhow::Result<Published> {
    let resp: ArticleResponse = serde_json::from_value(value.clone())
        .with_context(|| format!("unexpected response format: {value}"))?;
    Ok(Published {
        id: Value::from(resp.id),
        url: resp.url,
    })
}

impl Publisher for DevTo {
    fn platform(&self) -> Platform {
        Platform::DevTo
    }

    fn publish(&mut self, post: &Post) -> anyhow::Result<Published> {
        let payload = self.article(post);
        debug!("POST {}/articles for {}", self.api_url, post.slug);
        let resp = self
            .client
            .post(format!("{}/articles", self.api_url))
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .with_context(|| "api request failed")?;
        parse_response(read_json(resp)?)
    }
}
