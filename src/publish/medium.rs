use anyhow::{anyhow, Context as _};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{markdown, read_json, tags, Platform, Published, Publisher};
use crate::metadata::Post;

const API_URL: &str = "https://api.medium.com/v1";

pub(super) struct Medium {
    client: reqwest::blocking::Client,
    api_key: String,
    api_url: String,
    site_url: String,
    user_id: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct MediumPost<'a> {
    title: &'a str,
    content_format: &'static str,
    content: String,
    tags: Vec<String>,
    publish_status: &'static str,
    canonical_url: String,
    notify_followers: bool,
}

#[derive(Deserialize, Debug)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize, Debug)]
struct User {
    id: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize, Debug)]
struct CreatedPost {
    id: String,
    url: Option<String>,
}

impl Medium {
    pub fn new(client: reqwest::blocking::Client, api_key: String, site_url: &str) -> Self {
        Self {
            client,
            api_key,
            api_url: API_URL.to_string(),
            site_url: site_url.trim_end_matches('/').to_string(),
            user_id: None,
        }
    }

    fn post_body<'a>(&self, post: &'a Post) -> MediumPost<'a> {
        let body = markdown::clean(&post.body, &self.site_url);
        MediumPost {
            title: &post.title,
            content_format: "markdown",
            content: markdown::with_disclaimer(body, post.date),
            tags: tags::normalize(&post.tags, &tags::MEDIUM),
            publish_status: "public",
            canonical_url: format!("{}/blog/{}", self.site_url, post.slug),
            // bulk runs should not spam followers
            notify_followers: false,
        }
    }

    fn user_id(&mut self) -> anyhow::Result<String> {
        if let Some(id) = &self.user_id {
            return Ok(id.clone());
        }
        let resp = self
            .client
            .get(format!("{}/me", self.api_url))
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .with_context(|| "Failed to get Medium user")?;
        let user = parse_user(read_json(resp).with_context(|| "Failed to authenticate with Medium")?)?;
        info!("Publishing as: {} (@{})", user.name, user.username);
        self.user_id = Some(user.id.clone());
        Ok(user.id)
    }
}

fn parse_user(value: Value) -> anyhow::Result<User> {
    let envelope: Envelope<User> = serde_json::from_value(value.clone())
        .map_err(|e| anyhow!("unexpected /me response {value}: {e}"))?;
    Ok(envelope.data)
}

fn parse_response(value: Value) -> anyhow::Result<Published> {
    let envelope: Envelope<CreatedPost> = serde_json::from_value(value.clone())
        .with_context(|| format!("unexpected response format: {value}"))?;
    Ok(Published {
        id: Value::String(envelope.data.id),
        url: envelope.data.url,
    })
}

impl Publisher for Medium {
    fn platform(&self) -> Platform {
        Platform::Medium
    }

    fn prepare(&mut self) -> anyhow::Result<()> {
        self.user_id().map(|_| ())
    }

    fn publish(&mut self, post: &Post) -> anyhow::Result<Published> {
        let user_id = self.user_id()?;
        let payload = self.post_body(post);
        debug!("POST {}/users/{user_id}/posts for {}", self.api_url, post.slug);
        let resp = self
            .client
            .post(format!("{}/users/{user_id}/posts", self.api_url))
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .with_context(|| "api request failed")?;
        parse_response(read_json(resp)?)
    }
}
