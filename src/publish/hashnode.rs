use anyhow::{anyhow, Context as _};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    markdown, read_json,
    tags::{self, HashnodeTag},
    Platform, Published, Publisher,
};
use crate::metadata::Post;

const API_URL: &str = "https://gql.hashnode.com";

const PUBLISH_POST: &str = r#"
mutation ($input: PublishPostInput!) {
  publishPost(input: $input) {
    post {
      id
      url
      title
    }
  }
}
"#;

pub(super) struct Hashnode {
    client: reqwest::blocking::Client,
    api_key: String,
    publication_id: String,
    api_url: String,
    site_url: String,
    /// Shown as the link text of the "Originally published at" footer.
    site_host: String,
}

#[derive(Serialize, Debug)]
struct GraphQlRequest<'a> {
    query: &'static str,
    variables: Variables<'a>,
}

#[derive(Serialize, Debug)]
struct Variables<'a> {
    input: PublishPostInput<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PublishPostInput<'a> {
    publication_id: &'a str,
    title: &'a str,
    content_markdown: String,
    tags: Vec<HashnodeTag>,
    settings: Settings,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Settings {
    enable_table_of_content: bool,
    is_newsletter_activated: bool,
}

#[derive(Deserialize, Debug)]
struct GraphQlResponse {
    data: Option<Data>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Data {
    publish_post: Option<PublishPostPayload>,
}

#[derive(Deserialize, Debug)]
struct PublishPostPayload {
    post: Option<PublishedPost>,
}

#[derive(Deserialize, Debug)]
struct PublishedPost {
    id: String,
    url: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GraphQlError {
    message: String,
}

impl Hashnode {
    pub fn new(
        client: reqwest::blocking::Client,
        api_key: String,
        publication_id: String,
        site_url: &str,
        site_host: &str,
    ) -> Self {
        Self {
            client,
            api_key,
            publication_id,
            api_url: API_URL.to_string(),
            site_url: site_url.trim_end_matches('/').to_string(),
            site_host: site_host.to_string(),
        }
    }

    fn content(&self, post: &Post) -> String {
        let mut body = markdown::clean(&post.body, &self.site_url);
        body.push_str(&format!(
            "\n\n---\n\n*Originally published at [{}]({}/blog/{})*",
            self.site_host,
            self.site_url,
            post.slug
        ));
        markdown::with_disclaimer(body, post.date)
    }

    fn request<'a>(&'a self, post: &'a Post) -> GraphQlRequest<'a> {
        GraphQlRequest {
            query: PUBLISH_POST,
            variables: Variables {
                input: PublishPostInput {
                    publication_id: &self.publication_id,
                    title: &post.title,
                    content_markdown: self.content(post),
                    tags: tags::hashnode_tags(&post.tags),
                    settings: Settings {
                        enable_table_of_content: true,
                        is_newsletter_activated: false,
                    },
                },
            },
        }
    }
}

fn parse_response(value: Value) -> anyhow::Result<Published> {
    let resp: GraphQlResponse = serde_json::from_value(value.clone())
        .with_context(|| format!("unexpected response format: {value}"))?;
    if !resp.errors.is_empty() {
        for e in resp.errors.iter() {
            error!("   {}", e.message);
        }
        let messages: Vec<_> = resp.errors.into_iter().map(|e| e.message).collect();
        return Err(anyhow!("GraphQL errors: {}", messages.join("; ")));
    }
    let post = resp
        .data
        .and_then(|d| d.publish_post)
        .and_then(|p| p.post)
        .ok_or_else(|| anyhow!("unexpected response format: {value}"))?;
    Ok(Published {
        id: Value::String(post.id),
        url: post.url,
    })
}

impl Publisher for Hashnode {
    fn platform(&self) -> Platform {
        Platform::Hashnode
    }

    fn publish(&mut self, post: &Post) -> anyhow::Result<Published> {
        let payload = self.request(post);
        debug!("publishPost mutation for {}", post.slug);
        let resp = self
            .client
            .post(&self.api_url)
            .header("Authorization", &self.api_key)
            .json(&payload)
            .send()
            .with_context(|| "api request failed")?;
        parse_response(read_json(resp)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::tests::post;
    use serde_json::json;

    fn hashnode() -> Hashnode {
        Hashnode::new(
            reqwest::blocking::Client::new(),
            "token".to_string(),
            "pub-1".to_string(),
            "https://www.letanure.dev",
            "letanure.dev",
        )
    }

    #[test]
    fn mutation_payload() {
        let p = post("graphs", "2025-02-03", &["Web Dev"]);
        let value = serde_json::to_value(hashnode().request(&p)).unwrap();
        assert_eq!(value["query"], json!(PUBLISH_POST));
        assert_eq!(
            value["variables"]["input"],
            json!({
                "publicationId": "pub-1",
                "title": "Title of graphs",
                "contentMarkdown": "Body of graphs\n\n---\n\n*Originally published at [letanure.dev](https://www.letanure.dev/blog/graphs)*",
                "tags": [{"slug": "web-dev", "name": "Web dev"}],
                "settings": {"enableTableOfContent": true, "isNewsletterActivated": false},
            })
        );
    }

    #[test]
    fn disclaimer_goes_before_footer() {
        let p = post("old", "2022-01-09", &[]);
        let content = hashnode().content(&p);
        assert!(content.starts_with("> **Note:** This article was originally published on January 9, 2022."));
        assert!(content.ends_with("(https://www.letanure.dev/blog/old)*"));
    }

    #[test]
    fn footer_uses_site_host() {
        let mut context = crate::context::tests::context();
        context.set_blog_url("http://blog.example.com/").unwrap();
        let hashnode = Hashnode::new(
            reqwest::blocking::Client::new(),
            "token".to_string(),
            "pub-1".to_string(),
            &context.blog_url,
            &context.blog_host,
        );
        let content = hashnode.content(&post("p", "2025-01-01", &[]));
        assert!(content.ends_with("*Originally published at [blog.example.com](http://blog.example.com/blog/p)*"));
    }

    #[test]
    fn responses() {
        let ok = json!({"data": {"publishPost": {"post": {"id": "abc", "url": "https://h/x", "title": "t"}}}});
        assert_eq!(parse_response(ok).unwrap().id, json!("abc"));

        let errors = json!({"data": null, "errors": [{"message": "Invalid tag"}]});
        let err = parse_response(errors).unwrap_err();
        assert!(err.to_string().contains("Invalid tag"));

        assert!(parse_response(json!({"data": {"publishPost": null}})).is_err());
    }
}
