use anyhow::anyhow;
use chrono::Utc;
use rss::{
    extension::atom::{AtomExtension, Link},
    validation::Validate,
    Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder,
};

use crate::{context::Context, dates, metadata::Post};

pub(super) fn channel(context: &Context, posts: &[Post]) -> anyhow::Result<Channel> {
    let items: Vec<Item> = posts.iter().map(|p| item(context, p)).collect();

    let mut self_link = Link::default();
    self_link.set_href(context.site_url("feed.xml"));
    self_link.set_rel("self");
    self_link.set_mime_type(Some("application/rss+xml".to_string()));
    let mut atom = AtomExtension::default();
    atom.set_links(vec![self_link]);

    let channel = ChannelBuilder::default()
        .title(context.blog_name.clone())
        .link(context.blog_url.clone())
        .description(context.description.clone())
        .language(Some("en-us".to_string()))
        .last_build_date(Some(Utc::now().to_rfc2822()))
        .atom_ext(Some(atom))
        .items(items)
        .build();

    channel
        .validate()
        .map_err(|e| anyhow!("rss validation failed: {e}"))?;
    Ok(channel)
}

fn item(context: &Context, post: &Post) -> Item {
    let link = context.post_url(&post.slug);
    ItemBuilder::default()
        .title(Some(post.title.clone()))
        .description(Some(post.summary.clone()))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .pub_date(Some(dates::to_rfc2822(post.date)))
        .categories(
            post.tags
                .iter()
                .map(|t| rss::CategoryBuilder::default().name(t.clone()).build())
                .collect::<Vec<_>>(),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::tests::context, post::tests::post};

    #[test]
    fn one_item_per_post() {
        let posts = vec![post("b", "2024-02-01", &["rust"]), post("a", "2024-01-01", &[])];
        let channel = channel(&context(), &posts).unwrap();
        assert_eq!(channel.title(), "Letanure Blog");
        assert_eq!(channel.link(), "https://www.letanure.dev");
        assert_eq!(channel.items().len(), 2);

        let first = &channel.items()[0];
        assert_eq!(first.title(), Some("Title of b"));
        assert_eq!(first.link(), Some("https://www.letanure.dev/blog/b"));
        assert_eq!(first.description(), Some("Summary of b"));
        assert!(first.pub_date().unwrap().contains("Feb 2024"));
        assert_eq!(first.categories()[0].name(), "rust");

        let xml = channel.to_string();
        assert!(xml.contains("https://www.letanure.dev/feed.xml"));
        assert!(xml.contains("<language>en-us</language>"));
    }
}
