use std::time::Duration;

use log::{error, info, warn};

use super::Publisher;
use crate::{ledger::Ledger, metadata::Post};

#[derive(Debug, Clone)]
pub(crate) struct RunOptions {
    /// Upper bound on posts sent in this run; `Some(0)` means no bound.
    pub limit: Option<usize>,
    pub delay: Duration,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub published: usize,
    pub failed: usize,
}

/// Posts missing from the ledger, in the order they were given (newest first).
pub(crate) fn unpublished<'a>(posts: &'a [Post], ledger: &Ledger) -> Vec<&'a Post> {
    posts.iter().filter(|p| !ledger.contains(&p.slug)).collect()
}

/// Oldest first, truncated to `limit`.
pub(crate) fn plan<'a>(posts: &'a [Post], ledger: &Ledger, limit: Option<usize>) -> Vec<&'a Post> {
    let mut queue = unpublished(posts, ledger);
    queue.reverse();
    if let Some(limit) = limit.filter(|l| *l > 0) {
        if queue.len() > limit {
            info!("Limiting to {limit} posts");
            queue.truncate(limit);
        }
    }
    queue
}

pub(crate) fn run(
    posts: &[Post],
    ledger: &mut Ledger,
    publisher: &mut dyn Publisher,
    options: &RunOptions,
) -> anyhow::Result<RunSummary> {
    run_with_sleep(posts, ledger, publisher, options, std::thread::sleep)
}

fn run_with_sleep(
    posts: &[Post],
    ledger: &mut Ledger,
    publisher: &mut dyn Publisher,
    options: &RunOptions,
    mut sleep: impl FnMut(Duration),
) -> anyhow::Result<RunSummary> {
    let platform = publisher.platform();
    info!("Found {} blog posts", posts.len());

    let queue = plan(posts, ledger, options.limit);
    let (Some(first), Some(last)) = (queue.first(), queue.last()) else {
        info!("All posts already published to {platform}");
        return Ok(RunSummary::default());
    };
    info!("Publishing in chronological order ({} to {})", first.date, last.date);

    publisher.prepare()?;

    info!("Publishing {} new posts to {platform}...", queue.len());
    let mut summary = RunSummary::default();
    for (i, post) in queue.iter().enumerate() {
        match publisher.publish(post) {
            Ok(published) => {
                summary.published += 1;
                info!("Published: {}", post.title);
                if let Some(url) = &published.url {
                    info!("   URL: {url}");
                }
                if let Err(e) = ledger.record(&post.slug, published.id) {
                    error!(
                        "{} was published but could not be recorded in {:?}: {e:#}",
                        post.slug,
                        ledger.path()
                    );
                }
            }
            Err(e) => {
                summary.failed += 1;
                warn!("Failed to publish {}: {e:#}", post.title);
            }
        }

        if i + 1 < queue.len() {
            info!("Waiting {}s before next post...", options.delay.as_secs());
            sleep(options.delay);
        }
    }

    info!(
        "Done: {} published, {} failed ({} total in ledger)",
        summary.published,
        summary.failed,
        ledger.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        post::tests::post,
        publish::{Platform, Published},
    };
    use anyhow::bail;
    use serde_json::json;

    #[derive(Default)]
    struct FakePublisher {
        prepared: usize,
        calls: Vec<String>,
        fail: Vec<&'static str>,
        fail_prepare: bool,
    }

    impl Publisher for FakePublisher {
        fn platform(&self) -> Platform {
            Platform::DevTo
        }

        fn prepare(&mut self) -> anyhow::Result<()> {
            self.prepared += 1;
            if self.fail_prepare {
                bail!("bad credentials");
            }
            Ok(())
        }

        fn publish(&mut self, post: &Post) -> anyhow::Result<Published> {
            self.calls.push(post.slug.clone());
            if self.fail.contains(&post.slug.as_str()) {
                bail!("HTTP 429 Too Many Requests: slow down");
            }
            Ok(Published {
                id: json!(self.calls.len() * 100),
                url: None,
            })
        }
    }

    fn posts() -> Vec<Post> {
        vec![
            post("post-3", "2024-03-01", &[]),
            post("post-2", "2024-02-01", &[]),
            post("post-1", "2024-01-01", &[]),
        ]
    }

    fn ledger_with(dir: &tempfile::TempDir, content: &str) -> Ledger {
        let path = dir.path().join("devto-published.json");
        std::fs::write(&path, content).unwrap();
        Ledger::load(&path).unwrap()
    }

    fn slugs(queue: Vec<&Post>) -> Vec<String> {
        queue.iter().map(|p| p.slug.clone()).collect()
    }

    fn options(limit: Option<usize>) -> RunOptions {
        RunOptions {
            limit,
            delay: Duration::from_secs(31),
        }
    }

    #[test]
    fn unpublished_set_excludes_ledger_entries() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_with(&dir, r#"{"post-1": 123}"#);
        let posts = vec![post("post-2", "2024-02-01", &[]), post("post-1", "2024-01-01", &[])];
        let slugs: Vec<_> = unpublished(&posts, &ledger).iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["post-2"]);
    }

    #[test]
    fn plan_is_chronological_and_limited() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_with(&dir, "{}");
        let posts = posts();
        assert_eq!(slugs(plan(&posts, &ledger, None)), vec!["post-1", "post-2", "post-3"]);
        assert_eq!(slugs(plan(&posts, &ledger, Some(2))), vec!["post-1", "post-2"]);
        assert_eq!(slugs(plan(&posts, &ledger, Some(0))).len(), 3);
    }

    #[test]
    fn nothing_to_do_makes_no_calls() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_with(&dir, r#"{"post-1": 1, "post-2": 2, "post-3": 3}"#);
        let mut publisher = FakePublisher::default();
        let mut sleeps = vec![];
        let summary =
            run_with_sleep(&posts(), &mut ledger, &mut publisher, &options(None), |d| sleeps.push(d))
                .unwrap();
        assert_eq!(summary, RunSummary::default());
        assert_eq!(publisher.prepared, 0);
        assert!(publisher.calls.is_empty());
        assert!(sleeps.is_empty());
    }

    #[test]
    fn publishes_oldest_first_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_with(&dir, r#"{"post-2": 7}"#);
        let mut publisher = FakePublisher::default();
        let mut sleeps = vec![];
        let summary =
            run_with_sleep(&posts(), &mut ledger, &mut publisher, &options(None), |d| sleeps.push(d))
                .unwrap();

        assert_eq!(summary, RunSummary { published: 2, failed: 0 });
        assert_eq!(publisher.prepared, 1);
        assert_eq!(publisher.calls, vec!["post-1", "post-3"]);
        // no pause after the final post
        assert_eq!(sleeps, vec![Duration::from_secs(31)]);

        let reloaded = Ledger::load(ledger.path()).unwrap();
        assert_eq!(reloaded.get("post-1"), Some(&json!(100)));
        assert_eq!(reloaded.get("post-2"), Some(&json!(7)));
        assert_eq!(reloaded.get("post-3"), Some(&json!(200)));
    }

    #[test]
    fn failures_are_skipped_and_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_with(&dir, "{}");
        let mut publisher = FakePublisher {
            fail: vec!["post-2"],
            ..Default::default()
        };
        let mut sleeps = 0;
        let summary =
            run_with_sleep(&posts(), &mut ledger, &mut publisher, &options(None), |_| sleeps += 1)
                .unwrap();

        assert_eq!(summary, RunSummary { published: 2, failed: 1 });
        assert_eq!(publisher.calls, vec!["post-1", "post-2", "post-3"]);
        assert_eq!(sleeps, 2);
        assert!(ledger.contains("post-1"));
        assert!(!ledger.contains("post-2"));
        assert!(ledger.contains("post-3"));
    }

    #[test]
    fn limit_caps_calls() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_with(&dir, "{}");
        let mut publisher = FakePublisher::default();
        let mut sleeps = 0;
        run_with_sleep(&posts(), &mut ledger, &mut publisher, &options(Some(1)), |_| sleeps += 1)
            .unwrap();
        assert_eq!(publisher.calls, vec!["post-1"]);
        assert_eq!(sleeps, 0);
    }

    #[test]
    fn failed_prepare_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_with(&dir, "{}");
        let mut publisher = FakePublisher {
            fail_prepare: true,
            ..Default::default()
        };
        let result = run_with_sleep(&posts(), &mut ledger, &mut publisher, &options(None), |_| {});
        assert!(result.is_err());
        assert!(publisher.calls.is_empty());
        assert_eq!(ledger.len(), 0);
    }
}
