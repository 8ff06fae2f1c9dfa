use std::path::PathBuf;

use anyhow::bail;
use clap::{command, value_parser, Arg, ArgAction, ArgMatches, Command};
use context::Context;
use ledger::Ledger;
use publish::{Platform, RunOptions};

mod context;
mod dates;
mod frontmatter;
mod generator;
mod ledger;
mod metadata;
mod post;
mod publish;

const PLATFORMS: [&str; 3] = ["devto", "hashnode", "medium"];

fn cli() -> Command {
    command!()
        .subcommand_required(true)
        .args(&[
            Arg::new("posts_dir")
                .long("posts")
                .global(true)
                .help("Directory of Markdown/MDX posts")
                .value_parser(value_parser!(PathBuf))
                .default_value("content/posts"),
            Arg::new("ledger_dir")
                .long("ledger-dir")
                .global(true)
                .help("Directory holding the per-platform publish ledgers")
                .value_parser(value_parser!(PathBuf))
                .default_value(".publishing-data"),
        ])
        .subcommand(
            Command::new("publish")
                .about("Cross-post unpublished posts to a platform, oldest first")
                .args(&[
                    Arg::new("platform")
                        .required(true)
                        .value_parser(PLATFORMS),
                    Arg::new("limit")
                        .long("limit")
                        .help("Publish at most this many posts (0 means no limit)")
                        .value_parser(value_parser!(usize)),
                ]),
        )
        .subcommand(
            Command::new("build")
                .about("Write feed.xml and sitemap.xml")
                .arg(
                    Arg::new("out_dir")
                        .long("out")
                        .help("Output directory. Existing files other than the two outputs are kept.")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("out"),
                ),
        )
        .subcommand(
            Command::new("posts")
                .about("List posts, newest first")
                .args(&[
                    Arg::new("tag").long("tag").help("Only posts carrying this tag"),
                    Arg::new("json")
                        .long("json")
                        .help("Print post metadata as JSON")
                        .action(ArgAction::SetTrue),
                ]),
        )
        .subcommand(Command::new("tags").about("List tags by number of posts"))
        .subcommand(
            Command::new("show")
                .about("Show one post and where it has been published")
                .arg(Arg::new("slug").required(true)),
        )
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();

    let posts_dir: &PathBuf = matches.get_one("posts_dir").expect("has default");
    let ledger_dir: &PathBuf = matches.get_one("ledger_dir").expect("has default");
    let out_dir = match matches.subcommand() {
        Some(("build", sub)) => sub.get_one::<PathBuf>("out_dir").cloned(),
        _ => None,
    };
    if out_dir.as_ref().is_some_and(|d| d.exists() && !d.is_dir()) {
        bail!("if out_dir exists, it must be directory.");
    }
    let out_dir = out_dir.unwrap_or_else(|| PathBuf::from("out"));

    let context = Context::from_env(posts_dir.to_owned(), out_dir, ledger_dir.to_owned())?;

    match matches.subcommand() {
        Some(("publish", sub)) => publish(&context, sub),
        Some(("build", _)) => generator::generate(&context, &load_posts(&context)?),
        Some(("posts", sub)) => {
            list_posts(&context, sub.get_one::<String>("tag"), sub.get_flag("json"))
        }
        Some(("tags", _)) => list_tags(&context),
        Some(("show", sub)) => show(&context, sub.get_one::<String>("slug").expect("required")),
        _ => unreachable!("subcommand_required"),
    }
}

fn publish(context: &Context, matches: &ArgMatches) -> anyhow::Result<()> {
    let platform: Platform = matches
        .get_one::<String>("platform")
        .expect("required")
        .parse()?;
    // credentials are checked before anything is read or sent
    let mut publisher = publish::publisher_from_env(platform, context)?;
    let mut ledger = Ledger::load(&platform.ledger_path(&context.ledger_dir))?;
    let posts = load_posts(context)?;

    let options = RunOptions {
        limit: matches.get_one::<usize>("limit").copied(),
        delay: platform.delay(),
    };
    let summary = publish::run(&posts, &mut ledger, publisher.as_mut(), &options)?;
    if summary.published == 0 && summary.failed > 0 {
        bail!("every post failed to publish to {platform}");
    }
    Ok(())
}

fn load_posts(context: &Context) -> anyhow::Result<Vec<metadata::Post>> {
    if !context.posts_dir.is_dir() {
        bail!("posts directory {:?} does not exist.", context.posts_dir);
    }
    post::load_posts(&context.posts_dir)
}

fn list_posts(context: &Context, tag: Option<&String>, json: bool) -> anyhow::Result<()> {
    let posts = load_posts(context)?;
    let posts = match tag {
        Some(tag) => post::filter_by_tag(&posts, tag),
        None => posts.iter().collect(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
        return Ok(());
    }
    let today = dates::today();
    for p in posts {
        println!(
            "{}  {:<18} {:>10}  {}",
            p.slug,
            dates::format_long(p.date),
            dates::format_relative(p.date, today),
            p.title
        );
    }
    Ok(())
}

fn list_tags(context: &Context) -> anyhow::Result<()> {
    let posts = load_posts(context)?;
    for (tag, count) in post::tag_counts(&posts) {
        println!("{count:>4}  {tag}");
    }
    Ok(())
}

fn show(context: &Context, slug: &str) -> anyhow::Result<()> {
    let posts = load_posts(context)?;
    let Some(p) = post::find(&posts, slug) else {
        bail!("no post with slug {slug:?}");
    };
    println!("{}", p.title);
    println!("{}", context.post_url(&p.slug));
    println!("date:    {}", dates::format_long(p.date));
    println!("tags:    {}", p.tags.join(", "));
    println!("summary: {}", p.summary);
    for name in PLATFORMS {
        let platform: Platform = name.parse()?;
        let ledger = Ledger::load(&platform.ledger_path(&context.ledger_dir))?;
        match ledger.get(slug) {
            Some(id) => println!("{platform:<9} published (id {id})"),
            None => println!("{platform:<9} not published"),
        }
    }
    Ok(())
}
