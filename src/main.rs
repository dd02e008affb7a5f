//! subscrforge collector - CLI entry point.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use futures::{pin_mut, Stream, TryStreamExt};
use tracing_subscriber::{fmt, EnvFilter};

use subscrforge_collector::{
    cli::Args,
    config::{parse_creator_id, parse_post_id, validate_config, Config, FetchMode},
    error::{exit_codes, Error, Result},
    fs::{ensure_dir, post_filename},
    models::{Post, RenderOptions},
    output::{
        print_banner, print_config_summary, print_creator, print_error, print_info,
        print_membership, print_message, print_post, print_success, print_summary, print_user,
        print_warning, FetchProgress,
    },
    platforms::fanbox::{Fanbox, FanboxClient},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::UnsupportedPlatform(_)
                | Error::TomlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::RetrieveUser { .. }
                | Error::NotFound(_)
                | Error::Status { .. }
                | Error::NotConnected => ExitCode::from(exit_codes::API_ERROR as u8),
                Error::Network(_) | Error::Http(_) | Error::Cache(_) => {
                    ExitCode::from(exit_codes::NETWORK_ERROR as u8)
                }
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    // Print banner
    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            config_path.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate configuration
    validate_config(&config)?;

    let mode = args.fetch_mode();
    let target = args.target.as_deref();
    if mode.requires_target() && target.is_none() {
        return Err(Error::MissingConfig(format!(
            "--target is required for mode '{}'",
            mode
        )));
    }

    // Print configuration summary
    let cache = match config.client.cache_max_age()? {
        0 => "disabled".to_string(),
        seconds => format!("{}s", seconds),
    };
    print_config_summary(&mode.to_string(), target, &cache, &config.client.rate_limit);

    // Initialize client
    let mut fanbox = Fanbox::new(config.account.session_id.clone());
    if let Some(user_agent) = &config.account.user_agent {
        fanbox = fanbox.with_user_agent(user_agent.clone());
    }
    let mut client = FanboxClient::new(fanbox, &config.client)?;

    print_info("Connecting to FANBOX...");
    let user = client.connect().await?.clone();
    print_success(&format!("Signed in as {} (ID: {})", user.name, user.id));

    let result = fetch(&client, &config, mode, target).await;
    client.close();
    result
}

/// Fetch and report whatever the mode asks for.
async fn fetch(
    client: &FanboxClient,
    config: &Config,
    mode: FetchMode,
    target: Option<&str>,
) -> Result<()> {
    let target = target.unwrap_or_default();

    match mode {
        FetchMode::User => print_user(client.user()?),
        FetchMode::Creator => {
            let creator_id = parse_creator_id(target)?;
            let creator = client
                .creators()?
                .get(creator_id.as_str())
                .await?
                .ok_or_else(|| Error::NotFound(format!("Creator {}", creator_id)))?;
            print_creator(&creator);
        }
        FetchMode::Post => {
            let post_id = parse_post_id(target)?;
            let post = client
                .posts()?
                .get(&post_id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Post {}", post_id)))?;
            print_post(&post);

            match &config.output.directory {
                Some(dir) => save_post(dir, &post, render_options(config))?,
                None => {
                    println!();
                    println!("{}", post.body.render_with(render_options(config)));
                }
            }
        }
        FetchMode::Posts => {
            let creator_id = parse_creator_id(target)?;
            let progress = FetchProgress::start(format!("Fetching posts of @{}", creator_id));
            let posts = match client.posts()?.list_by_creator_with_body(&creator_id).await {
                Ok(posts) => {
                    progress.finish();
                    posts
                }
                Err(e) => {
                    progress.fail();
                    return Err(e);
                }
            };

            for post in &posts {
                print_post(post);
                if let Some(dir) = &config.output.directory {
                    save_post(dir, post, render_options(config))?;
                }
            }
            print_summary("posts", posts.len());
        }
        FetchMode::Plans => {
            let creator_id = parse_creator_id(target)?;
            let plans = client.creators()?.list_plans(&creator_id).await?;
            for plan in &plans {
                print_membership(plan);
            }
            print_summary("plans", plans.len());
        }
        FetchMode::Supporting => {
            let plans = collect("Fetching supported plans", client.plans()?.iterate_supporting())
                .await?;
            for plan in &plans {
                print_membership(plan);
            }
            print_summary("supported plans", plans.len());
        }
        FetchMode::Newsletters => {
            let messages = if target.is_empty() {
                collect("Fetching newsletters", client.newsletters()?.iterate_received()).await?
            } else {
                let creator_id = parse_creator_id(target)?;
                collect(
                    &format!("Fetching newsletters from @{}", creator_id),
                    client.creators()?.iterate_newsletters(&creator_id),
                )
                .await?
            };
            for message in &messages {
                print_message(message);
            }
            print_summary("newsletters", messages.len());
        }
    }

    Ok(())
}

/// Drain a stream behind a spinner.
async fn collect<T>(message: &str, stream: impl Stream<Item = Result<T>>) -> Result<Vec<T>> {
    let mut progress = FetchProgress::start(message);
    pin_mut!(stream);

    let mut items = Vec::new();
    loop {
        match stream.try_next().await {
            Ok(Some(item)) => {
                items.push(item);
                progress.inc();
            }
            Ok(None) => break,
            Err(e) => {
                progress.fail();
                return Err(e);
            }
        }
    }

    progress.finish();
    Ok(items)
}

fn render_options(config: &Config) -> RenderOptions {
    RenderOptions {
        pretty: config.output.pretty,
    }
}

/// Write a post body as an HTML document.
fn save_post(dir: &Path, post: &Post, options: RenderOptions) -> Result<()> {
    if post.body.is_empty() {
        print_warning(&format!("Post {} has no readable body, not saved", post.id));
        return Ok(());
    }

    ensure_dir(dir)?;
    let path = dir.join(post_filename(&post.published_time, &post.id, &post.title)?);
    std::fs::write(&path, post.body.render_with(options))?;
    print_success(&format!("Saved {}", path.display()));
    Ok(())
}
