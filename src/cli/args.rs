//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{CacheSetting, Config, FetchMode};

/// Subscription platform collector CLI.
#[derive(Parser, Debug)]
#[command(
    name = "collector",
    version,
    about = "Collect creators, posts, plans and newsletters from pixivFANBOX",
    long_about = "A CLI tool to fetch content from subscription-based platforms.\n\n\
                  Responses are cached on disk and requests are rate limited. Post bodies \
                  can be saved as HTML documents."
)]
pub struct Args {
    /// What to fetch.
    #[arg(short, long, value_enum, default_value_t = FetchModeArg::User)]
    pub mode: FetchModeArg,

    /// Creator ID, creator URL, post ID or post URL, depending on the mode.
    #[arg(short, long)]
    pub target: Option<String>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// FANBOXSESSID cookie value.
    #[arg(short, long = "session-id", env = "FANBOX_SESSION_ID")]
    pub session_id: Option<String>,

    /// Browser user agent string.
    #[arg(short = 'a', long = "user-agent", env = "FANBOX_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Response cache lifetime, e.g. "1 day", "2h, 30m" or seconds.
    #[arg(long, conflicts_with = "no_cache")]
    pub cache: Option<String>,

    /// Disable response caching.
    #[arg(long)]
    pub no_cache: bool,

    /// Only cache responses the server allows to be cached.
    #[arg(long)]
    pub follow_cache_control: bool,

    /// Request quota, e.g. "10 req/s" or "100 req/min".
    #[arg(long)]
    pub rate_limit: Option<String>,

    /// Maximum retries for connection failures.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Upstream proxy URL.
    #[arg(long, env = "COLLECTOR_PROXY")]
    pub proxy: Option<String>,

    /// Response cache directory.
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Save rendered post bodies as HTML into this directory.
    #[arg(short = 'o', long = "output")]
    pub output_directory: Option<PathBuf>,

    /// Render post bodies without indentation.
    #[arg(long)]
    pub compact: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI fetch mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FetchModeArg {
    /// Show the user the credentials belong to.
    User,
    /// Show a creator's profile.
    Creator,
    /// Fetch a single post and render its body.
    Post,
    /// Fetch every post of a creator with bodies.
    Posts,
    /// List the plans offered by a creator.
    Plans,
    /// List the plans you support.
    Supporting,
    /// List received newsletters.
    Newsletters,
}

impl From<FetchModeArg> for FetchMode {
    fn from(arg: FetchModeArg) -> Self {
        match arg {
            FetchModeArg::User => FetchMode::User,
            FetchModeArg::Creator => FetchMode::Creator,
            FetchModeArg::Post => FetchMode::Post,
            FetchModeArg::Posts => FetchMode::Posts,
            FetchModeArg::Plans => FetchMode::Plans,
            FetchModeArg::Supporting => FetchMode::Supporting,
            FetchModeArg::Newsletters => FetchMode::Newsletters,
        }
    }
}

impl Args {
    /// The selected fetch mode.
    pub fn fetch_mode(&self) -> FetchMode {
        self.mode.into()
    }

    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        // Account
        if let Some(session_id) = &self.session_id {
            config.account.session_id = session_id.clone();
        }

        if let Some(user_agent) = &self.user_agent {
            config.account.user_agent = Some(user_agent.clone());
        }

        // Client
        if self.no_cache {
            config.client.cache = CacheSetting::Enabled(false);
        } else if let Some(cache) = &self.cache {
            config.client.cache = CacheSetting::Duration(cache.clone());
        }

        if self.follow_cache_control {
            config.client.follow_cache_control = true;
        }

        if let Some(rate_limit) = &self.rate_limit {
            config.client.rate_limit = rate_limit.clone();
        }

        if let Some(retries) = self.retries {
            config.client.retries = retries;
        }

        if let Some(proxy) = &self.proxy {
            config.client.proxy = Some(proxy.clone());
        }

        if let Some(dir) = &self.cache_dir {
            config.client.cache_dir = Some(dir.clone());
        }

        // Output
        if let Some(dir) = &self.output_directory {
            config.output.directory = Some(dir.clone());
        }

        if self.compact {
            config.output.pretty = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_and_target() {
        let args = Args::parse_from(["collector", "--mode", "post", "--target", "1234567"]);
        assert_eq!(args.fetch_mode(), FetchMode::Post);
        assert_eq!(args.target.as_deref(), Some("1234567"));

        let args = Args::parse_from(["collector"]);
        assert_eq!(args.fetch_mode(), FetchMode::User);
    }

    #[test]
    fn test_merge_overrides_config() {
        let args = Args::parse_from([
            "collector",
            "--session-id",
            "1_abc",
            "--no-cache",
            "--rate-limit",
            "2 req/s",
            "--retries",
            "5",
            "--compact",
            "-o",
            "out",
        ]);
        let mut config = Config::default();
        args.merge_into_config(&mut config);

        assert_eq!(config.account.session_id, "1_abc");
        assert_eq!(config.client.cache, CacheSetting::Enabled(false));
        assert_eq!(config.client.rate_limit, "2 req/s");
        assert_eq!(config.client.retries, 5);
        assert!(!config.output.pretty);
        assert_eq!(config.output.directory, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_merge_keeps_unset_values() {
        let args = Args::parse_from(["collector", "--cache", "2h"]);
        let mut config = Config::default();
        config.client.retries = 7;
        args.merge_into_config(&mut config);

        assert_eq!(config.client.cache, CacheSetting::Duration("2h".into()));
        assert_eq!(config.client.retries, 7);
        assert!(config.output.pretty);
    }
}
