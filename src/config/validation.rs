//! Configuration validation logic.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::loader::Config;
use crate::config::parse::parse_rate_limit;
use crate::error::{Error, Result};

/// Minimum length for a user agent.
const MIN_USER_AGENT_LENGTH: usize = 20;

/// `FANBOXSESSID` values look like `<user id>_<32 alphanumerics>`.
static SESSION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+_[A-Za-z0-9]{20,}$").unwrap());

static CREATOR_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

static POST_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/posts/(\d+)").unwrap());

static POST_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_session_id(&config.account.session_id)?;
    if let Some(user_agent) = &config.account.user_agent {
        validate_user_agent(user_agent)?;
    }
    config.client.cache_max_age()?;
    parse_rate_limit(&config.client.rate_limit)?;
    if let Some(proxy) = &config.client.proxy {
        url::Url::parse(proxy).map_err(|e| Error::ConfigValidation {
            field: "proxy".to_string(),
            message: format!("'{}' is not a valid URL: {}", proxy, e),
        })?;
    }

    Ok(())
}

/// Validate the session cookie value.
pub fn validate_session_id(session_id: &str) -> Result<()> {
    if session_id.is_empty() {
        return Err(Error::MissingConfig("session_id".to_string()));
    }

    let lower = session_id.to_lowercase();
    if lower.contains("replaceme") || lower.contains("your_session") {
        return Err(Error::ConfigValidation {
            field: "session_id".to_string(),
            message: "Session ID appears to be a placeholder. Copy the FANBOXSESSID cookie from your browser."
                .to_string(),
        });
    }

    if !SESSION_ID.is_match(session_id) {
        return Err(Error::ConfigValidation {
            field: "session_id".to_string(),
            message: "Session ID must look like '<user id>_<token>'".to_string(),
        });
    }

    Ok(())
}

/// Validate the user agent string.
pub fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.len() < MIN_USER_AGENT_LENGTH {
        return Err(Error::ConfigValidation {
            field: "user_agent".to_string(),
            message: format!(
                "User agent must be at least {} characters (got {})",
                MIN_USER_AGENT_LENGTH,
                user_agent.len()
            ),
        });
    }

    Ok(())
}

/// Normalize a creator ID, accepting `@name` and `https://www.fanbox.cc/@name` forms.
pub fn parse_creator_id(input: &str) -> Result<String> {
    let input = input.trim().trim_end_matches('/');

    let candidate = if let Some((_, rest)) = input.split_once("fanbox.cc/@") {
        rest.split('/').next().unwrap_or_default()
    } else if let Some(host) = input
        .strip_prefix("https://")
        .and_then(|rest| rest.strip_suffix(".fanbox.cc"))
    {
        host
    } else {
        input.trim_start_matches('@')
    };

    if CREATOR_ID.is_match(candidate) {
        return Ok(candidate.to_string());
    }

    Err(Error::ConfigValidation {
        field: "creator_id".to_string(),
        message: format!("Invalid creator ID: '{}'", input),
    })
}

/// Extract a post ID from a post URL or a bare ID string.
pub fn parse_post_id(input: &str) -> Result<String> {
    let input = input.trim();

    if input.starts_with("http://") || input.starts_with("https://") {
        if let Some(id) = POST_URL.captures(input).and_then(|c| c.get(1)) {
            return Ok(id.as_str().to_string());
        }

        return Err(Error::ConfigValidation {
            field: "post_id".to_string(),
            message: format!("Could not extract post ID from URL: {}", input),
        });
    }

    if POST_ID.is_match(input) {
        return Ok(input.to_string());
    }

    Err(Error::ConfigValidation {
        field: "post_id".to_string(),
        message: format!(
            "Invalid post ID: '{}'. Must be numeric or a valid post URL.",
            input
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION: &str = "12345678_AbCdEfGhIjKlMnOpQrStUvWxYz012345";

    #[test]
    fn test_valid_session_id() {
        assert!(validate_session_id(SESSION).is_ok());
    }

    #[test]
    fn test_invalid_session_id() {
        assert!(matches!(
            validate_session_id(""),
            Err(Error::MissingConfig(_))
        ));
        assert!(validate_session_id("replaceme").is_err());
        assert!(validate_session_id("abc_def").is_err());
    }

    #[test]
    fn test_validate_config_rejects_bad_rate_limit() {
        let mut config = Config::default();
        config.account.session_id = SESSION.to_string();
        assert!(validate_config(&config).is_ok());

        config.client.rate_limit = "lots".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_rejects_bad_proxy() {
        let mut config = Config::default();
        config.account.session_id = SESSION.to_string();
        config.client.proxy = Some("not a url".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_parse_creator_id() {
        assert_eq!(parse_creator_id("artist").unwrap(), "artist");
        assert_eq!(parse_creator_id("@artist").unwrap(), "artist");
        assert_eq!(
            parse_creator_id("https://www.fanbox.cc/@artist/posts").unwrap(),
            "artist"
        );
        assert_eq!(parse_creator_id("https://artist.fanbox.cc/").unwrap(), "artist");
        assert!(parse_creator_id("not valid!").is_err());
    }

    #[test]
    fn test_parse_post_id() {
        assert_eq!(parse_post_id("1234567").unwrap(), "1234567");
        assert_eq!(
            parse_post_id("https://artist.fanbox.cc/posts/1234567").unwrap(),
            "1234567"
        );
        assert!(parse_post_id("https://artist.fanbox.cc/").is_err());
        assert!(parse_post_id("abc").is_err());
    }
}
