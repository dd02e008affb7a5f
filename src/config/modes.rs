//! Fetch mode definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the CLI should fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Show the user the credentials belong to (default).
    #[default]
    User,
    /// Show a creator's profile.
    Creator,
    /// Fetch a single post and render its body.
    Post,
    /// Fetch every post of a creator, including bodies.
    Posts,
    /// List the plans offered by a creator.
    Plans,
    /// List the plans the user supports.
    Supporting,
    /// List received newsletters, optionally from a single creator.
    Newsletters,
}

impl FetchMode {
    /// Whether the mode needs a `--target` value.
    pub fn requires_target(&self) -> bool {
        matches!(
            self,
            FetchMode::Creator | FetchMode::Post | FetchMode::Posts | FetchMode::Plans
        )
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMode::User => write!(f, "user"),
            FetchMode::Creator => write!(f, "creator"),
            FetchMode::Post => write!(f, "post"),
            FetchMode::Posts => write!(f, "posts"),
            FetchMode::Plans => write!(f, "plans"),
            FetchMode::Supporting => write!(f, "supporting"),
            FetchMode::Newsletters => write!(f, "newsletters"),
        }
    }
}

impl FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(FetchMode::User),
            "creator" => Ok(FetchMode::Creator),
            "post" => Ok(FetchMode::Post),
            "posts" => Ok(FetchMode::Posts),
            "plans" => Ok(FetchMode::Plans),
            "supporting" => Ok(FetchMode::Supporting),
            "newsletters" => Ok(FetchMode::Newsletters),
            _ => Err(format!("Unknown fetch mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_roundtrip() {
        for mode in [
            FetchMode::User,
            FetchMode::Creator,
            FetchMode::Post,
            FetchMode::Posts,
            FetchMode::Plans,
            FetchMode::Supporting,
            FetchMode::Newsletters,
        ] {
            assert_eq!(mode.to_string().parse::<FetchMode>().unwrap(), mode);
        }
        assert!("downloads".parse::<FetchMode>().is_err());
    }

    #[test]
    fn test_requires_target() {
        assert!(FetchMode::Post.requires_target());
        assert!(!FetchMode::Supporting.requires_target());
        assert!(!FetchMode::Newsletters.requires_target());
    }
}
