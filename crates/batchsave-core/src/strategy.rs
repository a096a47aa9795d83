//! Archive vs. sequential strategy from client hints.
//!
//! A capability proxy, not device detection: constrained clients skip in-memory
//! archive assembly and save files one by one instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User-agent substrings (lowercase) that mark a mobile client.
pub const MOBILE_TOKENS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
    "mobile",
];

/// Viewports narrower than this take the sequential path.
pub const MOBILE_VIEWPORT_BREAKPOINT: u32 = 768;

/// What the client tells us about itself. Missing fields count as desktop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientHints {
    pub user_agent: Option<String>,
    pub viewport_width: Option<u32>,
}

impl ClientHints {
    pub fn new(user_agent: Option<String>, viewport_width: Option<u32>) -> Self {
        Self {
            user_agent,
            viewport_width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Fetch everything, build one archive, save once.
    Archive,
    /// Save each item individually with a throttle delay.
    Sequential,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Archive => f.write_str("archive"),
            Strategy::Sequential => f.write_str("sequential"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "archive" | "zip" => Ok(Strategy::Archive),
            "sequential" => Ok(Strategy::Sequential),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// True if the user agent contains any mobile token (case-insensitive).
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();
    MOBILE_TOKENS.iter().any(|t| ua.contains(t))
}

/// Sequential for mobile user agents or narrow viewports, archive otherwise.
pub fn select_strategy(hints: &ClientHints) -> Strategy {
    let mobile_ua = hints
        .user_agent
        .as_deref()
        .is_some_and(is_mobile_user_agent);
    let narrow = hints
        .viewport_width
        .is_some_and(|w| w < MOBILE_VIEWPORT_BREAKPOINT);
    if mobile_ua || narrow {
        Strategy::Sequential
    } else {
        Strategy::Archive
    }
}
