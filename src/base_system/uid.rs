//! Facebook 链接中的 UID 提取。
//!
//! 两级匹配：先看帖子/照片/动态这类内容链接（直接带数字 ID），
//! 都不命中时再退回到主页/公共主页链接。

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Uid {
    Numeric(String),
    Username(String),
}

impl Uid {
    pub fn as_str(&self) -> &str {
        match self {
            Uid::Numeric(s) | Uid::Username(s) => s,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Uid::Numeric(_) => "numeric",
            Uid::Username(_) => "username",
        }
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UidError {
    #[error("no link supplied")]
    InputMissing,
    #[error("no uid pattern matched the link")]
    ExtractionFailed,
}

// Content links, tried in order; first hit wins.
const CONTENT_PATTERNS: [(&str, &str); 4] = [
    ("posts", r"facebook\.com/[^/]+/posts/([0-9]+)"),
    ("photo", r"facebook\.com/photo\.php\?fbid=([0-9]+)"),
    ("permalink", r"facebook\.com/permalink\.php\?story_fbid=([0-9]+)"),
    ("story", r"facebook\.com/story\.php\?story_fbid=([0-9]+)"),
];

static RE_CONTENT: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
static RE_PROFILE: OnceLock<Regex> = OnceLock::new();

fn re_content() -> &'static [(&'static str, Regex)] {
    RE_CONTENT.get_or_init(|| {
        CONTENT_PATTERNS
            .iter()
            .map(|(name, pat)| (*name, Regex::new(pat).expect("compile content pattern")))
            .collect()
    })
}

fn re_profile() -> &'static Regex {
    RE_PROFILE.get_or_init(|| {
        Regex::new(r"facebook\.com/(?:profile\.php\?id=|pg/)?([^/]+)(?:/|$)")
            .expect("compile RE_PROFILE")
    })
}

/// Extracts a UID from `url`, or `None` when nothing recognizable is present.
///
/// The input is matched as-is: no trimming, no case folding.
pub fn extract_uid(url: &str) -> Option<Uid> {
    if url.is_empty() {
        return None;
    }

    for (name, re) in re_content() {
        if let Some(m) = re.captures(url).and_then(|c| c.get(1)) {
            debug!(target: "uid", pattern = name, "content pattern matched");
            return Some(Uid::Numeric(m.as_str().to_string()));
        }
    }

    let token = re_profile().captures(url)?.get(1)?.as_str();
    debug!(target: "uid", pattern = "profile", "profile pattern matched");
    if token.bytes().all(|b| b.is_ascii_digit()) {
        Some(Uid::Numeric(token.to_string()))
    } else {
        // Usernames are returned verbatim; resolving them needs the Graph API.
        Some(Uid::Username(token.to_string()))
    }
}

/// Like [`extract_uid`], but tells a missing link apart from an unmatched one.
pub fn resolve_uid(link: Option<&str>) -> Result<Uid, UidError> {
    match link {
        None | Some("") => Err(UidError::InputMissing),
        Some(url) => extract_uid(url).ok_or(UidError::ExtractionFailed),
    }
}
