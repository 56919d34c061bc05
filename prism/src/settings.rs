//! Runtime settings read from the process environment.
//!
//! Run `config::load_and_apply` first so `.env` and XDG `config.toml` values are
//! already in the environment. Required values missing is an error; optional values
//! that fail to parse fall back to their default with a warning.

use std::time::Duration;

use thiserror::Error;

use crate::job::{PollConfig, DEFAULT_DATASET_API_BASE, DEFAULT_REQUEST_TIMEOUT};
use crate::sources::{DiscussionSearchOptions, PostDetailOptions, DEFAULT_SERP_ZONE};

pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub posts_dataset_id: String,
    pub comments_dataset_id: String,
    pub api_base: String,
    pub serp_zone: String,
    pub model: String,
    pub poll: PollConfig,
    /// Limit for each dataset and search HTTP request.
    pub request_timeout: Duration,
    pub search: DiscussionSearchOptions,
    pub details: PostDetailOptions,
}

impl Settings {
    /// Reads settings from environment variables.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup` (variable name to value).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(SettingsError::Missing(key));

        let search_defaults = DiscussionSearchOptions::default();
        let detail_defaults = PostDetailOptions::default();
        let poll_defaults = PollConfig::default();

        Ok(Self {
            api_key: required("DATASET_API_KEY")?,
            posts_dataset_id: required("POSTS_DATASET_ID")?,
            comments_dataset_id: required("COMMENTS_DATASET_ID")?,
            api_base: get("DATASET_API_BASE")
                .unwrap_or_else(|| DEFAULT_DATASET_API_BASE.to_string()),
            serp_zone: get("SERP_ZONE").unwrap_or_else(|| DEFAULT_SERP_ZONE.to_string()),
            model: get("PRISM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            poll: PollConfig {
                max_poll_attempts: parse_or(
                    "MAX_POLL_ATTEMPTS",
                    get("MAX_POLL_ATTEMPTS"),
                    poll_defaults.max_poll_attempts,
                ),
                poll_delay: Duration::from_secs(parse_or(
                    "POLL_DELAY_SECS",
                    get("POLL_DELAY_SECS"),
                    poll_defaults.poll_delay.as_secs(),
                )),
            },
            request_timeout: Duration::from_secs(parse_or(
                "REQUEST_TIMEOUT_SECS",
                get("REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT.as_secs(),
            )),
            search: DiscussionSearchOptions {
                date_range: get("DISCUSSION_DATE_RANGE").unwrap_or(search_defaults.date_range),
                sort_order: get("DISCUSSION_SORT").unwrap_or(search_defaults.sort_order),
                post_count: parse_or(
                    "DEFAULT_POST_COUNT",
                    get("DEFAULT_POST_COUNT"),
                    search_defaults.post_count,
                ),
            },
            details: PostDetailOptions {
                days_back: parse_or(
                    "DEFAULT_DAYS_BACK",
                    get("DEFAULT_DAYS_BACK"),
                    detail_defaults.days_back,
                ),
                load_all_replies: parse_bool_or(
                    "DEFAULT_LOAD_ALL_REPLIES",
                    get("DEFAULT_LOAD_ALL_REPLIES"),
                    detail_defaults.load_all_replies,
                ),
                comment_limit: get("DEFAULT_COMMENT_LIMIT").and_then(|v| match v.trim().parse() {
                    Ok(n) => Some(n),
                    Err(_) => {
                        tracing::warn!(
                            value = %v,
                            "DEFAULT_COMMENT_LIMIT is not a number; leaving it unset"
                        );
                        None
                    }
                }),
            },
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match raw {
        None => default,
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %v, %default, "Invalid setting; using default");
            default
        }),
    }
}

fn parse_bool_or(key: &str, raw: Option<String>, default: bool) -> bool {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => default,
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!(key, value = %v, default, "Invalid boolean setting; using default");
                default
            }
        },
    }
}
