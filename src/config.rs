use std::fmt;
use std::num::ParseIntError;

use ini::{Ini, Properties};

/// Settings read from the `[gitlab]` section of `~/.i3block-gitlab`.
///
/// Loaded once at startup, immutable afterward.
#[derive(Debug, Clone)]
pub struct Config {
    pub group_id: u64,
    pub group_name: String,
    pub base_url: String,
    pub user_id: u64,
    pub web_browser: String,
    pub label: String,
    pub approved_merge_requests_label: String,
    pub all_merge_requests_label: String,
}

#[derive(Debug)]
pub enum ConfigError {
    Load(ini::Error),
    MissingSection(&'static str),
    MissingKey(&'static str),
    InvalidNumber {
        key: &'static str,
        value: String,
        cause: ParseIntError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Load(err) => write!(f, "{}", err),
            ConfigError::MissingSection(section) => {
                write!(f, "missing configuration section [{}]", section)
            }
            ConfigError::MissingKey(key) => write!(f, "missing configuration key '{}'", key),
            ConfigError::InvalidNumber { key, value, cause } => {
                write!(f, "configuration key '{}' is not a number ({:?}): {}", key, value, cause)
            }
        }
    }
}

impl From<ini::Error> for ConfigError {
    fn from(error: ini::Error) -> Self {
        ConfigError::Load(error)
    }
}

pub fn parse(filename: &str) -> Result<Config, ConfigError> {
    let file = Ini::load_from_file(filename)?;

    let section = file
        .section(Some("gitlab"))
        .ok_or(ConfigError::MissingSection("gitlab"))?;

    Ok(Config {
        group_id: int_key(section, "group_id")?,
        group_name: required(section, "group_name")?.to_string(),
        base_url: required(section, "base_url")?.to_string(),
        user_id: int_key(section, "user_id")?,
        web_browser: required(section, "web_browser")?.to_string(),
        label: label(section, "label"),
        approved_merge_requests_label: label(section, "approved_merge_requests_label"),
        all_merge_requests_label: label(section, "all_merge_requests_label"),
    })
}

fn required<'a>(section: &'a Properties, key: &'static str) -> Result<&'a str, ConfigError> {
    section.get(key).ok_or(ConfigError::MissingKey(key))
}

fn int_key(section: &Properties, key: &'static str) -> Result<u64, ConfigError> {
    let value = required(section, key)?;

    value.parse().map_err(|cause| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
        cause,
    })
}

/// Optional label keys default to empty; surrounding double quotes are
/// stripped so quoted INI values render cleanly in the status line.
fn label(section: &Properties, key: &str) -> String {
    section.get(key).unwrap_or("").trim_matches('"').to_string()
}
