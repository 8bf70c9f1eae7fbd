//! Rewrite options and their validation
//!
//! `RewriteOptions` is the user-facing shape, loaded from a JSON file or
//! assembled from CLI flags. It keeps `keyword` as a raw JSON value so that a
//! wrongly typed keyword is reported as a configuration error rather than a
//! deserialization failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors, raised once per invocation before any file is read
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("The options are missing!")]
    ConfigurationMissing,

    #[error("The keyword must be string or array of the strings!")]
    InvalidKeywordType,

    #[error("cannot read options file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse options file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Stable code used in result items
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::ConfigurationMissing => "CONFIGURATION_MISSING",
            ConfigError::InvalidKeywordType => "INVALID_KEYWORD_TYPE",
            ConfigError::Read { .. } => "CONFIG_READ",
            ConfigError::Parse { .. } => "CONFIG_PARSE",
        }
    }
}

/// Raw rewrite options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewriteOptions {
    /// String, array of strings, or null
    #[serde(default, alias = "keywords", skip_serializing_if = "Option::is_none")]
    pub keyword: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, rename = "whiteList", alias = "white_list")]
    pub white_list: bool,
}

impl RewriteOptions {
    /// Load options from a JSON file. A file containing `null` yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str::<Option<Self>>(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Keyword filter as written by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
    None,
    Single(String),
    Many(Vec<String>),
}

impl Keyword {
    /// Classify a raw keyword value.
    ///
    /// `null` is treated as absent. Anything other than a string or an array
    /// of strings is rejected.
    pub fn from_value(value: Option<&Value>) -> Result<Self, ConfigError> {
        match value {
            None | Some(Value::Null) => Ok(Keyword::None),
            Some(Value::String(s)) => Ok(Keyword::Single(s.clone())),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(ConfigError::InvalidKeywordType),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Keyword::Many),
            Some(_) => Err(ConfigError::InvalidKeywordType),
        }
    }

    /// Canonical ordered sequence; empty means no filter.
    pub fn into_sequence(self) -> Vec<String> {
        match self {
            Keyword::None => Vec::new(),
            Keyword::Single(s) if s.is_empty() => Vec::new(),
            Keyword::Single(s) => vec![s],
            Keyword::Many(items) => items,
        }
    }
}
