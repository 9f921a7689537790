use regex::Regex;

use super::errors::ListError;

/// Predicate deciding which listed resources join a `ResourceSet`.
#[derive(Debug, Clone)]
pub enum NameFilter {
    /// Case-sensitive substring match; an empty pattern matches everything.
    Substring(String),
    /// Regular expression searched anywhere in the name.
    Pattern(Regex),
}

impl NameFilter {
    pub fn new(pattern: &str, use_regex: bool) -> Result<Self, ListError> {
        if !use_regex {
            return Ok(NameFilter::Substring(pattern.to_string()));
        }

        Regex::new(pattern)
            .map(NameFilter::Pattern)
            .map_err(|e| ListError::InvalidFilter {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameFilter::Substring(pattern) => name.contains(pattern.as_str()),
            NameFilter::Pattern(regex) => regex.is_match(name),
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, NameFilter::Pattern(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            NameFilter::Substring(pattern) => pattern,
            NameFilter::Pattern(regex) => regex.as_str(),
        }
    }
}

impl Default for NameFilter {
    fn default() -> Self {
        NameFilter::Substring(String::new())
    }
}
