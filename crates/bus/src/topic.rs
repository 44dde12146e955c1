use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The topic name is invalid.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid topic {0:?}")]
pub struct InvalidTopic(pub String);

/// A concrete (non-wildcard) topic messages can be published or sent to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Creates a new `Topic`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTopic` if the name is empty, has an empty token, or contains
    /// whitespace or wildcards.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidTopic> {
        let name = name.into();
        if name.is_empty()
            || name.starts_with('.')
            || name.ends_with('.')
            || name.contains("..")
            || name.contains('*')
            || name.contains('>')
            || name.chars().any(char::is_whitespace)
        {
            return Err(InvalidTopic(name));
        }
        Ok(Self(name))
    }

    /// Returns the topic name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Topic {
    type Err = InvalidTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
