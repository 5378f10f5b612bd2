use crate::errors::{Result, RuleWatchError};
use serde::{Deserialize, Serialize};
use url::Url;

/// An external rule list tracked for repeated fetching
///
/// Sources are owned by the discovery collaborator; the capture pipeline
/// only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub url: Url,
}

impl Source {
    /// Build a validated source from an id and a URL string
    ///
    /// # Errors
    ///
    /// - `InvalidSourceId` if the id is empty or padded with whitespace
    /// - `InvalidSourceUrl` if the URL does not parse or is not http(s)
    pub fn new(id: impl Into<String>, url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| RuleWatchError::InvalidSourceUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let source = Self {
            id: id.into(),
            url: parsed,
        };
        source.validate()?;
        Ok(source)
    }

    /// Check the id and URL scheme of a source built through serde
    ///
    /// # Errors
    ///
    /// Same as [`Source::new`].
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(RuleWatchError::InvalidSourceId {
                reason: "source id cannot be empty".to_string(),
            });
        }
        if self.id.trim() != self.id {
            return Err(RuleWatchError::InvalidSourceId {
                reason: format!("source id {:?} has surrounding whitespace", self.id),
            });
        }
        match self.url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(RuleWatchError::InvalidSourceUrl {
                url: self.url.to_string(),
                reason: format!("unsupported scheme {}", other),
            }),
        }
    }
}
