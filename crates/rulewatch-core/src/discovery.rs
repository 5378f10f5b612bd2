//! Source discovery mapping
//!
//! The metadata API exposes one seed endpoint per data kind. Each kind's
//! seed record has a fixed set of URL-bearing fields, declared here through
//! [`UrlFields`] so that harvesting every URL is a compile-checked match
//! instead of a walk over arbitrary properties.
//!
//! Fetching the seed payloads is the discovery collaborator's job; this
//! module only decodes them.

use crate::errors::Result;
use crate::model::Source;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// Data kinds that publish URLs through a seed endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedKind {
    Licenses,
    Lists,
    Maintainers,
    Software,
    Syntaxes,
}

impl SeedKind {
    pub const ALL: [SeedKind; 5] = [
        SeedKind::Licenses,
        SeedKind::Lists,
        SeedKind::Maintainers,
        SeedKind::Software,
        SeedKind::Syntaxes,
    ];

    /// Endpoint segment on the metadata API
    pub fn endpoint(&self) -> &'static str {
        match self {
            SeedKind::Licenses => "licenses",
            SeedKind::Lists => "lists",
            SeedKind::Maintainers => "maintainers",
            SeedKind::Software => "software",
            SeedKind::Syntaxes => "syntaxes",
        }
    }

    /// Relative path of the seed resource, e.g. `lists/seed`
    pub fn seed_path(&self) -> String {
        format!("{}/seed", self.endpoint())
    }

    /// Parse an endpoint segment back into a kind
    pub fn from_endpoint(endpoint: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.endpoint() == endpoint)
    }
}

/// A seed record with a statically known set of URL fields
pub trait UrlFields: DeserializeOwned {
    const KIND: SeedKind;

    /// Every URL field that is set on this record
    fn urls(&self) -> Vec<&Url>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseUrls {
    pub description_url: Option<Url>,
}

impl UrlFields for LicenseUrls {
    const KIND: SeedKind = SeedKind::Licenses;

    fn urls(&self) -> Vec<&Url> {
        self.description_url.iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUrls {
    pub id: i64,
    pub view_url: Option<Url>,
    pub view_url_mirror1: Option<Url>,
    pub view_url_mirror2: Option<Url>,
    pub home_url: Option<Url>,
    pub policy_url: Option<Url>,
    pub submission_url: Option<Url>,
    pub issues_url: Option<Url>,
    pub forum_url: Option<Url>,
    pub chat_url: Option<Url>,
    pub donate_url: Option<Url>,
}

impl UrlFields for ListUrls {
    const KIND: SeedKind = SeedKind::Lists;

    fn urls(&self) -> Vec<&Url> {
        [
            &self.view_url,
            &self.view_url_mirror1,
            &self.view_url_mirror2,
            &self.home_url,
            &self.policy_url,
            &self.submission_url,
            &self.issues_url,
            &self.forum_url,
            &self.chat_url,
            &self.donate_url,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintainerUrls {
    pub home_url: Option<Url>,
}

impl UrlFields for MaintainerUrls {
    const KIND: SeedKind = SeedKind::Maintainers;

    fn urls(&self) -> Vec<&Url> {
        self.home_url.iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareUrls {
    pub home_url: Option<Url>,
    pub download_url: Option<Url>,
}

impl UrlFields for SoftwareUrls {
    const KIND: SeedKind = SeedKind::Software;

    fn urls(&self) -> Vec<&Url> {
        [&self.home_url, &self.download_url]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxUrls {
    pub definition_url: Option<Url>,
}

impl UrlFields for SyntaxUrls {
    const KIND: SeedKind = SeedKind::Syntaxes;

    fn urls(&self) -> Vec<&Url> {
        self.definition_url.iter().collect()
    }
}

/// Decode a seed payload of one record type and collect its URLs
///
/// # Errors
///
/// `Serialization` if the payload is not a JSON array of `T`.
pub fn harvest<T: UrlFields>(json: &str) -> Result<Vec<Url>> {
    let records: Vec<T> = serde_json::from_str(json)?;
    let urls: Vec<Url> = records
        .iter()
        .flat_map(|r| r.urls().into_iter().cloned())
        .collect();
    tracing::debug!(
        kind = T::KIND.endpoint(),
        records = records.len(),
        urls = urls.len(),
        "Harvested seed urls"
    );
    Ok(urls)
}

/// Collect every URL from a seed payload of the given kind
///
/// # Errors
///
/// `Serialization` if the payload does not match the kind's record shape.
pub fn harvest_urls(kind: SeedKind, json: &str) -> Result<Vec<Url>> {
    match kind {
        SeedKind::Licenses => harvest::<LicenseUrls>(json),
        SeedKind::Lists => harvest::<ListUrls>(json),
        SeedKind::Maintainers => harvest::<MaintainerUrls>(json),
        SeedKind::Software => harvest::<SoftwareUrls>(json),
        SeedKind::Syntaxes => harvest::<SyntaxUrls>(json),
    }
}

/// Turn a `lists` seed payload into capture sources
///
/// Each list with a `viewUrl` becomes one source keyed by its numeric id.
/// Lists without a `viewUrl` or with a non-http(s) one are skipped.
///
/// # Errors
///
/// `Serialization` if the payload is not a JSON array of list records.
pub fn list_sources(json: &str) -> Result<Vec<Source>> {
    let lists: Vec<ListUrls> = serde_json::from_str(json)?;
    Ok(lists
        .into_iter()
        .filter_map(|list| {
            let url = list.view_url?;
            let source = Source {
                id: list.id.to_string(),
                url,
            };
            source.validate().ok().map(|_| source)
        })
        .collect())
}
