//! Source list loading
//!
//! Sources come either from a TOML file of `[[sources]]` tables or from a
//! `lists` seed payload of the metadata API.

use anyhow::Context;
use rulewatch_core::discovery::list_sources;
use rulewatch_core::model::Source;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SourcesFile {
    #[serde(default)]
    sources: Vec<SourceEntry>,
}

#[derive(Debug, Deserialize)]
struct SourceEntry {
    id: String,
    url: String,
}

fn parse_sources_toml(text: &str) -> anyhow::Result<Vec<Source>> {
    let file: SourcesFile = toml::from_str(text).context("invalid sources file")?;
    let mut seen = HashSet::new();
    let mut sources = Vec::with_capacity(file.sources.len());
    for entry in file.sources {
        if !seen.insert(entry.id.clone()) {
            anyhow::bail!("duplicate source id {:?}", entry.id);
        }
        let source = Source::new(entry.id.clone(), &entry.url)
            .with_context(|| format!("source {:?}", entry.id))?;
        sources.push(source);
    }
    Ok(sources)
}

/// Read a TOML sources file
pub fn load_sources_file(path: &Path) -> anyhow::Result<Vec<Source>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_sources_toml(&text)
}

/// Read a `lists` seed payload, keeping lists with a fetchable view URL
pub fn load_seed_file(path: &Path) -> anyhow::Result<Vec<Source>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(list_sources(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources_toml() {
        let sources = parse_sources_toml(
            r#"
            [[sources]]
            id = "easylist"
            url = "https://easylist.to/easylist/easylist.txt"

            [[sources]]
            id = "easyprivacy"
            url = "https://easylist.to/easylist/easyprivacy.txt"
            "#,
        )
        .unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[1].id, "easyprivacy");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = parse_sources_toml(
            r#"
            [[sources]]
            id = "a"
            url = "https://a.example/list.txt"

            [[sources]]
            id = "a"
            url = "https://b.example/list.txt"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(parse_sources_toml("[[sources]]\nid = \"a\"\nurl = \"ftp://a.example/x\"\n").is_err());
    }

    #[test]
    fn test_empty_file_has_no_sources() {
        assert!(parse_sources_toml("").unwrap().is_empty());
    }
}
