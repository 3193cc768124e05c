//! Repository index model (`index.yaml`).

use crate::chart::ChartMetadata;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// API version written to every index.
pub const INDEX_API_VERSION: &str = "v1";

/// Version selector that resolves to the highest available version.
pub const LATEST_VERSION: &str = "latest";

/// One chart version listed in an index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartVersion {
    #[serde(flatten)]
    pub metadata: ChartMetadata,
    /// Download URLs, relative to the tenant root.
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    /// Hex SHA-256 of the package archive.
    #[serde(default)]
    pub digest: String,
}

impl ChartVersion {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn version(&self) -> &str {
        &self.metadata.version
    }
}

/// A tenant's repository index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexFile {
    pub api_version: String,
    pub entries: BTreeMap<String, Vec<ChartVersion>>,
    #[serde(with = "time::serde::rfc3339")]
    pub generated: OffsetDateTime,
}

impl Default for IndexFile {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexFile {
    /// An empty index generated now.
    pub fn new() -> Self {
        Self {
            api_version: INDEX_API_VERSION.to_string(),
            entries: BTreeMap::new(),
            generated: OffsetDateTime::now_utc(),
        }
    }

    /// Add a chart version. Call [`IndexFile::sort_entries`] once all
    /// versions are in.
    pub fn add(&mut self, version: ChartVersion) {
        self.entries
            .entry(version.metadata.name.clone())
            .or_default()
            .push(version);
    }

    /// Order every chart's versions from newest to oldest.
    ///
    /// Versions that are not valid semver sort after all valid ones, by
    /// string order.
    pub fn sort_entries(&mut self) {
        for versions in self.entries.values_mut() {
            versions.sort_by(|a, b| compare_versions_desc(a.version(), b.version()));
        }
    }

    /// Every version of `name`, newest first.
    pub fn chart(&self, name: &str) -> Option<&[ChartVersion]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Resolve a version selector for `name`.
    ///
    /// An empty selector or `latest` yields the highest version. Otherwise
    /// the selector matches exactly, or by semver equality when both parse.
    pub fn resolve(&self, name: &str, version: &str) -> Option<&ChartVersion> {
        let versions = self.chart(name)?;
        if version.is_empty() || version == LATEST_VERSION {
            return versions.first();
        }

        if let Some(exact) = versions.iter().find(|v| v.version() == version) {
            return Some(exact);
        }

        let wanted = parse_version(version)?;
        versions
            .iter()
            .find(|v| parse_version(v.version()).is_some_and(|have| have == wanted))
    }

    /// Number of chart versions across all charts.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> crate::Result<String> {
        serde_yaml::to_string(self).map_err(|e| crate::Error::Serialization(e.to_string()))
    }
}

fn parse_version(version: &str) -> Option<semver::Version> {
    semver::Version::parse(version.trim_start_matches('v')).ok()
}

fn compare_versions_desc(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.cmp(a),
    }
}
