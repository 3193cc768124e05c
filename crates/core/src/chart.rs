//! Chart metadata extraction from packaged charts.

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Component;

/// Name of the metadata file inside a chart archive.
pub const CHART_METADATA_FILE: &str = "Chart.yaml";

/// Upper bound on the size of `Chart.yaml` read from an archive.
const MAX_CHART_METADATA_SIZE: u64 = 1024 * 1024;

/// A chart maintainer entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Contents of a chart's `Chart.yaml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<Maintainer>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_version: Option<String>,
}

impl ChartMetadata {
    /// Parse `Chart.yaml` content.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let metadata: Self = serde_yaml::from_str(yaml).map_err(|e| {
            crate::Error::InvalidPackage(format!("failed to parse {CHART_METADATA_FILE}: {e}"))
        })?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Extract and parse `Chart.yaml` from a gzip'd chart archive.
    ///
    /// The metadata file must sit directly under the archive's top-level
    /// chart directory (`<chart>/Chart.yaml`).
    pub fn from_package(content: &[u8]) -> crate::Result<Self> {
        let yaml = read_chart_metadata(content)?;
        Self::from_yaml(&yaml)
    }

    /// Check the fields every chart must carry.
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(crate::Error::InvalidPackage(
                "chart metadata is missing a name".to_string(),
            ));
        }
        if self.version.trim().is_empty() {
            return Err(crate::Error::InvalidPackage(
                "chart metadata is missing a version".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_chart_metadata(content: &[u8]) -> crate::Result<String> {
    let archive_err =
        |e: std::io::Error| crate::Error::InvalidPackage(format!("failed to read archive: {e}"));

    let decoder = GzDecoder::new(content);
    let mut archive = tar::Archive::new(decoder);

    for entry in archive.entries().map_err(archive_err)? {
        let entry = entry.map_err(archive_err)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        if !is_chart_metadata_path(&entry.path().map_err(archive_err)?) {
            continue;
        }

        let mut yaml = String::new();
        entry
            .take(MAX_CHART_METADATA_SIZE)
            .read_to_string(&mut yaml)
            .map_err(archive_err)?;
        return Ok(yaml);
    }

    Err(crate::Error::InvalidPackage(format!(
        "{CHART_METADATA_FILE} not found in archive"
    )))
}

fn is_chart_metadata_path(path: &std::path::Path) -> bool {
    let mut parts = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir));
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(Component::Normal(_)), Some(Component::Normal(file)), None)
            if file == CHART_METADATA_FILE
    )
}
