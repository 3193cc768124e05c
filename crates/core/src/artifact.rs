//! Artifact kinds, identities and per-request artifact records.

use bytes::Bytes;

/// File extension of chart packages.
pub const PACKAGE_EXTENSION: &str = "tgz";

/// File extension of provenance files.
pub const PROVENANCE_EXTENSION: &str = "tgz.prov";

/// The two kinds of artifact a repository stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// A gzip'd chart archive.
    Package,
    /// A detached, clearsigned provenance file for a package.
    Provenance,
}

impl ArtifactKind {
    /// Short identifier used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Provenance => "provenance",
        }
    }

    /// Human-readable name used in response messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Package => "chart package",
            Self::Provenance => "provenance file",
        }
    }

    /// File extension (without the leading dot).
    pub fn extension(self) -> &'static str {
        match self {
            Self::Package => PACKAGE_EXTENSION,
            Self::Provenance => PROVENANCE_EXTENSION,
        }
    }

    /// Classify a filename by extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        // Longer suffix first.
        if has_extension(filename, PROVENANCE_EXTENSION) {
            Some(Self::Provenance)
        } else if has_extension(filename, PACKAGE_EXTENSION) {
            Some(Self::Package)
        } else {
            None
        }
    }
}

fn has_extension(filename: &str, extension: &str) -> bool {
    filename
        .strip_suffix(extension)
        .and_then(|stem| stem.strip_suffix('.'))
        .is_some_and(|stem| !stem.is_empty())
}

/// The logical identity of a chart version.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactIdentity {
    pub name: String,
    pub version: String,
}

impl ArtifactIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Check that name and version are usable as parts of a storage key.
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self) -> Result<(), String> {
        check_part("name", &self.name)?;
        check_part("version", &self.version)
    }

    /// Deterministic filename of the artifact of `kind` with this identity.
    pub fn filename(&self, kind: ArtifactKind) -> String {
        format!("{}-{}.{}", self.name, self.version, kind.extension())
    }
}

fn check_part(what: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{what} is empty"));
    }
    if value.contains("..") {
        return Err(format!("{what} contains '..': {value}"));
    }
    if let Some(c) = value
        .chars()
        .find(|c| matches!(c, '/' | '\\') || c.is_control())
    {
        return Err(format!("{what} contains invalid character {c:?}"));
    }
    Ok(())
}

/// An artifact that passed validation and is waiting to be written.
#[derive(Clone, Debug)]
pub struct CandidateArtifact {
    pub kind: ArtifactKind,
    /// Canonical filename derived from the content.
    pub filename: String,
    pub content: Bytes,
    /// Form field the artifact was extracted from, if any.
    pub source_field: Option<String>,
}

/// An artifact written during the current ingestion call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredArtifact {
    pub kind: ArtifactKind,
    /// Full storage key (tenant-prefixed).
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename() {
        assert_eq!(
            ArtifactKind::from_filename("nginx-1.0.0.tgz"),
            Some(ArtifactKind::Package)
        );
        assert_eq!(
            ArtifactKind::from_filename("nginx-1.0.0.tgz.prov"),
            Some(ArtifactKind::Provenance)
        );
        assert_eq!(ArtifactKind::from_filename("index.yaml"), None);
        assert_eq!(ArtifactKind::from_filename(".tgz"), None);
        assert_eq!(ArtifactKind::from_filename("nginx.prov"), None);
    }

    #[test]
    fn test_identity_filenames() {
        let identity = ArtifactIdentity::new("nginx", "1.2.3");
        assert_eq!(identity.filename(ArtifactKind::Package), "nginx-1.2.3.tgz");
        assert_eq!(
            identity.filename(ArtifactKind::Provenance),
            "nginx-1.2.3.tgz.prov"
        );
    }

    #[test]
    fn test_identity_check() {
        assert!(ArtifactIdentity::new("nginx", "1.2.3").check().is_ok());
        assert!(ArtifactIdentity::new("", "1.2.3").check().is_err());
        assert!(ArtifactIdentity::new("nginx", " ").check().is_err());
        assert!(ArtifactIdentity::new("../etc", "1.0.0").check().is_err());
        assert!(ArtifactIdentity::new("a/b", "1.0.0").check().is_err());
    }
}
