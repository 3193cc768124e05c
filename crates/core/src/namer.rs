//! Canonical artifact naming.
//!
//! Filenames are always derived from artifact content, never taken from the
//! client, so two uploads of the same chart version collide on the same key.

use crate::artifact::{ArtifactIdentity, ArtifactKind};
use crate::chart::ChartMetadata;

/// First line of a clearsigned provenance document.
pub const PROVENANCE_HEADER: &str = "-----BEGIN PGP SIGNED MESSAGE-----";

/// Maps artifact content or identity to a canonical filename.
///
/// Implementations are synchronous and may be CPU-bound; async callers
/// should run them on a blocking thread.
pub trait ArtifactNamer: Send + Sync + 'static {
    /// Filename of a chart package, derived from its archive content.
    fn name_from_package_content(&self, content: &[u8]) -> crate::Result<String>;

    /// Filename of a provenance file, derived from its signed body.
    fn name_from_provenance_content(&self, content: &[u8]) -> crate::Result<String>;

    /// Filename of the chart package for `identity`.
    fn package_name_from_identity(&self, identity: &ArtifactIdentity) -> crate::Result<String>;

    /// Filename of the provenance file for `identity`.
    fn provenance_name_from_identity(&self, identity: &ArtifactIdentity)
    -> crate::Result<String>;

    /// Dispatch on `kind` to the matching content namer.
    fn name_from_content(&self, kind: ArtifactKind, content: &[u8]) -> crate::Result<String> {
        match kind {
            ArtifactKind::Package => self.name_from_package_content(content),
            ArtifactKind::Provenance => self.name_from_provenance_content(content),
        }
    }

    /// Dispatch on `kind` to the matching identity namer.
    fn name_from_identity(
        &self,
        kind: ArtifactKind,
        identity: &ArtifactIdentity,
    ) -> crate::Result<String> {
        match kind {
            ArtifactKind::Package => self.package_name_from_identity(identity),
            ArtifactKind::Provenance => self.provenance_name_from_identity(identity),
        }
    }
}

/// Namer for Helm chart archives and their provenance files.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChartNamer;

impl ChartNamer {
    pub fn new() -> Self {
        Self
    }

    fn checked(identity: &ArtifactIdentity) -> crate::Result<&ArtifactIdentity> {
        identity
            .check()
            .map_err(crate::Error::InvalidIdentity)
            .map(|()| identity)
    }
}

impl ArtifactNamer for ChartNamer {
    fn name_from_package_content(&self, content: &[u8]) -> crate::Result<String> {
        let metadata = ChartMetadata::from_package(content)?;
        let identity = ArtifactIdentity::new(metadata.name, metadata.version);
        identity.check().map_err(crate::Error::InvalidPackage)?;
        Ok(identity.filename(ArtifactKind::Package))
    }

    fn name_from_provenance_content(&self, content: &[u8]) -> crate::Result<String> {
        let identity = identity_from_provenance(content)?;
        Ok(identity.filename(ArtifactKind::Provenance))
    }

    fn package_name_from_identity(&self, identity: &ArtifactIdentity) -> crate::Result<String> {
        Ok(Self::checked(identity)?.filename(ArtifactKind::Package))
    }

    fn provenance_name_from_identity(
        &self,
        identity: &ArtifactIdentity,
    ) -> crate::Result<String> {
        Ok(Self::checked(identity)?.filename(ArtifactKind::Provenance))
    }
}

/// Start of the detached signature block that ends the signed text.
const SIGNATURE_HEADER: &str = "-----BEGIN PGP SIGNATURE-----";

/// YAML document end marker separating the chart metadata from the file
/// digests in the signed text.
const DOCUMENT_END: &str = "...";

/// Read the chart name and version out of a clearsigned provenance file.
///
/// The signed text opens with the chart's `Chart.yaml`, terminated by a
/// YAML document end marker. That document is parsed as chart metadata.
pub fn identity_from_provenance(content: &[u8]) -> crate::Result<ArtifactIdentity> {
    let text = std::str::from_utf8(content)
        .map_err(|_| crate::Error::InvalidProvenance("content is not UTF-8".to_string()))?;

    let metadata = ChartMetadata::from_yaml(&signed_metadata(text)?).map_err(|e| {
        crate::Error::InvalidProvenance(format!("signed chart metadata is invalid: {e}"))
    })?;

    let identity = ArtifactIdentity::new(metadata.name, metadata.version);
    identity.check().map_err(crate::Error::InvalidProvenance)?;
    Ok(identity)
}

/// Extract the chart metadata document from the signed text.
fn signed_metadata(text: &str) -> crate::Result<String> {
    let mut lines = text.lines().map(|l| l.trim_end_matches('\r'));
    if lines.next().map(str::trim) != Some(PROVENANCE_HEADER) {
        return Err(crate::Error::InvalidProvenance(
            "missing PGP signed message header".to_string(),
        ));
    }

    // Armor headers ("Hash: ...") run until the first blank line.
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
    }

    let mut yaml = String::new();
    for line in lines {
        if line.starts_with(SIGNATURE_HEADER) || line.trim_end() == DOCUMENT_END {
            break;
        }
        // Clearsigned text dash-escapes lines that begin with '-'.
        let line = line
            .strip_prefix("- ")
            .filter(|rest| rest.starts_with('-'))
            .unwrap_or(line);
        yaml.push_str(line);
        yaml.push('\n');
    }

    if yaml.trim().is_empty() {
        return Err(crate::Error::InvalidProvenance(
            "signed message carries no chart metadata".to_string(),
        ));
    }
    Ok(yaml)
}
