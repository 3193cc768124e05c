//! Chart and provenance fixtures.

use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;

/// Build a gzip'd chart archive for `name`/`version`.
#[allow(dead_code)]
pub fn chart_package(name: &str, version: &str) -> Bytes {
    chart_package_with_description(name, version, "A test chart")
}

/// Same as [`chart_package`] with a custom description, for distinct content
/// under the same identity.
#[allow(dead_code)]
pub fn chart_package_with_description(name: &str, version: &str, description: &str) -> Bytes {
    let chart_yaml =
        format!("apiVersion: v2\nname: {name}\nversion: {version}\ndescription: {description}\n");
    archive(&[
        (format!("{name}/Chart.yaml"), chart_yaml),
        (format!("{name}/values.yaml"), "replicaCount: 1\n".to_string()),
    ])
}

/// A gzip'd tarball with no `Chart.yaml`.
#[allow(dead_code)]
pub fn invalid_package() -> Bytes {
    archive(&[("broken/values.yaml".to_string(), "a: b\n".to_string())])
}

fn archive(files: &[(String, String)]) -> Bytes {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, body) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, body.as_bytes())
            .expect("append tar entry");
    }
    let encoder = builder.into_inner().expect("finish tar");
    Bytes::from(encoder.finish().expect("finish gzip"))
}

/// A clearsigned provenance document for `name`/`version`.
#[allow(dead_code)]
pub fn provenance(name: &str, version: &str) -> Bytes {
    Bytes::from(format!(
        "-----BEGIN PGP SIGNED MESSAGE-----\n\
         Hash: SHA512\n\
         \n\
         apiVersion: v2\n\
         name: {name}\n\
         version: {version}\n\
         \n\
         ...\n\
         files:\n  {name}-{version}.tgz: sha256:0000\n\
         -----BEGIN PGP SIGNATURE-----\n\
         \n\
         wsBcBAEBCgAQBQJcMS1oCRAH\n\
         -----END PGP SIGNATURE-----\n"
    ))
}

/// Generate deterministic test data using a seeded pseudo-random generator.
#[allow(dead_code)]
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    let mut state = seed;

    for chunk in data.chunks_mut(8) {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        for (i, byte) in chunk.iter_mut().enumerate() {
            *byte = bytes[i % 8];
        }
    }

    Bytes::from(data)
}
