//! Shared fixtures for unit tests

use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use std::path::Path;

pub(crate) const SAMPLE_INDEX: &str = r#"
apiVersion: pkgscout.io/v1
generated: "2024-01-01T00:00:00Z"
entries:
  Json.Core:
    - id: Json.Core
      version: "2.0.0"
      description: Fast JSON parser
      tags: [json, parser]
      downloadUrl: packages/json.core-2.0.0.tar.gz
    - id: Json.Core
      version: "1.0.0"
      description: Fast JSON parser
      tags: [json]
    - id: Json.Core
      version: "3.0.0-beta"
      description: Fast JSON parser
      tags: [json, parser]
  Xml.Tools:
    - id: Xml.Tools
      version: "0.5"
      title: XML utilities
      packageType: tool
"#;

/// Build a `.tar.gz` holding the given `(path, contents)` files
pub(crate) fn make_archive(files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, contents.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Hex SHA-256 of `data`
pub(crate) fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Write a local feed: `index.yaml` plus one archive for `Json.Core` 2.0.0
pub(crate) fn write_local_feed(root: &Path) -> Vec<u8> {
    let archive = make_archive(&[("lib/json.txt", "json core")]);
    std::fs::create_dir_all(root.join("packages")).unwrap();
    std::fs::write(root.join("packages/json.core-2.0.0.tar.gz"), &archive).unwrap();
    std::fs::write(root.join("index.yaml"), SAMPLE_INDEX).unwrap();
    archive
}
