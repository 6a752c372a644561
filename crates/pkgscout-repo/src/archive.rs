//! Package archive handling shared by the files resources

use pkgscout_core::Package;
use std::path::{Path, PathBuf};

use crate::error::{RepoError, Result};

/// Compute SHA256 digest of data, hex encoded
pub fn compute_digest(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Check if two digests match (supports various formats)
pub fn digest_matches(expected: &str, actual: &str) -> bool {
    let normalize = |d: &str| {
        d.trim()
            .to_lowercase()
            .replace("sha256:", "")
            .replace("sha256-", "")
    };
    normalize(expected) == normalize(actual)
}

/// Verify `data` against the package hash when it is a SHA-256 digest
///
/// Packages without a hash, or hashed with another algorithm, pass unchecked.
pub fn verify_package(package: &Package, data: &[u8]) -> Result<()> {
    let Some(expected) = &package.hash else {
        return Ok(());
    };

    let is_sha256 = package
        .hash_algorithm
        .as_deref()
        .is_none_or(|alg| alg.eq_ignore_ascii_case("sha256"));
    if !is_sha256 {
        tracing::debug!(
            "Skipping integrity check for {} (algorithm {:?})",
            package.id,
            package.hash_algorithm
        );
        return Ok(());
    }

    let actual = compute_digest(data);
    if digest_matches(expected, &actual) {
        Ok(())
    } else {
        Err(RepoError::IntegrityCheckFailed {
            id: package.id.clone(),
            expected: expected.clone(),
            actual,
        })
    }
}

/// Directory a package version is installed into
pub fn install_dir(root: &Path, package: &Package) -> PathBuf {
    root.join(package.id.to_lowercase())
        .join(package.version.to_string())
}

/// Extract a tar.gz archive
pub fn extract_archive(data: &[u8], dest: &Path) -> Result<()> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let gz = GzDecoder::new(std::io::Cursor::new(data));
    let mut archive = Archive::new(gz);

    std::fs::create_dir_all(dest)?;
    archive.unpack(dest)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{make_archive, sha256_hex};
    use pkgscout_core::PackageVersion;

    #[test]
    fn test_compute_digest() {
        let digest = compute_digest(b"hello world");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, sha256_hex(b"hello world"));
    }

    #[test]
    fn test_digest_matches() {
        assert!(digest_matches("sha256:abc123", "ABC123"));
        assert!(digest_matches("sha256-abc123", "abc123"));
        assert!(!digest_matches("sha256:abc123", "xyz789"));
    }

    #[test]
    fn test_verify_package() {
        let data = b"archive bytes";
        let mut pkg = Package::new("foo", PackageVersion::new(1, 0, 0));
        assert!(verify_package(&pkg, data).is_ok());

        pkg.hash = Some(sha256_hex(data));
        assert!(verify_package(&pkg, data).is_ok());

        pkg.hash = Some("sha256:deadbeef".to_string());
        assert!(matches!(
            verify_package(&pkg, data),
            Err(RepoError::IntegrityCheckFailed { .. })
        ));

        pkg.hash_algorithm = Some("SHA512".to_string());
        assert!(verify_package(&pkg, data).is_ok());
    }

    #[test]
    fn test_extract_archive() {
        let dir = tempfile::tempdir().unwrap();
        let data = make_archive(&[("bin/tool", "#!/bin/sh"), ("README", "hi")]);
        extract_archive(&data, dir.path()).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("README")).unwrap(),
            "hi"
        );
        assert!(dir.path().join("bin/tool").is_file());
    }

    #[test]
    fn test_install_dir() {
        let pkg = Package::new("Json.Core", PackageVersion::new(2, 0, 0));
        assert_eq!(
            install_dir(Path::new("/opt/pkgs"), &pkg),
            PathBuf::from("/opt/pkgs/json.core/2.0.0")
        );
    }
}
