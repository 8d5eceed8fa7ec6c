//! SHA-256 digest of the input export and build settings, used to skip
//! unchanged rebuilds.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// File inside the output directory holding the last input digest.
pub const DIGEST_FILE: &str = ".tokens.sha256";

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Hex-encoded SHA-256 over the export bytes and the serialized settings
/// they are built with.
#[must_use]
pub fn build_digest(input: &[u8], settings: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((input.len() as u64).to_le_bytes());
    hasher.update(input);
    hasher.update(settings);
    encode_hex(hasher.finalize().as_slice())
}

/// Reader/writer for the digest recorded next to the build outputs.
#[derive(Debug, Clone)]
pub struct DigestStore {
    path: PathBuf,
}

impl DigestStore {
    /// Store for the digest inside `out_dir`.
    #[must_use]
    pub fn in_dir(out_dir: &Path) -> Self {
        Self {
            path: out_dir.join(DIGEST_FILE),
        }
    }

    /// Previously recorded digest, if any.
    #[must_use]
    pub fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
    }

    /// Records `digest`.
    pub fn save(&self, digest: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{digest}\n"))
    }

    /// Returns `true` when `digest` matches the recorded one.
    #[must_use]
    pub fn matches(&self, digest: &str) -> bool {
        self.load().as_deref() == Some(digest)
    }
}
