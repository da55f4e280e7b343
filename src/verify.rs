//! Hash verification
//!
//! Payload integrity checks for SHA256, SHA512, SHA3-256 and BLAKE3.

use std::io::Read;
use std::path::Path;

use crate::core::error::{AcquireError, Result};

/// Chunk size for reading files during hashing (1MB)
const CHUNK_SIZE: usize = 1024 * 1024;

/// Supported hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
    Sha3_256,
    Blake3,
}

impl HashAlgorithm {
    /// Order in which digests are picked when a manifest offers several.
    pub const PREFERENCE: [HashAlgorithm; 4] =
        [Self::Sha256, Self::Sha512, Self::Sha3_256, Self::Blake3];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
            Self::Sha3_256 => "SHA3-256",
            Self::Blake3 => "BLAKE3",
        }
    }

    /// Key used in manifests and qualified digests.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Sha3_256 => "sha3-256",
            Self::Blake3 => "blake3",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha512" | "sha-512" => Ok(Self::Sha512),
            "sha3-256" => Ok(Self::Sha3_256),
            "blake3" => Ok(Self::Blake3),
            other => Err(AcquireError::Configuration(format!(
                "unsupported hash algorithm '{other}'"
            ))),
        }
    }
}

/// Compute the lowercase hex digest of a byte payload.
pub fn digest_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => hex_digest::<sha2::Sha256>(bytes),
        HashAlgorithm::Sha512 => hex_digest::<sha2::Sha512>(bytes),
        HashAlgorithm::Sha3_256 => hex_digest::<sha3::Sha3_256>(bytes),
        HashAlgorithm::Blake3 => blake3::hash(bytes).to_hex().to_string(),
    }
}

fn hex_digest<D: sha2::Digest>(bytes: &[u8]) -> String {
    let mut hasher = D::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Verify a payload against an expected digest.
///
/// Comparison is case-insensitive. `artifact` names the payload in the error.
pub fn verify(
    artifact: &str,
    bytes: &[u8],
    algorithm: HashAlgorithm,
    expected: &str,
) -> Result<()> {
    let actual = digest_bytes(algorithm, bytes);
    let expected = expected.trim().to_lowercase();

    if actual != expected {
        return Err(AcquireError::Integrity {
            artifact: artifact.to_string(),
            algorithm: algorithm.name(),
            expected,
            actual,
        });
    }

    Ok(())
}

/// Compute all hashes for a file at once (for the `hash` command).
pub fn compute_all_hashes(file: &Path) -> std::io::Result<FileHashes> {
    use sha2::Digest;

    let mut f = std::fs::File::open(file)?;
    let mut sha256_hasher = sha2::Sha256::new();
    let mut sha512_hasher = sha2::Sha512::new();
    let mut sha3_hasher = sha3::Sha3_256::new();
    let mut blake3_hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = f.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        sha256_hasher.update(&buffer[..n]);
        sha512_hasher.update(&buffer[..n]);
        sha3_hasher.update(&buffer[..n]);
        blake3_hasher.update(&buffer[..n]);
    }

    Ok(FileHashes {
        sha256: hex::encode(sha256_hasher.finalize()),
        sha512: hex::encode(sha512_hasher.finalize()),
        sha3_256: hex::encode(sha3_hasher.finalize()),
        blake3: blake3_hasher.finalize().to_hex().to_string(),
    })
}

/// Container for computed file hashes
#[derive(Debug, Clone)]
pub struct FileHashes {
    pub sha256: String,
    pub sha512: String,
    pub sha3_256: String,
    pub blake3: String,
}
