mod identity;

pub use identity::{AssetIdentity, ByHash, ByName, IdentityPolicy, WorkSet};

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length in bytes of the SHA-256 digest every asset hash decodes to.
pub const DIGEST_LEN: usize = 32;

const HEX_HASH_LEN: usize = DIGEST_LEN * 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid hash {hash:?} for asset {name:?}: {reason}")]
pub struct InvalidHash {
    pub name: String,
    pub hash: String,
    pub reason: String,
}

/// Asset entry as it appears in a manifest file.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AssetRecord {
    pub name: String,
    pub hash: String,
    #[serde(default)]
    pub size: u64,
}

/// A single content-addressed asset.
///
/// The storage key (`hash_prefix`, `relative_path`) and the decoded digest are
/// derived once from `hash` when the asset is built and never change.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "AssetRecord")]
pub struct Asset {
    name: String,
    hash: String,
    size: u64,
    hash_bytes: [u8; DIGEST_LEN],
    relative_path: String,
}

impl Asset {
    pub fn new(
        name: impl Into<String>,
        hash: impl Into<String>,
        size: u64,
    ) -> Result<Self, InvalidHash> {
        let name = name.into();
        let hash = hash.into();

        let hash_bytes = match decode_hash(&hash) {
            Ok(bytes) => bytes,
            Err(reason) => return Err(InvalidHash { name, hash, reason }),
        };
        // Decoding succeeded, so the hash is ASCII and slicing is safe.
        let relative_path = format!("{}/{}", &hash[..2], hash);

        Ok(Self {
            name,
            hash,
            size,
            hash_bytes,
            relative_path,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Expected length of the asset in bytes, `0` when the manifest omits it.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Two-character shard directory the asset is stored under.
    pub fn hash_prefix(&self) -> &str {
        &self.hash[..2]
    }

    pub fn hash_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.hash_bytes
    }

    /// `<hash_prefix>/<hash>`, used both on disk and in the download URL.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }
}

impl TryFrom<AssetRecord> for Asset {
    type Error = InvalidHash;

    fn try_from(record: AssetRecord) -> Result<Self, Self::Error> {
        Asset::new(record.name, record.hash, record.size)
    }
}

impl From<&Asset> for AssetRecord {
    fn from(asset: &Asset) -> Self {
        Self {
            name: asset.name.clone(),
            hash: asset.hash.clone(),
            size: asset.size,
        }
    }
}

fn decode_hash(hash: &str) -> Result<[u8; DIGEST_LEN], String> {
    if hash.len() < 2 {
        return Err("hash is too short to derive a storage prefix".to_string());
    }

    let decoded = if hash.len() == HEX_HASH_LEN {
        hex::decode(hash).map_err(|e| format!("not valid hex: {e}"))?
    } else {
        BASE32_NOPAD
            .decode(hash.to_ascii_uppercase().as_bytes())
            .map_err(|e| format!("not valid base32: {e}"))?
    };

    decoded.try_into().map_err(|bytes: Vec<u8>| {
        format!(
            "expected a {DIGEST_LEN}-byte digest, got {} bytes",
            bytes.len()
        )
    })
}
