//! Streaming payload digests.
//!
//! LVFS metainfo releases carry both a SHA-1 and a SHA-256 content checksum
//! for the firmware payload, so both are computed in one pass.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::domain::{FwcabError, Result};

const CHUNK_SIZE: usize = 64 * 1024;

/// Lowercase hex digests over a payload file's full content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadDigestPair {
    pub sha1: String,
    pub sha256: String,
}

/// Stream `path` in 64 KiB chunks through both digest accumulators.
pub fn hash_payload(path: &Path) -> Result<PayloadDigestPair> {
    let mut file = File::open(path).map_err(|source| FwcabError::PayloadUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut sha1 = Sha1::new();
    let mut sha256 = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).map_err(|source| FwcabError::PayloadUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        if n == 0 {
            break;
        }
        sha1.update(&buf[..n]);
        sha256.update(&buf[..n]);
    }

    Ok(PayloadDigestPair {
        sha1: hex::encode(sha1.finalize()),
        sha256: hex::encode(sha256.finalize()),
    })
}
