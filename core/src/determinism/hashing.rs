use crate::error::{CoreError, CoreResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const HASH_CHUNK_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    pub sha256: String,
    pub size_bytes: u64,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

/// Streams the file through SHA-256 in fixed-size chunks.
pub fn sha256_file(path: &Path) -> CoreResult<FileDigest> {
    let mut f = File::open(path).map_err(|e| CoreError::io_at(path, e))?;
    let mut h = Sha256::new();
    let mut buf = vec![0u8; HASH_CHUNK_BYTES];
    let mut size_bytes: u64 = 0;
    loop {
        let n = f.read(&mut buf).map_err(|e| CoreError::io_at(path, e))?;
        if n == 0 {
            break;
        }
        h.update(&buf[..n]);
        size_bytes += n as u64;
    }
    Ok(FileDigest {
        sha256: hex::encode(h.finalize()),
        size_bytes,
    })
}
