//! Content digests for mirrored files using BLAKE3

use crate::error::SyncError;
use blake3::Hasher;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Block size used when streaming file content
pub const BLOCK_SIZE: usize = 64 * 1024;

/// Content identity of a file (BLAKE3, 256-bit)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<blake3::Hash> for Digest {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "Digest({})", &hex[..16])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Compute the digest of in-memory content
pub fn digest_bytes(content: &[u8]) -> Digest {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hasher.finalize().into()
}

/// Compute the digest of everything a reader yields, one block at a time
pub fn digest_reader<R: Read>(mut reader: R) -> std::io::Result<Digest> {
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; BLOCK_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().into())
}

/// Compute the digest of a file on disk
///
/// The file is streamed in `BLOCK_SIZE` blocks; it is never loaded whole.
pub fn digest_file(path: &Path) -> Result<Digest, SyncError> {
    let read_error = |source| SyncError::Read {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(read_error)?;
    digest_reader(file).map_err(read_error)
}

/// Whether two files have identical content
pub fn files_match(a: &Path, b: &Path) -> Result<bool, SyncError> {
    Ok(digest_file(a)? == digest_file(b)?)
}
