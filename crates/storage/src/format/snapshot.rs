//! Snapshot file format
//!
//! ```text
//! +-------+---------+---------+----------------------------+
//! | magic | version |  crc32  | body (MessagePack)         |
//! | 4 B   | u16 LE  | u32 LE  | variant, version, entries  |
//! +-------+---------+---------+----------------------------+
//! ```
//!
//! The checksum covers the body only. Files are replaced atomically: the new
//! snapshot is written beside the old one and renamed over it.

use custody_core::{Error, Key, Result, Variant, Versioned};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Magic bytes identifying a snapshot file
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"CSTD";

/// Current snapshot format version
pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

/// Header size: magic + version + crc32
pub const SNAPSHOT_HEADER_SIZE: usize = 4 + 2 + 4;

/// Full contents of a store at one commit version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Variant the store was written under
    pub variant: Variant,
    /// Highest commit version contained
    pub version: u64,
    /// Every stored entry
    pub entries: Vec<(Key, Versioned)>,
}

/// Encode a snapshot to bytes
pub fn encode(snapshot: &Snapshot) -> Result<Vec<u8>> {
    let body = rmp_serde::to_vec(snapshot).map_err(|e| Error::Serialization(e.to_string()))?;
    let crc = crc32fast::hash(&body);

    let mut bytes = Vec::with_capacity(SNAPSHOT_HEADER_SIZE + body.len());
    bytes.extend_from_slice(&SNAPSHOT_MAGIC);
    bytes.extend_from_slice(&SNAPSHOT_FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&crc.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode a snapshot, verifying magic, format version and checksum
pub fn decode(bytes: &[u8]) -> Result<Snapshot> {
    if bytes.len() < SNAPSHOT_HEADER_SIZE {
        return Err(Error::Corruption(format!(
            "snapshot too short: {} bytes",
            bytes.len()
        )));
    }
    if bytes[0..4] != SNAPSHOT_MAGIC {
        return Err(Error::Corruption("bad snapshot magic".into()));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != SNAPSHOT_FORMAT_VERSION {
        return Err(Error::Corruption(format!(
            "unsupported snapshot format version {}",
            version
        )));
    }

    let expected = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
    let body = &bytes[SNAPSHOT_HEADER_SIZE..];
    let actual = crc32fast::hash(body);
    if expected != actual {
        return Err(Error::Corruption(format!(
            "snapshot checksum mismatch: expected {:08x}, got {:08x}",
            expected, actual
        )));
    }

    rmp_serde::from_slice(body).map_err(|e| Error::Serialization(e.to_string()))
}

/// Write a snapshot to `path`, replacing any previous file atomically
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let bytes = encode(snapshot)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    tracing::debug!(
        path = %path.display(),
        version = snapshot.version,
        entries = snapshot.entries.len(),
        "wrote snapshot"
    );
    Ok(())
}

/// Read the snapshot at `path`, or `None` if no file exists
pub fn read_snapshot(path: &Path) -> Result<Option<Snapshot>> {
    match fs::read(path) {
        Ok(bytes) => decode(&bytes).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_core::{Field, Scope};

    fn sample() -> Snapshot {
        Snapshot {
            variant: Variant::PerAccount,
            version: 5,
            entries: vec![
                (Key::new(Scope::Global, Field::Created), Versioned::new(1, 1)),
                (
                    Key::new(Scope::account("alice"), Field::Stage),
                    Versioned::new(3, 5),
                ),
            ],
        }
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode(&sample()).unwrap();
        assert_eq!(&bytes[0..4], b"CSTD");
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), SNAPSHOT_FORMAT_VERSION);
        assert_eq!(decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_flipped_body_byte_fails_checksum() {
        let mut bytes = encode(&sample()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::Corruption(msg) if msg.contains("checksum")));
    }

    #[test]
    fn test_truncated_and_foreign_files() {
        assert!(matches!(decode(b"CST"), Err(Error::Corruption(_))));
        assert!(matches!(
            decode(b"XXXX\x01\x00\x00\x00\x00\x00"),
            Err(Error::Corruption(_))
        ));
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custody.snap");
        assert!(read_snapshot(&path).unwrap().is_none());

        write_snapshot(&path, &sample()).unwrap();
        assert_eq!(read_snapshot(&path).unwrap(), Some(sample()));
        assert!(!path.with_extension("tmp").exists());
    }
}
