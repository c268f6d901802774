//! On-disk snippet records.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize, from_bytes, to_bytes};

use super::error::{KnowledgeError, KnowledgeResult};

pub(crate) const RKYV_EXTENSION: &str = "rkyv";

const TEMP_EXTENSION: &str = "rkyv.tmp";

/// Evidence snippet persisted to disk.
///
/// Stored as `rkyv` bytes, one file per snippet.
///
/// # Example
/// ```rust
/// use wildscore::knowledge::SnippetRecord;
///
/// let record = SnippetRecord {
///     id: 7,
///     text: "Tiger numbers rose 15% in the Sundarbans".to_string(),
///     source: "cached".to_string(),
///     query: String::new(),
///     timestamp: 0,
///     embedding: vec![],
/// };
/// assert_eq!(record.id, 7);
/// ```
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct SnippetRecord {
    /// Content hash of `text` (also the file stem).
    pub id: u64,
    /// Snippet text.
    pub text: String,
    /// Where the snippet came from (`"cached"`, `"search"`, a title or link).
    pub source: String,
    /// Query that produced the snippet, empty if unknown.
    pub query: String,
    /// Unix timestamp (milliseconds) when stored.
    pub timestamp: i64,
    /// Embedding vector bytes (little-endian f16).
    pub embedding: Vec<u8>,
}

pub(crate) fn record_path(dir: &Path, id: u64) -> PathBuf {
    dir.join(format!("{}.{}", id, RKYV_EXTENSION))
}

fn temp_record_path(dir: &Path, id: u64) -> PathBuf {
    dir.join(format!("{}.{}", id, TEMP_EXTENSION))
}

/// Writes `record` via temp file + fsync + rename and returns the byte size.
pub(crate) fn write_record(dir: &Path, record: &SnippetRecord) -> KnowledgeResult<u64> {
    let bytes = to_bytes::<RkyvError>(record)
        .map_err(|e| KnowledgeError::Serialization(format!("{:?}", e)))?;

    let temp_path = temp_record_path(dir, record.id);
    let final_path = record_path(dir, record.id);

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }

    fs::rename(&temp_path, &final_path)?;

    Ok(bytes.len() as u64)
}

/// Reads and validates a record file.
pub(crate) fn read_record(path: &Path) -> KnowledgeResult<SnippetRecord> {
    let raw = fs::read(path)?;

    // rkyv needs aligned input; a plain Vec<u8> carries no alignment guarantee.
    let mut aligned = AlignedVec::<16>::with_capacity(raw.len());
    aligned.extend_from_slice(&raw);

    from_bytes::<SnippetRecord, RkyvError>(&aligned)
        .map_err(|e| KnowledgeError::Serialization(format!("{}: {:?}", path.display(), e)))
}

/// Removes a record file; a file that is already gone is not an error.
pub(crate) fn remove_record(dir: &Path, id: u64) -> KnowledgeResult<()> {
    match fs::remove_file(record_path(dir, id)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Lists `*.rkyv` files whose stem parses as a snippet id.
pub(crate) fn list_records(dir: &Path) -> KnowledgeResult<Vec<(u64, PathBuf)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(ext) = path.extension()
            && ext == RKYV_EXTENSION
            && let Some(stem) = path.file_stem()
            && let Some(stem_str) = stem.to_str()
            && let Ok(id) = stem_str.parse::<u64>()
        {
            entries.push((id, path));
        }
    }

    Ok(entries)
}
