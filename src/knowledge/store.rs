use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::error::{KnowledgeError, KnowledgeResult};
use super::record::{SnippetRecord, list_records, read_record, remove_record, write_record};
use super::{EvidenceSnippet, KnowledgeConfig, KnowledgeStats, KnowledgeStore, SnippetMetadata};
use crate::embedding::utils::{cosine_similarity, embedding_bytes_to_f32, f32_to_embedding_bytes};
use crate::embedding::{Embedder, EmbeddingError};
use crate::hashing::snippet_id;

struct IndexedSnippet {
    text: String,
    source: String,
    timestamp: i64,
    embedding: Vec<f32>,
    bytes: u64,
    last_used: u64,
}

#[derive(Default)]
struct SnippetIndex {
    entries: HashMap<u64, IndexedSnippet>,
    clock: u64,
}

impl SnippetIndex {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn touch(&mut self, id: u64) {
        let now = self.tick();
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.last_used = now;
        }
    }

    fn insert(&mut self, id: u64, mut entry: IndexedSnippet) {
        entry.last_used = self.tick();
        self.entries.insert(id, entry);
    }

    fn expired(&self, now_ms: i64, ttl_ms: i64) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|(_, e)| now_ms.saturating_sub(e.timestamp) > ttl_ms)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Least-recently-used ids beyond `max_entries`.
    fn over_capacity(&self, max_entries: usize) -> Vec<u64> {
        let excess = self.entries.len().saturating_sub(max_entries);
        if excess == 0 {
            return Vec::new();
        }

        let mut by_use: Vec<(u64, i64, u64)> = self
            .entries
            .iter()
            .map(|(id, e)| (e.last_used, e.timestamp, *id))
            .collect();
        by_use.sort_unstable();
        by_use.into_iter().take(excess).map(|(_, _, id)| id).collect()
    }
}

/// File-per-snippet knowledge cache with an in-memory cosine index.
///
/// Readers share the index through a read/write lock; appends and evictions are
/// serialized by a writer lock so file renames and index updates stay in step.
pub struct DiskKnowledgeCache {
    config: KnowledgeConfig,
    embedder: Arc<dyn Embedder>,
    index: RwLock<SnippetIndex>,
    writer: Mutex<()>,
}

impl std::fmt::Debug for DiskKnowledgeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskKnowledgeCache")
            .field("config", &self.config)
            .field("entries", &self.len())
            .finish()
    }
}

impl DiskKnowledgeCache {
    /// Opens the cache at `config.path`, creating the directory if absent.
    #[instrument(skip(embedder), fields(path = %config.path.display()))]
    pub async fn open(
        config: KnowledgeConfig,
        embedder: Arc<dyn Embedder>,
    ) -> KnowledgeResult<Self> {
        let path = config.path.clone();
        let dimension = embedder.dimension();

        let loaded = tokio::task::spawn_blocking(move || {
            ensure_dir(&path)?;
            load_dir(&path, dimension)
        })
        .await??;

        let mut index = SnippetIndex::default();
        for (id, entry) in loaded {
            index.insert(id, entry);
        }

        info!(entries = index.entries.len(), "Opened knowledge cache");

        Ok(Self {
            config,
            embedder,
            index: RwLock::new(index),
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &KnowledgeConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.index.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> KnowledgeStats {
        let index = self.index.read();
        KnowledgeStats {
            entries: index.entries.len(),
            total_bytes: index.entries.values().map(|e| e.bytes).sum(),
        }
    }

    /// Rescans the directory, picking up snippets written by other processes.
    ///
    /// Recency information is kept for snippets already indexed.
    pub async fn reload(&self) -> KnowledgeResult<usize> {
        let _guard = self.writer.lock().await;

        let path = self.config.path.clone();
        let dimension = self.embedder.dimension();
        let loaded = tokio::task::spawn_blocking(move || load_dir(&path, dimension)).await??;

        let mut index = self.index.write();
        let mut previous = std::mem::take(&mut index.entries);
        for (id, mut entry) in loaded {
            match previous.remove(&id) {
                Some(old) => {
                    entry.last_used = old.last_used;
                    index.entries.insert(id, entry);
                }
                None => index.insert(id, entry),
            }
        }

        let count = index.entries.len();
        debug!(entries = count, dropped = previous.len(), "Reloaded knowledge cache");
        Ok(count)
    }

    /// Drops expired snippets. Caller must hold the writer lock.
    async fn expire_locked(&self) -> KnowledgeResult<()> {
        let Some(ttl) = self.config.ttl else {
            return Ok(());
        };

        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expired = {
            let mut index = self.index.write();
            let ids = index.expired(now_millis(), ttl_ms);
            for id in &ids {
                index.entries.remove(id);
            }
            ids
        };

        if !expired.is_empty() {
            info!(count = expired.len(), "Expired knowledge snippets");
            self.remove_files(expired).await?;
        }
        Ok(())
    }

    /// Evicts least-recently-used snippets beyond capacity. Caller must hold the writer lock.
    async fn evict_locked(&self) -> KnowledgeResult<()> {
        let Some(max_entries) = self.config.max_entries else {
            return Ok(());
        };

        let evicted = {
            let mut index = self.index.write();
            let ids = index.over_capacity(max_entries);
            for id in &ids {
                index.entries.remove(id);
            }
            ids
        };

        if !evicted.is_empty() {
            info!(count = evicted.len(), max_entries, "Evicted knowledge snippets");
            self.remove_files(evicted).await?;
        }
        Ok(())
    }

    async fn remove_files(&self, ids: Vec<u64>) -> KnowledgeResult<()> {
        let dir = self.config.path.clone();
        tokio::task::spawn_blocking(move || {
            for id in ids {
                remove_record(&dir, id)?;
            }
            Ok::<_, KnowledgeError>(())
        })
        .await?
    }
}

#[async_trait]
impl KnowledgeStore for DiskKnowledgeCache {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn query_snippets(
        &self,
        text: &str,
        k: usize,
    ) -> KnowledgeResult<Vec<EvidenceSnippet>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        if self.config.ttl.is_some() {
            let _guard = self.writer.lock().await;
            self.expire_locked().await?;
        }

        if self.is_empty() {
            debug!("Knowledge cache empty");
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(text).await?;

        let hits: Vec<(u64, f32, EvidenceSnippet)> = {
            let index = self.index.read();
            let mut scored: Vec<(f32, i64, u64)> = index
                .entries
                .iter()
                .map(|(id, e)| (cosine_similarity(&query, &e.embedding), e.timestamp, *id))
                .filter(|(score, _, _)| {
                    self.config.min_similarity.is_none_or(|floor| *score >= floor)
                })
                .collect();

            scored.sort_by(|a, b| {
                b.0.partial_cmp(&a.0)
                    .unwrap_or(Ordering::Equal)
                    .then(b.1.cmp(&a.1))
                    .then(a.2.cmp(&b.2))
            });
            scored.truncate(k);

            scored
                .into_iter()
                .filter_map(|(score, _, id)| {
                    index.entries.get(&id).map(|e| {
                        (
                            id,
                            score,
                            EvidenceSnippet {
                                text: e.text.clone(),
                                source: e.source.clone(),
                            },
                        )
                    })
                })
                .collect()
        };

        {
            let mut index = self.index.write();
            for (id, _, _) in &hits {
                index.touch(*id);
            }
        }

        debug!(
            hits = hits.len(),
            top_score = hits.first().map(|(_, s, _)| *s),
            "Knowledge cache query"
        );

        Ok(hits.into_iter().map(|(_, _, s)| s).collect())
    }

    #[instrument(skip(self, texts, metadata), fields(count = texts.len()))]
    async fn add(
        &self,
        texts: &[String],
        metadata: Option<&[SnippetMetadata]>,
    ) -> KnowledgeResult<()> {
        if let Some(metadata) = metadata
            && metadata.len() != texts.len()
        {
            return Err(KnowledgeError::MetadataMismatch {
                texts: texts.len(),
                metadata: metadata.len(),
            });
        }

        let pending: Vec<(String, SnippetMetadata)> = texts
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.trim().is_empty())
            .map(|(i, t)| {
                let meta = metadata
                    .and_then(|m| m.get(i).cloned())
                    .unwrap_or_default();
                (t.clone(), meta)
            })
            .collect();

        if pending.is_empty() {
            debug!("Nothing to add");
            return Ok(());
        }

        let inputs: Vec<String> = pending.iter().map(|(t, _)| t.clone()).collect();
        let embeddings = self.embedder.embed_batch(&inputs).await?;
        if embeddings.len() != inputs.len() {
            return Err(EmbeddingError::MalformedResponse {
                reason: format!(
                    "expected {} embeddings, got {}",
                    inputs.len(),
                    embeddings.len()
                ),
            }
            .into());
        }

        let dimension = self.embedder.dimension();
        let timestamp = now_millis();
        let mut records = Vec::with_capacity(pending.len());
        for ((text, meta), embedding) in pending.into_iter().zip(embeddings) {
            if embedding.len() != dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.len(),
                }
                .into());
            }
            records.push(SnippetRecord {
                id: snippet_id(&text),
                text,
                source: meta.source,
                query: meta.query,
                timestamp,
                embedding: f32_to_embedding_bytes(&embedding),
            });
        }

        let _guard = self.writer.lock().await;

        let dir = self.config.path.clone();
        let written = tokio::task::spawn_blocking(move || {
            ensure_dir(&dir)?;
            records
                .into_iter()
                .map(|record| write_record(&dir, &record).map(|bytes| (record, bytes)))
                .collect::<KnowledgeResult<Vec<_>>>()
        })
        .await??;

        {
            let mut index = self.index.write();
            for (record, bytes) in written {
                let embedding = embedding_bytes_to_f32(&record.embedding)?;
                index.insert(
                    record.id,
                    IndexedSnippet {
                        text: record.text,
                        source: record.source,
                        timestamp: record.timestamp,
                        embedding,
                        bytes,
                        last_used: 0,
                    },
                );
            }
        }

        self.expire_locked().await?;
        self.evict_locked().await?;

        debug!(entries = self.len(), "Added knowledge snippets");
        Ok(())
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn ensure_dir(path: &Path) -> KnowledgeResult<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(KnowledgeError::StorageUnavailable {
                path: path.to_path_buf(),
            });
        }
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|_| KnowledgeError::StorageUnavailable {
        path: path.to_path_buf(),
    })
}

/// Decodes every record under `dir`, oldest first. Unreadable files are skipped.
fn load_dir(dir: &Path, dimension: usize) -> KnowledgeResult<Vec<(u64, IndexedSnippet)>> {
    let mut loaded = Vec::new();

    for (id, path) in list_records(dir)? {
        match decode_entry(id, &path, dimension) {
            Ok(entry) => loaded.push((id, entry)),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable snippet"),
        }
    }

    loaded.sort_by_key(|(id, e)| (e.timestamp, *id));
    Ok(loaded)
}

fn decode_entry(id: u64, path: &Path, dimension: usize) -> KnowledgeResult<IndexedSnippet> {
    let record = read_record(path)?;

    if record.id != id {
        return Err(KnowledgeError::Serialization(format!(
            "record id {} does not match file name",
            record.id
        )));
    }

    let embedding = embedding_bytes_to_f32(&record.embedding)?;
    if embedding.len() != dimension {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dimension,
            actual: embedding.len(),
        }
        .into());
    }

    let bytes = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    Ok(IndexedSnippet {
        text: record.text,
        source: record.source,
        timestamp: record.timestamp,
        embedding,
        bytes,
        last_used: 0,
    })
}
