use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::data::analysis_result::AnalysisResult;
use crate::core::data::chunk::ChunkKey;
use crate::core::data::coordinate_key::CoordinateKey;

pub type ResultSnapshot = HashMap<CoordinateKey, AnalysisResult>;

#[derive(Debug, Default)]
struct CacheState {
    points: HashMap<CoordinateKey, AnalysisResult>,
    completed_chunks: HashSet<ChunkKey>,
}

/// Point results for one viewport session, shared between the scheduler (sole writer
/// during a job) and readers taking snapshots. Cloning yields another handle to the
/// same storage. Entries are never evicted; the whole cache is cleared at once.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    state: Arc<RwLock<CacheState>>,
}

impl ResultCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &CoordinateKey) -> Option<AnalysisResult> {
        self.read().points.get(key).cloned()
    }

    pub fn put(&self, key: CoordinateKey, value: AnalysisResult) {
        self.write().points.insert(key, value);
    }

    /// Last writer wins per key.
    pub fn merge<I>(&self, pairs: I)
    where
        I: IntoIterator<Item = (CoordinateKey, AnalysisResult)>,
    {
        self.write().points.extend(pairs);
    }

    #[must_use]
    pub fn snapshot(&self) -> ResultSnapshot {
        self.read().points.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().points.is_empty()
    }

    #[must_use]
    pub fn contains_chunk(&self, key: &ChunkKey) -> bool {
        self.read().completed_chunks.contains(key)
    }

    /// Records that every point of the chunk identified by `key` has been merged.
    pub fn mark_chunk_complete(&self, key: ChunkKey) {
        self.write().completed_chunks.insert(key);
    }

    #[must_use]
    pub fn completed_chunk_count(&self) -> usize {
        self.read().completed_chunks.len()
    }

    pub fn clear(&self) {
        let mut state = self.write();
        state.points.clear();
        state.completed_chunks.clear();
    }

    // A panicking writer can only leave whole entries behind, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
