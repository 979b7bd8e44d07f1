use std::collections::HashMap;
use std::sync::Arc;

use scribe_core::RecordKind;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RawDocument, Replaced};

struct Entry {
    doc: RawDocument,
    /// Insertion order, breaks ties between equal timestamps
    seq: u64,
}

#[derive(Default)]
struct Collections {
    docs: HashMap<(RecordKind, Uuid), Entry>,
    next_seq: u64,
}

/// Process-local store for development and tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, kind: RecordKind, doc: RawDocument) {
        let mut guard = self.inner.write().await;
        let seq = guard.next_seq;
        guard.next_seq += 1;
        guard.docs.insert((kind, doc.id), Entry { doc, seq });
    }

    pub async fn get(&self, kind: RecordKind, id: Uuid) -> Option<RawDocument> {
        let guard = self.inner.read().await;
        guard.docs.get(&(kind, id)).map(|e| e.doc.clone())
    }

    pub async fn list_by_owner(&self, kind: RecordKind, owner: &str) -> Vec<RawDocument> {
        let guard = self.inner.read().await;
        let mut entries: Vec<&Entry> = guard
            .docs
            .iter()
            .filter(|((k, _), e)| *k == kind && e.doc.owner_id == owner)
            .map(|(_, e)| e)
            .collect();
        entries.sort_by(|a, b| {
            b.doc
                .created_at
                .cmp(&a.doc.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        entries.into_iter().map(|e| e.doc.clone()).collect()
    }

    pub async fn replace(
        &self,
        kind: RecordKind,
        id: Uuid,
        expected: &JsonValue,
        data: JsonValue,
    ) -> Replaced {
        let mut guard = self.inner.write().await;
        match guard.docs.get_mut(&(kind, id)) {
            Some(entry) if entry.doc.data != *expected => Replaced::Stale,
            Some(entry) => {
                entry.doc.data = data;
                Replaced::Updated
            }
            None => Replaced::Missing,
        }
    }

    pub async fn delete(&self, kind: RecordKind, id: Uuid) -> bool {
        self.inner.write().await.docs.remove(&(kind, id)).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn doc(owner: &str, name: &str) -> RawDocument {
        RawDocument {
            id: Uuid::new_v4(),
            owner_id: owner.to_string(),
            created_at: Utc::now(),
            data: json!({"name": name}),
        }
    }

    #[tokio::test]
    async fn lists_newest_first_per_owner() {
        let store = MemoryStore::new();
        let first = doc("alice", "first");
        let second = doc("alice", "second");
        let other = doc("bob", "other");
        store.insert(RecordKind::TrackerPatient, first.clone()).await;
        store.insert(RecordKind::TrackerPatient, second.clone()).await;
        store.insert(RecordKind::TrackerPatient, other).await;

        let listed = store.list_by_owner(RecordKind::TrackerPatient, "alice").await;
        let ids: Vec<Uuid> = listed.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn collections_are_separate() {
        let store = MemoryStore::new();
        let note = doc("alice", "note");
        store.insert(RecordKind::Note, note.clone()).await;

        assert!(store.get(RecordKind::Patient, note.id).await.is_none());
        assert!(store.get(RecordKind::Note, note.id).await.is_some());
    }

    #[tokio::test]
    async fn replace_and_delete_report_missing() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert_eq!(
            store.replace(RecordKind::Note, id, &json!({}), json!({})).await,
            Replaced::Missing
        );
        assert!(!store.delete(RecordKind::Note, id).await);

        let row = doc("alice", "row");
        store.insert(RecordKind::Note, row.clone()).await;
        let edited = json!({"name": "edited"});
        assert_eq!(
            store.replace(RecordKind::Note, row.id, &row.data, edited).await,
            Replaced::Updated
        );
        let stored = store.get(RecordKind::Note, row.id).await.unwrap();
        assert_eq!(stored.data["name"], "edited");
        assert!(store.delete(RecordKind::Note, row.id).await);
    }

    #[tokio::test]
    async fn replace_from_stale_body_is_refused() {
        let store = MemoryStore::new();
        let row = doc("alice", "row");
        store.insert(RecordKind::Note, row.clone()).await;

        let first = json!({"name": "first"});
        let second = json!({"name": "second"});
        assert_eq!(
            store.replace(RecordKind::Note, row.id, &row.data, first).await,
            Replaced::Updated
        );
        assert_eq!(
            store.replace(RecordKind::Note, row.id, &row.data, second).await,
            Replaced::Stale
        );
        let stored = store.get(RecordKind::Note, row.id).await.unwrap();
        assert_eq!(stored.data["name"], "first");
    }
}
