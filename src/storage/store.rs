//! Typed document access
//!
//! [`DocumentBackend`] is the raw persistence boundary: JSON bodies keyed by
//! `(collection, id)`. [`Store`] layers typed, predicate-based queries on top
//! so services never touch serialization.

use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

/// A persisted document type
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (table) name
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    /// Refresh the modification timestamp before a save
    fn touch(&mut self);
}

/// Raw create/read/update/delete over JSON documents
#[async_trait]
pub trait DocumentBackend: Send + Sync + std::fmt::Debug {
    async fn insert(&self, collection: &str, id: Uuid, body: Value) -> Result<()>;

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>>;

    /// Replace an existing document; returns false when it does not exist
    async fn replace(&self, collection: &str, id: Uuid, body: Value) -> Result<bool>;

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool>;

    async fn list(&self, collection: &str) -> Result<Vec<Value>>;

    async fn health_check(&self) -> Result<()>;
}

/// Typed façade over a [`DocumentBackend`]
#[derive(Debug, Clone)]
pub struct Store {
    backend: Arc<dyn DocumentBackend>,
    /// Held while a uniqueness check and its insert run
    unique_keys: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl Store {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            unique_keys: Arc::new(DashMap::new()),
        }
    }

    /// Store backed by process memory
    pub fn memory() -> Self {
        Self::new(Arc::new(super::memory::MemoryBackend::new()))
    }

    pub fn backend(&self) -> &Arc<dyn DocumentBackend> {
        &self.backend
    }

    pub async fn get<T: Document>(&self, id: Uuid) -> Result<Option<T>> {
        match self.backend.get(T::COLLECTION, id).await? {
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
            None => Ok(None),
        }
    }

    /// Like [`Store::get`], but a missing document is a 404 with `message`
    pub async fn require<T: Document>(&self, id: Uuid, message: &str) -> Result<T> {
        self.get(id)
            .await?
            .ok_or_else(|| AppError::not_found(message))
    }

    /// Insert `doc` unless a document matching `clash` already exists.
    ///
    /// Inserts sharing `key` are serialized, so two writers racing on the
    /// same key cannot both pass the check. Returns false on a clash.
    pub async fn insert_unique<T, F>(&self, key: &str, doc: &T, clash: F) -> Result<bool>
    where
        T: Document,
        F: Fn(&T) -> bool,
    {
        let gate = self
            .unique_keys
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _held = gate.lock().await;
            match self.find_one(clash).await {
                Ok(Some(_)) => Ok(false),
                Ok(None) => self.insert(doc).await.map(|()| true),
                Err(e) => Err(e),
            }
        };

        drop(gate);
        self.unique_keys
            .remove_if(key, |_, gate| Arc::strong_count(gate) == 1);
        result
    }

    pub async fn insert<T: Document>(&self, doc: &T) -> Result<()> {
        let body = serde_json::to_value(doc)?;
        self.backend.insert(T::COLLECTION, doc.id(), body).await
    }

    /// Persist changes to an existing document, refreshing `updatedAt`
    pub async fn save<T: Document>(&self, doc: &mut T) -> Result<()> {
        doc.touch();
        let body = serde_json::to_value(&*doc)?;
        if !self.backend.replace(T::COLLECTION, doc.id(), body).await? {
            return Err(AppError::not_found(format!(
                "{} {} no longer exists",
                T::COLLECTION,
                doc.id()
            )));
        }
        Ok(())
    }

    pub async fn delete<T: Document>(&self, id: Uuid) -> Result<bool> {
        self.backend.delete(T::COLLECTION, id).await
    }

    /// Every document of a collection. Bodies that fail to decode are skipped.
    pub async fn all<T: Document>(&self) -> Result<Vec<T>> {
        let bodies = self.backend.list(T::COLLECTION).await?;
        let mut docs = Vec::with_capacity(bodies.len());
        for body in bodies {
            match serde_json::from_value::<T>(body) {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!(collection = T::COLLECTION, error = %e, "Skipping undecodable document"),
            }
        }
        Ok(docs)
    }

    pub async fn find<T, F>(&self, pred: F) -> Result<Vec<T>>
    where
        T: Document,
        F: Fn(&T) -> bool,
    {
        Ok(self.all::<T>().await?.into_iter().filter(|d| pred(d)).collect())
    }

    pub async fn find_one<T, F>(&self, pred: F) -> Result<Option<T>>
    where
        T: Document,
        F: Fn(&T) -> bool,
    {
        Ok(self.all::<T>().await?.into_iter().find(|d| pred(d)))
    }

    pub async fn count<T, F>(&self, pred: F) -> Result<usize>
    where
        T: Document,
        F: Fn(&T) -> bool,
    {
        Ok(self.all::<T>().await?.iter().filter(|d| pred(d)).count())
    }

    /// Resolve ids in order, dropping any that no longer exist
    pub async fn get_many<T: Document>(&self, ids: &[Uuid]) -> Result<Vec<T>> {
        let mut docs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(doc) = self.get::<T>(*id).await? {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    /// Delete every matching document; returns how many were removed
    pub async fn delete_where<T, F>(&self, pred: F) -> Result<usize>
    where
        T: Document,
        F: Fn(&T) -> bool,
    {
        let mut removed = 0;
        for doc in self.find::<T, _>(pred).await? {
            if self.delete::<T>(doc.id()).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Apply `mutate` to every matching document and save the ones it reports as changed
    pub async fn update_where<T, F, M>(&self, pred: F, mutate: M) -> Result<usize>
    where
        T: Document,
        F: Fn(&T) -> bool,
        M: Fn(&mut T) -> bool,
    {
        let mut updated = 0;
        for mut doc in self.find::<T, _>(pred).await? {
            if mutate(&mut doc) {
                self.save(&mut doc).await?;
                updated += 1;
            }
        }
        Ok(updated)
    }

    pub async fn health_check(&self) -> Result<()> {
        self.backend.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Note {
        #[serde(rename = "_id")]
        id: Uuid,
        text: String,
        pinned: bool,
        updated_at: DateTime<Utc>,
    }

    impl Document for Note {
        const COLLECTION: &'static str = "notes";

        fn id(&self) -> Uuid {
            self.id
        }

        fn touch(&mut self) {
            self.updated_at = Utc::now();
        }
    }

    fn note(text: &str, pinned: bool) -> Note {
        Note {
            id: Uuid::new_v4(),
            text: text.to_string(),
            pinned,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_unique_rejects_clash_and_releases_key() {
        let store = Store::memory();
        let a = note("same", false);
        let b = note("same", true);

        let (first, second) = tokio::join!(
            store.insert_unique("note:same", &a, |n: &Note| n.text == "same"),
            store.insert_unique("note:same", &b, |n: &Note| n.text == "same"),
        );
        assert_eq!(first.unwrap() as u8 + second.unwrap() as u8, 1);
        assert_eq!(store.all::<Note>().await.unwrap().len(), 1);
        assert!(store.unique_keys.is_empty());
    }

    #[tokio::test]
    async fn test_insert_get_save_delete() {
        let store = Store::memory();
        let mut n = note("hello", false);
        store.insert(&n).await.unwrap();

        let loaded: Note = store.require(n.id, "missing").await.unwrap();
        assert_eq!(loaded.text, "hello");

        n.text = "changed".to_string();
        store.save(&mut n).await.unwrap();
        let loaded: Note = store.require(n.id, "missing").await.unwrap();
        assert_eq!(loaded.text, "changed");

        assert!(store.delete::<Note>(n.id).await.unwrap());
        let err = store.require::<Note>(n.id, "Note not found").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Note not found"));
    }

    #[tokio::test]
    async fn test_save_missing_document_fails() {
        let store = Store::memory();
        let mut n = note("ghost", false);
        assert!(matches!(store.save(&mut n).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_predicate_queries() {
        let store = Store::memory();
        for (text, pinned) in [("a", true), ("b", false), ("c", true)] {
            store.insert(&note(text, pinned)).await.unwrap();
        }

        let pinned: Vec<Note> = store.find(|n: &Note| n.pinned).await.unwrap();
        assert_eq!(pinned.len(), 2);
        assert_eq!(store.count(|n: &Note| !n.pinned).await.unwrap(), 1);

        let updated = store
            .update_where(
                |n: &Note| n.pinned,
                |n: &mut Note| {
                    n.pinned = false;
                    true
                },
            )
            .await
            .unwrap();
        assert_eq!(updated, 2);

        let removed = store.delete_where(|n: &Note| !n.pinned).await.unwrap();
        assert_eq!(removed, 3);
        assert!(store.all::<Note>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_many_drops_dangling() {
        let store = Store::memory();
        let n = note("kept", false);
        store.insert(&n).await.unwrap();

        let docs: Vec<Note> = store.get_many(&[n.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, n.id);
    }
}
