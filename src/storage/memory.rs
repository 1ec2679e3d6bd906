//! In-process document backend

use super::store::DocumentBackend;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Documents held in a concurrent map, one inner map per collection
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: DashMap<String, HashMap<Uuid, Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn insert(&self, collection: &str, id: Uuid, body: Value) -> Result<()> {
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(AppError::conflict(format!(
                "Document {} already exists in {}",
                id, collection
            )));
        }
        docs.insert(id, body);
        Ok(())
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(&id).cloned()))
    }

    async fn replace(&self, collection: &str, id: Uuid, body: Value) -> Result<bool> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(false);
        };
        match docs.get_mut(&id) {
            Some(slot) => {
                *slot = body;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool> {
        Ok(self
            .collections
            .get_mut(collection)
            .is_some_and(|mut docs| docs.remove(&id).is_some()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
