//! Document store
//!
//! Every record lives in a per-kind collection as a JSON body wrapped in an
//! envelope carrying the id, the owning user and the creation time.

mod memory;
mod postgres;
mod repository;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::Repository;

use chrono::{DateTime, Utc};
use scribe_core::RecordKind;
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::AppError;

/// A stored record body with its envelope fields
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document<T> {
    pub id: Uuid,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: T,
}

/// Untyped document as the backends see it
pub type RawDocument = Document<JsonValue>;

/// Outcome of a compare-and-swap replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replaced {
    Updated,
    Missing,
    /// The stored body no longer matches the one the change was based on
    Stale,
}

/// Storage backend selected at startup
#[derive(Clone)]
pub enum Store {
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl Store {
    /// Connect to Postgres when a URL is given, otherwise use process memory
    pub async fn connect(database_url: Option<&str>) -> Result<Self, AppError> {
        match database_url {
            Some(url) => {
                let store = PgStore::connect(url)?;
                store.migrate().await?;
                Ok(Store::Postgres(store))
            }
            None => Ok(Store::Memory(MemoryStore::new())),
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Store::Postgres(_) => "postgres",
            Store::Memory(_) => "memory",
        }
    }

    pub async fn insert(&self, kind: RecordKind, doc: &RawDocument) -> Result<(), AppError> {
        match self {
            Store::Postgres(pg) => pg.insert(kind, doc).await,
            Store::Memory(mem) => {
                mem.insert(kind, doc.clone()).await;
                Ok(())
            }
        }
    }

    pub async fn get(&self, kind: RecordKind, id: Uuid) -> Result<Option<RawDocument>, AppError> {
        match self {
            Store::Postgres(pg) => pg.get(kind, id).await,
            Store::Memory(mem) => Ok(mem.get(kind, id).await),
        }
    }

    /// Documents owned by `owner`, newest first
    pub async fn list_by_owner(
        &self,
        kind: RecordKind,
        owner: &str,
    ) -> Result<Vec<RawDocument>, AppError> {
        match self {
            Store::Postgres(pg) => pg.list_by_owner(kind, owner).await,
            Store::Memory(mem) => Ok(mem.list_by_owner(kind, owner).await),
        }
    }

    /// Replace the body of a document only if it still equals `expected`
    pub async fn replace(
        &self,
        kind: RecordKind,
        id: Uuid,
        expected: &JsonValue,
        data: &JsonValue,
    ) -> Result<Replaced, AppError> {
        match self {
            Store::Postgres(pg) => pg.replace(kind, id, expected, data).await,
            Store::Memory(mem) => Ok(mem.replace(kind, id, expected, data.clone()).await),
        }
    }

    pub async fn delete(&self, kind: RecordKind, id: Uuid) -> Result<bool, AppError> {
        match self {
            Store::Postgres(pg) => pg.delete(kind, id).await,
            Store::Memory(mem) => Ok(mem.delete(kind, id).await),
        }
    }

    /// Round-trip to the backend for health checks
    pub async fn ping(&self) -> Result<(), AppError> {
        match self {
            Store::Postgres(pg) => pg.ping().await,
            Store::Memory(_) => Ok(()),
        }
    }
}
