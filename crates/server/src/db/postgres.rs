use deadpool_postgres::{Config, Pool, Runtime};
use scribe_core::RecordKind;
use serde_json::Value as JsonValue;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

use super::{RawDocument, Replaced};
use crate::error::AppError;

/// JSONB-backed store, one table per record kind
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Create a connection pool from a database URL
    pub fn connect(database_url: &str) -> Result<Self, AppError> {
        let mut cfg = Config::new();
        cfg.url = Some(database_url.to_string());
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| AppError::Internal(format!("Failed to create database pool: {}", e)))?;
        Ok(Self { pool })
    }

    /// Create every collection table and its owner index if missing
    pub async fn migrate(&self) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        for kind in RecordKind::ALL {
            let table = kind.collection();
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id UUID PRIMARY KEY,
                    owner_id TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL,
                    data JSONB NOT NULL
                );
                CREATE INDEX IF NOT EXISTS {table}_owner_created_idx
                    ON {table} (owner_id, created_at DESC);"
            );
            client.batch_execute(&ddl).await?;
            tracing::debug!(table, "Collection ready");
        }
        Ok(())
    }

    pub async fn insert(&self, kind: RecordKind, doc: &RawDocument) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO {} (id, owner_id, created_at, data) VALUES ($1, $2, $3, $4)",
            kind.collection()
        );
        client
            .execute(&sql, &[&doc.id, &doc.owner_id, &doc.created_at, &doc.data])
            .await?;
        Ok(())
    }

    pub async fn get(&self, kind: RecordKind, id: Uuid) -> Result<Option<RawDocument>, AppError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT id, owner_id, created_at, data FROM {} WHERE id = $1",
            kind.collection()
        );
        let row = client.query_opt(&sql, &[&id]).await?;
        Ok(row.map(document))
    }

    pub async fn list_by_owner(
        &self,
        kind: RecordKind,
        owner: &str,
    ) -> Result<Vec<RawDocument>, AppError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT id, owner_id, created_at, data FROM {} \
             WHERE owner_id = $1 ORDER BY created_at DESC",
            kind.collection()
        );
        let rows = client.query(&sql, &[&owner]).await?;
        Ok(rows.into_iter().map(document).collect())
    }

    pub async fn replace(
        &self,
        kind: RecordKind,
        id: Uuid,
        expected: &JsonValue,
        data: &JsonValue,
    ) -> Result<Replaced, AppError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE {} SET data = $2 WHERE id = $1 AND data = $3",
            kind.collection()
        );
        if client.execute(&sql, &[&id, data, expected]).await? > 0 {
            return Ok(Replaced::Updated);
        }

        let sql = format!("SELECT 1 FROM {} WHERE id = $1", kind.collection());
        Ok(match client.query_opt(&sql, &[&id]).await? {
            Some(_) => Replaced::Stale,
            None => Replaced::Missing,
        })
    }

    pub async fn delete(&self, kind: RecordKind, id: Uuid) -> Result<bool, AppError> {
        let client = self.pool.get().await?;
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.collection());
        Ok(client.execute(&sql, &[&id]).await? > 0)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }
}

fn document(row: Row) -> RawDocument {
    RawDocument {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        data: row.get("data"),
    }
}
