use std::marker::PhantomData;

use chrono::Utc;
use scribe_core::{CoreError, Record};
use uuid::Uuid;

use super::{Document, RawDocument, Replaced, Store};
use crate::error::AppError;

/// Typed, owner-scoped access to one record collection
pub struct Repository<T> {
    store: Store,
    _record: PhantomData<T>,
}

impl<T: Record> Repository<T> {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Validate and store a new record owned by `owner`
    pub async fn create(&self, owner: &str, data: T) -> Result<Document<T>, AppError> {
        data.validate()?;
        let raw = RawDocument {
            id: Uuid::new_v4(),
            owner_id: owner.to_string(),
            created_at: Utc::now(),
            data: serde_json::to_value(&data)?,
        };
        self.store.insert(T::KIND, &raw).await?;

        Ok(Document {
            id: raw.id,
            owner_id: raw.owner_id,
            created_at: raw.created_at,
            data,
        })
    }

    /// Fetch a record, failing with 404 if missing and 403 if owned by someone else
    pub async fn get(&self, owner: &str, id: Uuid) -> Result<Document<T>, AppError> {
        decode(self.get_raw(owner, id).await?)
    }

    async fn get_raw(&self, owner: &str, id: Uuid) -> Result<RawDocument, AppError> {
        let raw = self
            .store
            .get(T::KIND, id)
            .await?
            .ok_or_else(|| T::KIND.not_found())?;
        if raw.owner_id != owner {
            return Err(CoreError::NotAuthorized.into());
        }
        Ok(raw)
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<Document<T>>, AppError> {
        self.store
            .list_by_owner(T::KIND, owner)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Apply `change` to an owned record, re-validate and store it.
    ///
    /// The write only lands if the stored body is still the one `change` saw;
    /// a concurrent update in between yields 409.
    pub async fn update<F>(&self, owner: &str, id: Uuid, change: F) -> Result<Document<T>, AppError>
    where
        F: FnOnce(&mut T) -> Result<(), CoreError>,
    {
        let raw = self.get_raw(owner, id).await?;
        let expected = raw.data.clone();
        let mut doc = decode::<T>(raw)?;
        change(&mut doc.data)?;
        doc.data.validate()?;

        let body = serde_json::to_value(&doc.data)?;
        match self.store.replace(T::KIND, id, &expected, &body).await? {
            Replaced::Updated => Ok(doc),
            Replaced::Missing => Err(T::KIND.not_found().into()),
            Replaced::Stale => {
                tracing::warn!(kind = ?T::KIND, %id, "Concurrent update rejected");
                Err(AppError::Conflict(format!(
                    "{} was modified concurrently",
                    T::KIND.label()
                )))
            }
        }
    }

    pub async fn delete(&self, owner: &str, id: Uuid) -> Result<(), AppError> {
        self.get(owner, id).await?;
        if !self.store.delete(T::KIND, id).await? {
            return Err(T::KIND.not_found().into());
        }
        Ok(())
    }
}

fn decode<T: Record>(raw: RawDocument) -> Result<Document<T>, AppError> {
    Ok(Document {
        id: raw.id,
        owner_id: raw.owner_id,
        created_at: raw.created_at,
        data: serde_json::from_value(raw.data)?,
    })
}
