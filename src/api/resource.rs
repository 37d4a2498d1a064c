//! Generic CRUD client for one backend collection.

use std::marker::PhantomData;

use futures::future::join_all;

use super::RequestClient;
use crate::errors::ClientError;
use crate::models::{Record, RecordId, Resource};

/// Typed access to `R::COLLECTION`.
pub struct ResourceClient<R> {
    client: RequestClient,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> ResourceClient<R> {
    pub fn new(client: RequestClient) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }

    pub fn client(&self) -> &RequestClient {
        &self.client
    }

    fn item_path(id: RecordId) -> String {
        format!("{}{}/", R::COLLECTION, id)
    }

    /// Fetch the whole collection.
    pub async fn list(&self) -> Result<Vec<R>, ClientError> {
        self.client.get(R::COLLECTION, &[]).await
    }

    /// Fetch the collection filtered by query parameters, e.g. `("university_id", "3")`.
    pub async fn list_where(&self, filter: &[(&str, String)]) -> Result<Vec<R>, ClientError> {
        self.client.get(R::COLLECTION, filter).await
    }

    pub async fn get(&self, id: RecordId) -> Result<R, ClientError> {
        self.client.get(&Self::item_path(id), &[]).await
    }

    pub async fn delete(&self, id: RecordId) -> Result<(), ClientError> {
        self.client.delete(&Self::item_path(id)).await?;
        tracing::info!("Deleted {}{}", R::COLLECTION, id);
        Ok(())
    }

    /// Delete several records concurrently and wait for every call to finish.
    pub async fn delete_many(&self, ids: &[RecordId]) -> BulkDeleteReport {
        let results = join_all(ids.iter().map(|&id| async move { (id, self.delete(id).await) })).await;

        let mut report = BulkDeleteReport::default();
        for (id, result) in results {
            match result {
                Ok(()) => report.deleted.push(id),
                Err(e) => report.failed.push((id, e)),
            }
        }
        report
    }
}

impl<R: Resource> ResourceClient<R> {
    pub async fn create(&self, draft: &R::Draft) -> Result<R, ClientError> {
        let created: R = self.client.post(R::COLLECTION, draft).await?;
        tracing::info!("Created {} {}", R::NAME, created.id());
        Ok(created)
    }

    pub async fn update(&self, id: RecordId, draft: &R::Draft) -> Result<R, ClientError> {
        let updated: R = self.client.put(&Self::item_path(id), draft).await?;
        tracing::info!("Updated {} {}", R::NAME, id);
        Ok(updated)
    }
}

/// Outcome of a bulk delete.
#[derive(Debug, Default)]
pub struct BulkDeleteReport {
    pub deleted: Vec<RecordId>,
    pub failed: Vec<(RecordId, ClientError)>,
}

impl BulkDeleteReport {
    /// The error to surface, if any call failed.
    ///
    /// When nothing was deleted and a failure needs a login, that failure is returned.
    /// Otherwise failures are summarised as `PartialDelete`, which still requires a login
    /// if any of them did.
    pub fn into_error(self) -> Option<ClientError> {
        if self.failed.is_empty() {
            return None;
        }

        let login_position = self.failed.iter().position(|(_, e)| e.requires_login());
        if let (true, Some(pos)) = (self.deleted.is_empty(), login_position) {
            let mut failed = self.failed;
            return Some(failed.swap_remove(pos).1);
        }

        Some(ClientError::PartialDelete {
            deleted: self.deleted,
            failed: self
                .failed
                .into_iter()
                .map(|(id, e)| (id, e.message()))
                .collect(),
            login_required: login_position.is_some(),
        })
    }
}
