//! Collaborator bundle and the refetch-after-mutation discipline.
//!
//! Commands never touch a store directly. They hold a [`Collaborators`]
//! bound to one encounter and issue every create, update, remove and
//! refetch through it, so each call is traced the same way.

use std::sync::Arc;

use encounter_model::{EncounterId, Entity, EntityIndex};

use crate::command::CommandResult;
use crate::store::{EntityStore, Refetch};

/// Store access for commands on one entity kind in one encounter.
pub struct Collaborators<E: Entity> {
    encounter: EncounterId,
    store: Arc<dyn EntityStore<E>>,
    refetch: Arc<dyn Refetch>,
    refetch_on_failure: bool,
}

impl<E: Entity> Clone for Collaborators<E> {
    fn clone(&self) -> Self {
        Self {
            encounter: self.encounter.clone(),
            store: self.store.clone(),
            refetch: self.refetch.clone(),
            refetch_on_failure: self.refetch_on_failure,
        }
    }
}

impl<E: Entity> Collaborators<E> {
    pub fn new(
        encounter: EncounterId,
        store: Arc<dyn EntityStore<E>>,
        refetch: Arc<dyn Refetch>,
    ) -> Self {
        Self {
            encounter,
            store,
            refetch,
            refetch_on_failure: true,
        }
    }

    /// Bind to a store that also serves refetches, such as [`MemoryStore`](crate::MemoryStore).
    pub fn shared<S>(encounter: EncounterId, store: Arc<S>) -> Self
    where
        S: EntityStore<E> + Refetch + 'static,
    {
        Self::new(encounter, store.clone(), store)
    }

    /// Whether a failed composite sequence still triggers a refetch.
    pub fn with_refetch_on_failure(mut self, enabled: bool) -> Self {
        self.refetch_on_failure = enabled;
        self
    }

    pub fn encounter(&self) -> &EncounterId {
        &self.encounter
    }

    /// Create an entity and return the index the store assigned.
    pub async fn create(&self, data: E::Data) -> CommandResult<EntityIndex> {
        log::debug!(
            "Creating {} \"{}\" in {}",
            E::KIND,
            E::display_name(&data),
            self.encounter
        );
        let entity = self.store.create(&self.encounter, data).await?;
        log::debug!("Store assigned {} to new {}", entity.index(), E::KIND);
        Ok(entity.index())
    }

    pub async fn update(&self, index: EntityIndex, data: E::Data) -> CommandResult {
        log::debug!(
            "Updating {} {} to \"{}\" in {}",
            E::KIND,
            index,
            E::display_name(&data),
            self.encounter
        );
        self.store.update(&self.encounter, index, data).await?;
        Ok(())
    }

    pub async fn remove(&self, index: EntityIndex) -> CommandResult {
        log::debug!("Removing {} {} in {}", E::KIND, index, self.encounter);
        self.store.remove(&self.encounter, index).await?;
        Ok(())
    }

    pub async fn refetch(&self) -> CommandResult {
        log::debug!("Refetching {}", self.encounter);
        self.refetch.refetch().await?;
        Ok(())
    }

    /// Finish a multi-step sequence.
    ///
    /// On success, refetch once. On failure, log it, refetch on a best-effort
    /// basis so whatever did change becomes visible, and return the original
    /// error. Steps that already reached the store are not rolled back.
    pub async fn resync_after(&self, description: &str, result: CommandResult) -> CommandResult {
        match result {
            Ok(()) => self.refetch().await,
            Err(err) => {
                log::error!("'{}' failed part way: {}", description, err);
                if self.refetch_on_failure {
                    if let Err(refetch_err) = self.refetch().await {
                        log::warn!("Refetch after '{}' failed: {}", description, refetch_err);
                    }
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encounter_model::{Wall, WallData};

    use crate::error::{CommandError, StoreError};
    use crate::store::memory::{MemoryStore, StoreCall, StoreOp};

    fn collab(store: &Arc<MemoryStore>) -> Collaborators<Wall> {
        Collaborators::shared(EncounterId::new("encounter-1"), store.clone())
    }

    #[tokio::test]
    async fn test_create_returns_assigned_index() {
        let store = Arc::new(MemoryStore::starting_at(4));
        let index = collab(&store).create(WallData::default()).await.unwrap();
        assert_eq!(index, EntityIndex(4));
    }

    #[tokio::test]
    async fn test_resync_success_refetches_once() {
        let store = Arc::new(MemoryStore::new());
        collab(&store).resync_after("Test", Ok(())).await.unwrap();
        assert_eq!(store.calls(), vec![StoreCall::Refetch]);
    }

    #[tokio::test]
    async fn test_resync_failure_refetches_and_reraises() {
        let store = Arc::new(MemoryStore::new());
        let original: CommandError = StoreError::Network("timeout".into()).into();
        let result = collab(&store).resync_after("Test", Err(original.clone())).await;
        assert_eq!(result, Err(original));
        assert_eq!(store.refetch_count(), 1);
    }

    #[tokio::test]
    async fn test_resync_failure_keeps_original_error_when_refetch_fails() {
        let store = Arc::new(MemoryStore::new());
        store.fail_on(StoreOp::Refetch, StoreError::Unavailable);
        let original: CommandError = StoreError::Rejected("locked".into()).into();
        let result = collab(&store).resync_after("Test", Err(original.clone())).await;
        assert_eq!(result, Err(original));
    }

    #[tokio::test]
    async fn test_resync_failure_without_refetch() {
        let store = Arc::new(MemoryStore::new());
        let collab = collab(&store).with_refetch_on_failure(false);
        let result = collab
            .resync_after("Test", Err(CommandError::Invalid("x".into())))
            .await;
        assert!(result.is_err());
        assert_eq!(store.refetch_count(), 0);
    }
}
