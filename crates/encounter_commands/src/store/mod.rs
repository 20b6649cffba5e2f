//! Store collaborators.
//!
//! The remote store is reached only through these traits. Commands make no
//! assumption about an implementation beyond "eventually settles or fails";
//! timeouts and retries belong to whoever implements them.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use encounter_model::{EncounterId, Entity, EntityIndex};
use futures_util::future::BoxFuture;

use crate::error::StoreResult;

/// Create, update and remove entities of one kind in the remote store.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Create an entity; the store picks its index.
    async fn create(&self, encounter: &EncounterId, data: E::Data) -> StoreResult<E>;

    /// Replace the authoring data at `index`. The index does not change.
    async fn update(
        &self,
        encounter: &EncounterId,
        index: EntityIndex,
        data: E::Data,
    ) -> StoreResult<()>;

    /// Remove the entity at `index`, retiring the index.
    async fn remove(&self, encounter: &EncounterId, index: EntityIndex) -> StoreResult<()>;
}

/// Pull the store's canonical state back into whatever displays it.
#[async_trait]
pub trait Refetch: Send + Sync {
    async fn refetch(&self) -> StoreResult<()>;
}

type CreateFn<E> =
    Arc<dyn Fn(EncounterId, <E as Entity>::Data) -> BoxFuture<'static, StoreResult<E>> + Send + Sync>;
type UpdateFn<E> = Arc<
    dyn Fn(EncounterId, EntityIndex, <E as Entity>::Data) -> BoxFuture<'static, StoreResult<()>>
        + Send
        + Sync,
>;
type RemoveFn =
    Arc<dyn Fn(EncounterId, EntityIndex) -> BoxFuture<'static, StoreResult<()>> + Send + Sync>;

/// An [`EntityStore`] assembled from three async functions.
///
/// ```ignore
/// let walls = StoreFns::<Wall>::new(
///     move |encounter, data| client.create_wall(encounter, data).boxed(),
///     move |encounter, index, data| client.update_wall(encounter, index, data).boxed(),
///     move |encounter, index| client.remove_wall(encounter, index).boxed(),
/// );
/// ```
pub struct StoreFns<E: Entity> {
    create: CreateFn<E>,
    update: UpdateFn<E>,
    remove: RemoveFn,
}

impl<E: Entity> StoreFns<E> {
    pub fn new<C, U, R>(create: C, update: U, remove: R) -> Self
    where
        C: Fn(EncounterId, E::Data) -> BoxFuture<'static, StoreResult<E>> + Send + Sync + 'static,
        U: Fn(EncounterId, EntityIndex, E::Data) -> BoxFuture<'static, StoreResult<()>>
            + Send
            + Sync
            + 'static,
        R: Fn(EncounterId, EntityIndex) -> BoxFuture<'static, StoreResult<()>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            create: Arc::new(create),
            update: Arc::new(update),
            remove: Arc::new(remove),
        }
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for StoreFns<E> {
    async fn create(&self, encounter: &EncounterId, data: E::Data) -> StoreResult<E> {
        (self.create)(encounter.clone(), data).await
    }

    async fn update(
        &self,
        encounter: &EncounterId,
        index: EntityIndex,
        data: E::Data,
    ) -> StoreResult<()> {
        (self.update)(encounter.clone(), index, data).await
    }

    async fn remove(&self, encounter: &EncounterId, index: EntityIndex) -> StoreResult<()> {
        (self.remove)(encounter.clone(), index).await
    }
}

/// A [`Refetch`] backed by an async function.
pub struct RefetchFn(Arc<dyn Fn() -> BoxFuture<'static, StoreResult<()>> + Send + Sync>);

impl RefetchFn {
    pub fn new<F>(refetch: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, StoreResult<()>> + Send + Sync + 'static,
    {
        Self(Arc::new(refetch))
    }

    /// A refetch that does nothing, for callers that pull state elsewhere.
    pub fn noop() -> Self {
        Self::new(|| Box::pin(async { Ok(()) }))
    }
}

#[async_trait]
impl Refetch for RefetchFn {
    async fn refetch(&self) -> StoreResult<()> {
        (self.0)().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use encounter_model::{Wall, WallData};
    use futures_util::FutureExt;

    use crate::error::StoreError;

    #[tokio::test]
    async fn test_store_fns_forward_calls() {
        let next = Arc::new(AtomicU32::new(7));
        let counter = next.clone();
        let store = StoreFns::<Wall>::new(
            move |_, data| {
                let index = counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(Wall::from_parts(EntityIndex(index), data)) }.boxed()
            },
            |_, _, _| async { Ok(()) }.boxed(),
            |_, index| async move { Err(StoreError::Rejected(format!("locked {}", index))) }.boxed(),
        );

        let encounter = EncounterId::new("encounter-1");
        let wall = store.create(&encounter, WallData::default()).await.unwrap();
        assert_eq!(wall.index, EntityIndex(7));
        assert!(store.update(&encounter, EntityIndex(7), WallData::default()).await.is_ok());
        assert_eq!(
            store.remove(&encounter, EntityIndex(7)).await,
            Err(StoreError::Rejected("locked #7".to_string()))
        );
    }

    #[tokio::test]
    async fn test_refetch_fn() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let refetch = RefetchFn::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }.boxed()
        });
        refetch.refetch().await.unwrap();
        RefetchFn::noop().refetch().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
