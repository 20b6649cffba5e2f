//! Fire-and-forget commands for drag placement.
//!
//! `execute` hands the store call to the tokio runtime and returns at once, so
//! the pointer never waits on the network. The in-flight task is kept as
//! command state and `undo` awaits it before inverting, which means an undo
//! issued before the creation settles still removes exactly the entity that
//! creation produced.

use async_trait::async_trait;
use encounter_model::{Entity, EntityIndex, LightSource, Region, SoundSource, Wall};
use tokio::task::JoinHandle;

use crate::command::{Command, CommandResult, ExecutionStyle};
use crate::error::CommandError;
use crate::sync::Collaborators;

async fn settle_task<T>(handle: JoinHandle<CommandResult<T>>) -> CommandResult<T> {
    handle
        .await
        .map_err(|err| CommandError::Placement(err.to_string()))?
}

/// Place an entity under the pointer.
pub struct PlaceCommand<E: Entity> {
    collab: Collaborators<E>,
    data: E::Data,
    description: String,
    pending: Option<JoinHandle<CommandResult<EntityIndex>>>,
    created: Option<EntityIndex>,
}

impl<E: Entity> PlaceCommand<E> {
    pub fn new(collab: Collaborators<E>, data: E::Data) -> Self {
        Self {
            collab,
            data,
            description: format!("Place {}", E::KIND.placement_noun()),
            pending: None,
            created: None,
        }
    }

    fn start(&mut self) {
        let collab = self.collab.clone();
        let data = self.data.clone();
        self.created = None;
        self.pending = Some(tokio::spawn(async move {
            let index = collab.create(data).await?;
            if let Err(err) = collab.refetch().await {
                log::warn!("Refetch after placing {} {} failed: {}", E::KIND, index, err);
            }
            Ok::<_, CommandError>(index)
        }));
    }

    /// Wait for an in-flight creation and return the index it produced.
    pub async fn settle(&mut self) -> CommandResult<Option<EntityIndex>> {
        if let Some(handle) = self.pending.take() {
            let index = settle_task(handle).await?;
            log::info!("{} settled at {}", self.description, index);
            self.created = Some(index);
        }
        Ok(self.created)
    }

    /// Index of the placed entity, once its creation has been settled.
    pub fn created_index(&self) -> Option<EntityIndex> {
        self.created
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[async_trait]
impl<E: Entity> Command for PlaceCommand<E> {
    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&mut self) -> CommandResult {
        self.start();
        Ok(())
    }

    async fn undo(&mut self) -> CommandResult {
        let index = self
            .settle()
            .await?
            .ok_or_else(|| CommandError::NotExecuted(self.description.clone()))?;
        self.collab.remove(index).await?;
        self.created = None;
        log::info!("Undid '{}': removed {}", self.description, index);
        self.collab.refetch().await
    }

    fn style(&self) -> ExecutionStyle {
        ExecutionStyle::FireAndForget
    }
}

/// Remove a placed entity without blocking the gesture that removed it.
pub struct RemovePlacedCommand<E: Entity> {
    collab: Collaborators<E>,
    index: EntityIndex,
    snapshot: E::Data,
    description: String,
    pending: Option<JoinHandle<CommandResult>>,
    restored: Option<EntityIndex>,
    // Set once a removal has settled successfully
    removed: bool,
}

impl<E: Entity> RemovePlacedCommand<E> {
    pub fn new(collab: Collaborators<E>, entity: E) -> Self {
        Self {
            collab,
            index: entity.index(),
            snapshot: entity.data().clone(),
            description: format!("Remove {}", E::KIND.placement_noun()),
            pending: None,
            restored: None,
            removed: false,
        }
    }

    fn start(&mut self, index: EntityIndex) {
        let collab = self.collab.clone();
        self.pending = Some(tokio::spawn(async move {
            collab.remove(index).await?;
            if let Err(err) = collab.refetch().await {
                log::warn!("Refetch after removing {} {} failed: {}", E::KIND, index, err);
            }
            Ok::<_, CommandError>(())
        }));
    }

    /// Wait for an in-flight removal.
    ///
    /// The entity counts as removed only once this succeeds; after a failed
    /// removal it is still live where it was.
    pub async fn settle(&mut self) -> CommandResult {
        let Some(handle) = self.pending.take() else {
            return Ok(());
        };
        settle_task(handle).await?;
        self.removed = true;
        self.restored = None;
        Ok(())
    }

    pub fn restored_index(&self) -> Option<EntityIndex> {
        self.restored
    }
}

#[async_trait]
impl<E: Entity> Command for RemovePlacedCommand<E> {
    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&mut self) -> CommandResult {
        self.start(self.index);
        Ok(())
    }

    async fn undo(&mut self) -> CommandResult {
        self.settle().await?;
        if !self.removed {
            log::warn!("'{}' removed nothing; leaving the entity in place", self.description);
            return self.collab.refetch().await;
        }
        let index = self.collab.create(self.snapshot.clone()).await?;
        self.restored = Some(index);
        self.removed = false;
        log::info!("Undid '{}': restored at {}", self.description, index);
        self.collab.refetch().await
    }

    async fn redo(&mut self) -> CommandResult {
        if self.removed {
            log::warn!("Nothing to redo for '{}'", self.description);
            return Ok(());
        }
        self.start(self.restored.unwrap_or(self.index));
        Ok(())
    }

    fn style(&self) -> ExecutionStyle {
        ExecutionStyle::FireAndForget
    }
}

pub type PlaceWallCommand = PlaceCommand<Wall>;
pub type PlaceRegionCommand = PlaceCommand<Region>;
pub type PlaceLightSourceCommand = PlaceCommand<LightSource>;
pub type PlaceSoundSourceCommand = PlaceCommand<SoundSource>;

pub type RemoveWallCommand = RemovePlacedCommand<Wall>;
pub type RemoveRegionCommand = RemovePlacedCommand<Region>;
pub type RemoveLightSourceCommand = RemovePlacedCommand<LightSource>;
pub type RemoveSoundSourceCommand = RemovePlacedCommand<SoundSource>;
