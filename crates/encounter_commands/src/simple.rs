//! Create, delete and edit commands for every entity kind.
//!
//! All three are awaited commands that refetch after each mutating step.

use async_trait::async_trait;
use encounter_model::{
    Entity, EntityIndex, LightSource, Region, RegionData, SoundSource, Wall,
};

use crate::command::{Command, CommandResult};
use crate::error::CommandError;
use crate::sync::Collaborators;

/// Create an entity from its authoring data.
pub struct CreateCommand<E: Entity> {
    collab: Collaborators<E>,
    data: E::Data,
    description: String,
    // Index from the latest creation; None while nothing is live
    created: Option<EntityIndex>,
}

impl<E: Entity> CreateCommand<E> {
    pub fn new(collab: Collaborators<E>, data: E::Data) -> Self {
        let description = format!("Create {} \"{}\"", E::KIND.noun(), E::display_name(&data));
        Self {
            collab,
            data,
            description,
            created: None,
        }
    }

    pub(crate) fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn data(&self) -> &E::Data {
        &self.data
    }

    /// Index the store assigned on the most recent execute or redo.
    pub fn created_index(&self) -> Option<EntityIndex> {
        self.created
    }
}

impl CreateCommand<Region> {
    /// Create a region, rejecting one without vertices.
    pub fn validated(collab: Collaborators<Region>, data: RegionData) -> CommandResult<Self> {
        data.validate()
            .map_err(|err| CommandError::Invalid(err.to_string()))?;
        Ok(Self::new(collab, data))
    }
}

#[async_trait]
impl<E: Entity> Command for CreateCommand<E> {
    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&mut self) -> CommandResult {
        let index = self.collab.create(self.data.clone()).await?;
        self.created = Some(index);
        log::info!("{} at {}", self.description, index);
        self.collab.refetch().await
    }

    async fn undo(&mut self) -> CommandResult {
        let index = self
            .created
            .ok_or_else(|| CommandError::NotExecuted(self.description.clone()))?;
        self.collab.remove(index).await?;
        self.created = None;
        log::info!("Undid '{}': removed {}", self.description, index);
        self.collab.refetch().await
    }
}

/// Delete an entity, keeping a snapshot to recreate it on undo.
pub struct DeleteCommand<E: Entity> {
    collab: Collaborators<E>,
    index: EntityIndex,
    snapshot: E::Data,
    description: String,
    // Index the store assigned when undo recreated the entity
    restored: Option<EntityIndex>,
}

impl<E: Entity> DeleteCommand<E> {
    /// Delete `entity`; its current data is the snapshot replayed on undo.
    pub fn new(collab: Collaborators<E>, entity: E) -> Self {
        let index = entity.index();
        let snapshot = entity.data().clone();
        let description = format!(
            "Delete {} \"{}\"",
            E::KIND.noun(),
            E::display_name(&snapshot)
        );
        Self {
            collab,
            index,
            snapshot,
            description,
            restored: None,
        }
    }

    pub(crate) fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn snapshot(&self) -> &E::Data {
        &self.snapshot
    }

    /// Index of the entity recreated by the latest undo, if it is still live.
    pub fn restored_index(&self) -> Option<EntityIndex> {
        self.restored
    }
}

#[async_trait]
impl<E: Entity> Command for DeleteCommand<E> {
    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&mut self) -> CommandResult {
        self.collab.remove(self.index).await?;
        log::info!("{} at {}", self.description, self.index);
        self.collab.refetch().await
    }

    async fn undo(&mut self) -> CommandResult {
        let index = self.collab.create(self.snapshot.clone()).await?;
        self.restored = Some(index);
        log::info!("Undid '{}': restored at {}", self.description, index);
        self.collab.refetch().await
    }

    async fn redo(&mut self) -> CommandResult {
        // The original slot is gone; only the recreated entity can be removed.
        let Some(index) = self.restored else {
            log::warn!("Nothing to redo for '{}'", self.description);
            return Ok(());
        };
        self.collab.remove(index).await?;
        self.restored = None;
        log::info!("Redid '{}': removed {}", self.description, index);
        self.collab.refetch().await
    }
}

/// Replace an entity's authoring data in place.
pub struct EditCommand<E: Entity> {
    collab: Collaborators<E>,
    index: EntityIndex,
    old: E::Data,
    new: E::Data,
    description: String,
}

impl<E: Entity> EditCommand<E> {
    pub fn new(collab: Collaborators<E>, index: EntityIndex, old: E::Data, new: E::Data) -> Self {
        let description = format!(
            "{} {} \"{}\"",
            E::KIND.edit_verb(),
            E::KIND.noun(),
            E::display_name(&new)
        );
        Self {
            collab,
            index,
            old,
            new,
            description,
        }
    }

    pub fn index(&self) -> EntityIndex {
        self.index
    }
}

#[async_trait]
impl<E: Entity> Command for EditCommand<E> {
    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&mut self) -> CommandResult {
        self.collab.update(self.index, self.new.clone()).await?;
        log::info!("{} at {}", self.description, self.index);
        self.collab.refetch().await
    }

    async fn undo(&mut self) -> CommandResult {
        self.collab.update(self.index, self.old.clone()).await?;
        log::info!("Undid '{}' at {}", self.description, self.index);
        self.collab.refetch().await
    }
}

pub type CreateWallCommand = CreateCommand<Wall>;
pub type CreateRegionCommand = CreateCommand<Region>;
pub type CreateLightSourceCommand = CreateCommand<LightSource>;
pub type CreateSoundSourceCommand = CreateCommand<SoundSource>;

pub type DeleteWallCommand = DeleteCommand<Wall>;
pub type DeleteRegionCommand = DeleteCommand<Region>;
pub type DeleteLightSourceCommand = DeleteCommand<LightSource>;
pub type DeleteSoundSourceCommand = DeleteCommand<SoundSource>;

pub type EditWallCommand = EditCommand<Wall>;
pub type EditRegionCommand = EditCommand<Region>;
pub type UpdateLightSourceCommand = EditCommand<LightSource>;
pub type UpdateSoundSourceCommand = EditCommand<SoundSource>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use encounter_model::{
        EncounterId, LightSourceData, LightSourceType, MediaRef, Point, Pole, RegionType, Segment,
        SoundSourceData, WallData,
    };

    use crate::error::StoreError;
    use crate::store::memory::{MemoryStore, StoreCall, StoreOp};
    use encounter_model::EntityKind;

    fn encounter() -> EncounterId {
        EncounterId::new("encounter-1")
    }

    fn collab<E>(store: &Arc<MemoryStore>) -> Collaborators<E>
    where
        E: Entity,
        MemoryStore: crate::store::EntityStore<E>,
    {
        Collaborators::shared(encounter(), store.clone())
    }

    fn north_wall() -> WallData {
        WallData::new(
            "North Wall",
            vec![
                Segment::wall(0, Pole::new(0.0, 0.0, 1.0), Pole::new(5.0, 0.0, 1.0)),
                Segment::wall(1, Pole::new(5.0, 0.0, 1.0), Pole::new(10.0, 0.0, 1.0)),
            ],
        )
    }

    #[tokio::test]
    async fn test_create_undo_redo_tracks_latest_index() {
        let store = Arc::new(MemoryStore::starting_at(5));
        let mut cmd = CreateRegionCommand::new(
            collab(&store),
            RegionData::new("Cellar", RegionType::Zone, vec![Point::new(0.0, 0.0)]).with_value(1),
        );
        assert_eq!(cmd.description(), "Create region \"Cellar\"");

        cmd.execute().await.unwrap();
        assert_eq!(cmd.created_index(), Some(EntityIndex(5)));

        cmd.undo().await.unwrap();
        assert_eq!(store.count::<Region>(&encounter()), 0);
        assert_eq!(cmd.created_index(), None);

        cmd.redo().await.unwrap();
        assert_eq!(cmd.created_index(), Some(EntityIndex(6)));
        let region: Region = store.get(&encounter(), EntityIndex(6)).unwrap();
        assert_eq!(&region.data, cmd.data());
    }

    #[tokio::test]
    async fn test_create_undo_before_execute() {
        let store = Arc::new(MemoryStore::new());
        let mut cmd = CreateWallCommand::new(collab(&store), north_wall());
        let err = cmd.undo().await.unwrap_err();
        assert!(matches!(err, CommandError::NotExecuted(_)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_refetches_after_each_step() {
        let store = Arc::new(MemoryStore::new());
        let mut cmd = CreateWallCommand::new(collab(&store), north_wall());
        cmd.execute().await.unwrap();
        cmd.undo().await.unwrap();
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Create {
                    kind: EntityKind::Wall,
                    index: EntityIndex(0),
                    name: "North Wall".to_string(),
                },
                StoreCall::Refetch,
                StoreCall::Remove {
                    kind: EntityKind::Wall,
                    index: EntityIndex(0),
                },
                StoreCall::Refetch,
            ]
        );
    }

    #[tokio::test]
    async fn test_create_failure_propagates_unchanged() {
        let store = Arc::new(MemoryStore::new());
        store.fail_on(
            StoreOp::Create(EntityKind::Wall),
            StoreError::Network("offline".into()),
        );
        let mut cmd = CreateWallCommand::new(collab(&store), north_wall());
        let err = cmd.execute().await.unwrap_err();
        assert_eq!(err, CommandError::Store(StoreError::Network("offline".into())));
        assert_eq!(cmd.created_index(), None);
        assert_eq!(store.refetch_count(), 0);
    }

    #[test]
    fn test_validated_region_rejects_empty_vertices() {
        let store = Arc::new(MemoryStore::new());
        let result = CreateRegionCommand::validated(
            collab(&store),
            RegionData::new("Void", RegionType::Zone, Vec::new()),
        );
        assert!(matches!(result, Err(CommandError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_delete_redo_uses_restored_index() {
        let store = Arc::new(MemoryStore::starting_at(10));
        store.insert(&encounter(), Wall::from_parts(EntityIndex(3), north_wall()));

        let wall: Wall = store.get(&encounter(), EntityIndex(3)).unwrap();
        let mut cmd = DeleteWallCommand::new(collab(&store), wall);
        assert_eq!(cmd.description(), "Delete wall \"North Wall\"");

        cmd.execute().await.unwrap();
        assert!(store.get::<Wall>(&encounter(), EntityIndex(3)).is_none());

        cmd.undo().await.unwrap();
        assert_eq!(cmd.restored_index(), Some(EntityIndex(10)));
        let restored: Wall = store.get(&encounter(), EntityIndex(10)).unwrap();
        assert_eq!(restored.data, north_wall());

        store.clear_calls();
        cmd.redo().await.unwrap();
        assert_eq!(
            store.calls()[0],
            StoreCall::Remove {
                kind: EntityKind::Wall,
                index: EntityIndex(10),
            }
        );
        assert_eq!(store.count::<Wall>(&encounter()), 0);
    }

    #[tokio::test]
    async fn test_delete_redo_without_undo_is_noop() {
        let store = Arc::new(MemoryStore::new());
        store.insert(&encounter(), Wall::from_parts(EntityIndex(0), north_wall()));
        let wall: Wall = store.get(&encounter(), EntityIndex(0)).unwrap();

        let mut cmd = DeleteWallCommand::new(collab(&store), wall);
        cmd.execute().await.unwrap();
        store.clear_calls();

        cmd.redo().await.unwrap();
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_edit_keeps_index() {
        let store = Arc::new(MemoryStore::new());
        let old = LightSourceData::new(LightSourceType::Natural, Point::new(1.0, 1.0), 30.0)
            .with_name("Old");
        let new = old.clone().with_name("New").switched(false);
        store.insert(&encounter(), LightSource::from_parts(EntityIndex(2), old.clone()));

        let mut cmd = UpdateLightSourceCommand::new(collab(&store), EntityIndex(2), old.clone(), new.clone());
        assert_eq!(cmd.description(), "Update light source \"New\"");

        cmd.execute().await.unwrap();
        assert_eq!(store.get::<LightSource>(&encounter(), EntityIndex(2)).unwrap().data, new);

        cmd.undo().await.unwrap();
        assert_eq!(store.get::<LightSource>(&encounter(), EntityIndex(2)).unwrap().data, old);

        cmd.redo().await.unwrap();
        assert_eq!(store.get::<LightSource>(&encounter(), EntityIndex(2)).unwrap().data, new);
        assert_eq!(store.count::<LightSource>(&encounter()), 1);
    }

    #[test]
    fn test_edit_wall_description() {
        let store = Arc::new(MemoryStore::new());
        let cmd = EditWallCommand::new(
            collab(&store),
            EntityIndex(0),
            north_wall(),
            WallData::new("New", Vec::new()),
        );
        assert_eq!(cmd.description(), "Edit wall \"New\"");
    }

    fn fountain() -> SoundSourceData {
        let media = MediaRef {
            id: "media-7".to_string(),
            content_type: "audio/ogg".to_string(),
            path: "sounds/fountain.ogg".to_string(),
            duration: "00:01:30".to_string(),
        };
        SoundSourceData::new(Point::new(3.0, 4.0), 12.0, media).with_name("Fountain")
    }

    #[tokio::test]
    async fn test_sound_source_round_trip() {
        let store = Arc::new(MemoryStore::starting_at(40));

        let mut create = CreateSoundSourceCommand::new(collab(&store), fountain());
        assert_eq!(create.description(), "Create sound source \"Fountain\"");
        create.execute().await.unwrap();
        assert_eq!(create.created_index(), Some(EntityIndex(40)));
        create.undo().await.unwrap();
        assert_eq!(store.count::<SoundSource>(&encounter()), 0);
        create.redo().await.unwrap();
        assert_eq!(create.created_index(), Some(EntityIndex(41)));

        let sound: SoundSource = store.get(&encounter(), EntityIndex(41)).unwrap();
        let mut delete = DeleteSoundSourceCommand::new(collab(&store), sound);
        delete.execute().await.unwrap();
        assert_eq!(store.count::<SoundSource>(&encounter()), 0);
        delete.undo().await.unwrap();
        assert_eq!(delete.restored_index(), Some(EntityIndex(42)));
        assert_eq!(
            store.get::<SoundSource>(&encounter(), EntityIndex(42)).unwrap().data,
            fountain()
        );

        let louder = fountain().with_volume(0.5).playing(true, true);
        let mut update = UpdateSoundSourceCommand::new(
            collab(&store),
            EntityIndex(42),
            fountain(),
            louder.clone(),
        );
        assert_eq!(update.description(), "Update sound source \"Fountain\"");
        update.execute().await.unwrap();
        assert_eq!(
            store.get::<SoundSource>(&encounter(), EntityIndex(42)).unwrap().data,
            louder
        );
        update.undo().await.unwrap();
        assert_eq!(
            store.get::<SoundSource>(&encounter(), EntityIndex(42)).unwrap().data,
            fountain()
        );
        assert_eq!(store.count::<SoundSource>(&encounter()), 1);
    }
}
