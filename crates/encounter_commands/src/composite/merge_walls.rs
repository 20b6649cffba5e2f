//! Merge several walls into one.

use async_trait::async_trait;
use encounter_model::{Entity, EntityIndex, Wall, WallData};

use super::{restore_slots, retire_slots, Slot};
use crate::command::{Command, CommandResult};
use crate::error::CommandError;
use crate::sync::Collaborators;

/// Fold a set of walls into a target wall.
///
/// The target keeps its index and receives the merged geometry; every other
/// source wall is removed. Undo recreates the removed walls, capturing their
/// new indices, and puts the target's original content back.
pub struct MergeWallsCommand {
    collab: Collaborators<Wall>,
    target_index: EntityIndex,
    target_original: WallData,
    merged: WallData,
    others: Vec<Slot<WallData>>,
    description: String,
}

impl MergeWallsCommand {
    pub fn new(
        collab: Collaborators<Wall>,
        target: Wall,
        merged: WallData,
        others: Vec<Wall>,
    ) -> CommandResult<Self> {
        if others.is_empty() {
            return Err(CommandError::Invalid(format!(
                "merging into wall {} needs at least one other wall",
                target.index
            )));
        }
        let description = format!(
            "Merge {} walls into \"{}\"",
            others.len() + 1,
            Wall::display_name(&merged)
        );
        Ok(Self {
            collab,
            target_index: target.index,
            target_original: target.data,
            merged,
            others: others
                .into_iter()
                .map(|wall| Slot::live(wall.index, wall.data))
                .collect(),
            description,
        })
    }

    pub fn target_index(&self) -> EntityIndex {
        self.target_index
    }

    /// Current indices of the non-target walls, None for those removed.
    pub fn other_indices(&self) -> Vec<Option<EntityIndex>> {
        self.others.iter().map(|slot| slot.index).collect()
    }

    async fn forward(&mut self) -> CommandResult {
        self.collab
            .update(self.target_index, self.merged.clone())
            .await?;
        retire_slots(&self.collab, self.others.as_mut_slice()).await?;
        log::info!("{} at {}", self.description, self.target_index);
        Ok(())
    }

    async fn inverse(&mut self) -> CommandResult {
        restore_slots(&self.collab, self.others.as_mut_slice()).await?;
        self.collab
            .update(self.target_index, self.target_original.clone())
            .await?;
        log::info!("Undid '{}'", self.description);
        Ok(())
    }
}

#[async_trait]
impl Command for MergeWallsCommand {
    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&mut self) -> CommandResult {
        let result = self.forward().await;
        self.collab.resync_after(&self.description, result).await
    }

    async fn undo(&mut self) -> CommandResult {
        let result = self.inverse().await;
        self.collab.resync_after(&self.description, result).await
    }
}
