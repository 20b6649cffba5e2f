//! Break one wall into several walls.

use async_trait::async_trait;
use encounter_model::{Entity, EntityIndex, Wall, WallData};

use super::remove_all;
use crate::command::{Command, CommandResult};
use crate::error::CommandError;
use crate::sync::Collaborators;

/// Replace a wall by one wall per supplied segment definition.
///
/// The original index is never recreated. Undo puts the original content back
/// at that index with an update, after removing the walls the latest forward
/// pass created.
pub struct BreakWallCommand {
    collab: Collaborators<Wall>,
    index: EntityIndex,
    original: WallData,
    segments: Vec<WallData>,
    // False while the original index is removed from the store
    original_live: bool,
    // Indices from the latest forward pass, in creation order
    created: Vec<EntityIndex>,
    description: String,
}

impl BreakWallCommand {
    pub fn new(
        collab: Collaborators<Wall>,
        wall: Wall,
        segments: Vec<WallData>,
    ) -> CommandResult<Self> {
        if segments.is_empty() {
            return Err(CommandError::Invalid(format!(
                "wall {} cannot be broken into zero segments",
                wall.index
            )));
        }
        let description = format!(
            "Break wall \"{}\" into {} segments",
            Wall::display_name(&wall.data),
            segments.len()
        );
        Ok(Self {
            collab,
            index: wall.index,
            original: wall.data,
            segments,
            original_live: true,
            created: Vec::new(),
            description,
        })
    }

    /// Break a wall into one wall per existing segment.
    pub fn at_every_segment(collab: Collaborators<Wall>, wall: Wall) -> CommandResult<Self> {
        let segments = wall.data.into_segment_walls();
        Self::new(collab, wall, segments)
    }

    pub fn created_indices(&self) -> &[EntityIndex] {
        &self.created
    }

    /// Resumes after a failed pass: the original is removed at most once and
    /// only the segments not yet created are created.
    async fn forward(&mut self) -> CommandResult {
        if self.original_live {
            self.collab.remove(self.index).await?;
            self.original_live = false;
        }
        for segment in &self.segments[self.created.len()..] {
            let index = self.collab.create(segment.clone()).await?;
            self.created.push(index);
        }
        log::info!("{}: created {:?}", self.description, self.created);
        Ok(())
    }

    async fn inverse(&mut self) -> CommandResult {
        remove_all(&self.collab, &mut self.created).await?;
        self.collab.update(self.index, self.original.clone()).await?;
        self.original_live = true;
        log::info!("Undid '{}': restored {}", self.description, self.index);
        Ok(())
    }
}

#[async_trait]
impl Command for BreakWallCommand {
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
