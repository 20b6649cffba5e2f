//! Split existing walls with a new dividing wall.

use async_trait::async_trait;
use encounter_model::{Entity, EntityIndex, Wall, WallData};

use super::remove_all;
use crate::command::{Command, CommandResult};
use crate::error::CommandError;
use crate::sync::Collaborators;

/// A wall the divider cuts, with the ordered pieces it becomes.
#[derive(Debug, Clone)]
pub struct SplitTarget {
    pub index: EntityIndex,
    pub original: WallData,
    /// The first piece stays at `index`; the rest become new walls.
    pub pieces: Vec<WallData>,
}

impl SplitTarget {
    pub fn new(wall: Wall, pieces: Vec<WallData>) -> Self {
        Self {
            index: wall.index,
            original: wall.data,
            pieces,
        }
    }

    /// Cut a wall in two after segment `at`. None unless both pieces are non-empty.
    pub fn at_segment(wall: Wall, at: usize) -> Option<Self> {
        let (head, tail) = wall.data.split_at_segment(at)?;
        Some(Self::new(wall, vec![head, tail]))
    }
}

/// Create a dividing wall and split every wall it crosses.
pub struct SplitWallsCommand {
    collab: Collaborators<Wall>,
    divider: WallData,
    targets: Vec<SplitTarget>,
    // Captured by the latest forward pass
    divider_index: Option<EntityIndex>,
    created: Vec<EntityIndex>,
    // Targets fully split by the current forward pass
    split: usize,
    description: String,
}

impl SplitWallsCommand {
    pub fn new(
        collab: Collaborators<Wall>,
        divider: WallData,
        targets: Vec<SplitTarget>,
    ) -> CommandResult<Self> {
        if let Some(target) = targets.iter().find(|t| t.pieces.is_empty()) {
            return Err(CommandError::Invalid(format!(
                "wall {} has no pieces to split into",
                target.index
            )));
        }
        let description = format!(
            "Split {} walls with \"{}\"",
            targets.len(),
            Wall::display_name(&divider)
        );
        Ok(Self {
            collab,
            divider,
            targets,
            divider_index: None,
            created: Vec::new(),
            split: 0,
            description,
        })
    }

    pub fn divider_index(&self) -> Option<EntityIndex> {
        self.divider_index
    }

    /// Indices of the trailing pieces created by the latest forward pass.
    pub fn created_indices(&self) -> &[EntityIndex] {
        &self.created
    }

    /// Picks up where a failed pass stopped. The divider and every piece
    /// already captured are kept; updating the first piece again is harmless.
    async fn forward(&mut self) -> CommandResult {
        if self.divider_index.is_none() {
            self.divider_index = Some(self.collab.create(self.divider.clone()).await?);
        }
        let mut offset: usize = self.targets[..self.split]
            .iter()
            .map(|target| target.pieces.len().saturating_sub(1))
            .sum();
        for target in &self.targets[self.split..] {
            if let Some((first, rest)) = target.pieces.split_first() {
                self.collab.update(target.index, first.clone()).await?;
                let existing = self.created.len() - offset;
                for piece in &rest[existing..] {
                    let index = self.collab.create(piece.clone()).await?;
                    self.created.push(index);
                }
                offset += rest.len();
            }
            self.split += 1;
        }
        log::info!(
            "{}: divider at {:?}, pieces {:?}",
            self.description,
            self.divider_index,
            self.created
        );
        Ok(())
    }

    async fn inverse(&mut self) -> CommandResult {
        if let Some(index) = self.divider_index {
            self.collab.remove(index).await?;
            self.divider_index = None;
        }
        remove_all(&self.collab, &mut self.created).await?;
        for target in &self.targets {
            self.collab
                .update(target.index, target.original.clone())
                .await?;
        }
        self.split = 0;
        log::info!("Undid '{}'", self.description);
        Ok(())
    }
}

#[async_trait]
impl Command for SplitWallsCommand {
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
