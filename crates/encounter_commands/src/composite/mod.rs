//! Composite structural commands.
//!
//! Each command here is one undo entry that issues an ordered sequence of
//! primitive store calls. Steps run strictly one after another because later
//! steps depend on indices produced by earlier ones. Every index a forward
//! pass creates is captured in the command, and the inverse reads only those
//! captured indices.
//!
//! A sequence is finished through [`Collaborators::resync_after`]: one
//! refetch on success, or a logged, best-effort refetch followed by the
//! original error when a step fails part way.

pub mod break_wall;
pub mod merge_walls;
pub mod split_walls;

pub use break_wall::BreakWallCommand;
pub use merge_walls::MergeWallsCommand;
pub use split_walls::{SplitTarget, SplitWallsCommand};

use encounter_model::{Entity, EntityIndex};

use crate::command::CommandResult;
use crate::sync::Collaborators;

/// An entity a composite command removes and later recreates.
#[derive(Debug, Clone)]
pub(crate) struct Slot<D> {
    pub data: D,
    /// Index while the entity is live, None while it is removed
    pub index: Option<EntityIndex>,
}

impl<D> Slot<D> {
    pub fn live(index: EntityIndex, data: D) -> Self {
        Self {
            data,
            index: Some(index),
        }
    }
}

/// Remove every live slot in order.
pub(crate) async fn retire_slots<E: Entity>(
    collab: &Collaborators<E>,
    slots: &mut [Slot<E::Data>],
) -> CommandResult {
    for slot in slots.iter_mut() {
        if let Some(index) = slot.index {
            collab.remove(index).await?;
            slot.index = None;
        }
    }
    Ok(())
}

/// Recreate every removed slot in order, capturing the new indices.
pub(crate) async fn restore_slots<E: Entity>(
    collab: &Collaborators<E>,
    slots: &mut [Slot<E::Data>],
) -> CommandResult {
    for slot in slots.iter_mut() {
        if slot.index.is_none() {
            slot.index = Some(collab.create(slot.data.clone()).await?);
        }
    }
    Ok(())
}

/// Remove captured indices front to back, dropping each once it is gone.
pub(crate) async fn remove_all<E: Entity>(
    collab: &Collaborators<E>,
    indices: &mut Vec<EntityIndex>,
) -> CommandResult {
    while let Some(&index) = indices.first() {
        collab.remove(index).await?;
        indices.remove(0);
    }
    Ok(())
}
