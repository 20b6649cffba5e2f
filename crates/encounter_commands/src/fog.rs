//! Fog-of-war commands.
//!
//! Fog of war is a region hierarchy: a root region with a positive value
//! obscures an area and nested regions with negative values carve
//! exclusions out of it. Recreating a hierarchy has to follow the original
//! order, root before exclusions, or the reveal weights resolve differently.

use async_trait::async_trait;
use encounter_model::{Entity, EntityIndex, Region, RegionData, RegionType};

use crate::command::{Command, CommandResult};
use crate::composite::{restore_slots, retire_slots, Slot};
use crate::simple::{CreateCommand, DeleteCommand};
use crate::sync::Collaborators;

/// Create a fog-of-war region. The region type is forced to fog of war.
pub struct CreateFogOfWarRegionCommand(CreateCommand<Region>);

impl CreateFogOfWarRegionCommand {
    pub fn new(collab: Collaborators<Region>, data: RegionData) -> CommandResult<Self> {
        let data = RegionData {
            region_type: RegionType::FogOfWar,
            ..data
        };
        let description = format!("Create Fog of War region \"{}\"", Region::display_name(&data));
        let inner = CreateCommand::validated(collab, data)?.with_description(description);
        Ok(Self(inner))
    }

    pub fn created_index(&self) -> Option<EntityIndex> {
        self.0.created_index()
    }
}

#[async_trait]
impl Command for CreateFogOfWarRegionCommand {
    fn description(&self) -> &str {
        self.0.description()
    }

    async fn execute(&mut self) -> CommandResult {
        self.0.execute().await
    }

    async fn undo(&mut self) -> CommandResult {
        self.0.undo().await
    }

    async fn redo(&mut self) -> CommandResult {
        self.0.redo().await
    }
}

/// Delete a fog-of-war region.
pub struct DeleteFogOfWarRegionCommand(DeleteCommand<Region>);

impl DeleteFogOfWarRegionCommand {
    pub fn new(collab: Collaborators<Region>, region: Region) -> Self {
        let Region { index, data } = region;
        let region = Region::from_parts(
            index,
            RegionData {
                region_type: RegionType::FogOfWar,
                ..data
            },
        );
        let description = format!(
            "Delete Fog of War region \"{}\"",
            Region::display_name(&region.data)
        );
        Self(DeleteCommand::new(collab, region).with_description(description))
    }

    pub fn restored_index(&self) -> Option<EntityIndex> {
        self.0.restored_index()
    }
}

#[async_trait]
impl Command for DeleteFogOfWarRegionCommand {
    fn description(&self) -> &str {
        self.0.description()
    }

    async fn execute(&mut self) -> CommandResult {
        self.0.execute().await
    }

    async fn undo(&mut self) -> CommandResult {
        self.0.undo().await
    }

    async fn redo(&mut self) -> CommandResult {
        self.0.redo().await
    }
}

/// Remove every fog-of-war region of an encounter at once.
///
/// Regions are removed in input order and recreated in that same order on
/// undo. Redo removes the recreated regions by their new indices.
pub struct RevealAllFogOfWarCommand {
    collab: Collaborators<Region>,
    regions: Vec<Slot<RegionData>>,
}

impl RevealAllFogOfWarCommand {
    pub const DESCRIPTION: &'static str = "Reveal all Fog of War";

    /// Regions that are not fog of war are left alone.
    pub fn new(collab: Collaborators<Region>, regions: Vec<Region>) -> Self {
        let regions = regions
            .into_iter()
            .filter(|region| {
                let fog = region.data.is_fog_of_war();
                if !fog {
                    log::warn!("Skipping non fog-of-war region {} in reveal", region.index);
                }
                fog
            })
            .map(|region| Slot::live(region.index, region.data))
            .collect();
        Self { collab, regions }
    }

    /// Current index of each region in input order, None while revealed.
    pub fn region_indices(&self) -> Vec<Option<EntityIndex>> {
        self.regions.iter().map(|slot| slot.index).collect()
    }

    async fn reveal(&mut self) -> CommandResult {
        let result = retire_slots(&self.collab, self.regions.as_mut_slice()).await;
        if result.is_ok() {
            log::info!("Revealed {} fog region(s)", self.regions.len());
        }
        self.collab.resync_after(Self::DESCRIPTION, result).await
    }
}

#[async_trait]
impl Command for RevealAllFogOfWarCommand {
    fn description(&self) -> &str {
        Self::DESCRIPTION
    }

    async fn execute(&mut self) -> CommandResult {
        self.reveal().await
    }

    async fn undo(&mut self) -> CommandResult {
        let result = restore_slots(&self.collab, self.regions.as_mut_slice()).await;
        if result.is_ok() {
            log::info!("Restored {} fog region(s)", self.regions.len());
        }
        self.collab.resync_after(Self::DESCRIPTION, result).await
    }

    async fn redo(&mut self) -> CommandResult {
        self.reveal().await
    }
}
