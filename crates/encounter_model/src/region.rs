//! Polygonal regions, including hierarchical fog of war.
//!
//! A fog-of-war region carries a signed `value`: a root region obscures with a
//! positive value, nested exclusions cut holes with negative values. The order
//! regions are created in matters, roots come before their exclusions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Entity, EntityIndex, EntityKind, Point};

/// Semantic type of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RegionType {
    #[default]
    Zone,
    FogOfWar,
    Illumination,
    Elevation,
}

/// Authoring data of a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionData {
    pub name: String,
    #[serde(rename = "type")]
    pub region_type: RegionType,
    pub vertices: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl RegionData {
    pub fn new(name: impl Into<String>, region_type: RegionType, vertices: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            region_type,
            vertices,
            value: None,
            label: None,
            color: None,
        }
    }

    /// A fog-of-war region with the given reveal weight.
    pub fn fog_of_war(name: impl Into<String>, vertices: Vec<Point>, value: i32) -> Self {
        Self::new(name, RegionType::FogOfWar, vertices).with_value(value)
    }

    pub fn with_value(mut self, value: i32) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn is_fog_of_war(&self) -> bool {
        self.region_type == RegionType::FogOfWar
    }

    /// Fog root: obscures with a positive weight.
    pub fn is_root(&self) -> bool {
        self.is_fog_of_war() && self.value.map_or(false, |v| v > 0)
    }

    /// Fog exclusion: reveals a hole with a negative weight.
    pub fn is_exclusion(&self) -> bool {
        self.is_fog_of_war() && self.value.map_or(false, |v| v < 0)
    }

    /// A region polygon needs at least one vertex.
    pub fn validate(&self) -> Result<(), RegionError> {
        if self.vertices.is_empty() {
            return Err(RegionError::NoVertices(self.name.clone()));
        }
        Ok(())
    }
}

/// Invalid region geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("Region '{0}' has no vertices")]
    NoVertices(String),
}

/// A region as stored in an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub index: EntityIndex,
    #[serde(flatten)]
    pub data: RegionData,
}

impl Entity for Region {
    type Data = RegionData;

    const KIND: EntityKind = EntityKind::Region;

    fn index(&self) -> EntityIndex {
        self.index
    }

    fn data(&self) -> &RegionData {
        &self.data
    }

    fn from_parts(index: EntityIndex, data: RegionData) -> Self {
        Self { index, data }
    }

    fn name_of(data: &RegionData) -> Option<&str> {
        Some(&data.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ]
    }

    #[test]
    fn test_fog_hierarchy_roles() {
        let root = RegionData::fog_of_war("1", triangle(), 1);
        let hole = RegionData::fog_of_war("1.1", triangle(), -1);
        let zone = RegionData::new("Cellar", RegionType::Zone, triangle()).with_value(1);

        assert!(root.is_root() && !root.is_exclusion());
        assert!(hole.is_exclusion() && !hole.is_root());
        assert!(!zone.is_root());
    }

    #[test]
    fn test_validate_rejects_empty_polygon() {
        let empty = RegionData::new("Void", RegionType::Zone, Vec::new());
        assert_eq!(
            empty.validate(),
            Err(RegionError::NoVertices("Void".to_string()))
        );
        assert!(RegionData::new("One", RegionType::Zone, vec![Point::new(1.0, 1.0)])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_region_wire_shape() {
        let region = Region::from_parts(
            EntityIndex(5),
            RegionData::fog_of_war("1", triangle(), 1).with_label("Hidden"),
        );
        let json = serde_json::to_value(&region).unwrap();
        assert_eq!(json["type"], "FogOfWar");
        assert_eq!(json["value"], 1);
        assert_eq!(json["label"], "Hidden");
        assert!(json.get("color").is_none());
    }
}
