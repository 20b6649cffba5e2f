//! Walls and their segments.

use serde::{Deserialize, Serialize};

use crate::{Entity, EntityIndex, EntityKind, Pole};

/// What a segment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SegmentType {
    #[default]
    Wall,
    Door,
    Window,
}

/// Whether a door or window segment lets things through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SegmentState {
    Open,
    #[default]
    Closed,
    Locked,
    Visible,
    Secret,
}

/// A pole-to-pole section of a wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub index: u32,
    pub start_pole: Pole,
    pub end_pole: Pole,
    #[serde(rename = "type")]
    pub segment_type: SegmentType,
    pub is_opaque: bool,
    pub state: SegmentState,
}

impl Segment {
    /// A closed, opaque plain wall segment.
    pub fn wall(index: u32, start_pole: Pole, end_pole: Pole) -> Self {
        Self {
            index,
            start_pole,
            end_pole,
            segment_type: SegmentType::Wall,
            is_opaque: true,
            state: SegmentState::Closed,
        }
    }

    pub fn with_type(mut self, segment_type: SegmentType) -> Self {
        self.segment_type = segment_type;
        self
    }

    pub fn with_state(mut self, state: SegmentState) -> Self {
        self.state = state;
        self
    }
}

/// Authoring data of a wall.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl WallData {
    pub fn new(name: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            name: Some(name.into()),
            segments,
        }
    }

    /// Build an open chain of plain segments through `poles`.
    pub fn from_poles(name: Option<String>, poles: &[Pole]) -> Self {
        let segments = poles
            .windows(2)
            .enumerate()
            .map(|(i, pair)| Segment::wall(i as u32, pair[0], pair[1]))
            .collect();
        Self { name, segments }
    }

    /// Ordered pole chain of the wall.
    ///
    /// A segment's start pole is skipped when it coincides with the previous
    /// segment's end pole, so a connected wall yields `segments + 1` poles.
    pub fn poles(&self) -> Vec<Pole> {
        let mut poles: Vec<Pole> = Vec::with_capacity(self.segments.len() + 1);
        for segment in &self.segments {
            if poles.last() != Some(&segment.start_pole) {
                poles.push(segment.start_pole);
            }
            poles.push(segment.end_pole);
        }
        poles
    }

    /// Split into `segments[..at]` and `segments[at..]`, both re-indexed from 0.
    ///
    /// Returns `None` unless both pieces are non-empty.
    pub fn split_at_segment(&self, at: usize) -> Option<(WallData, WallData)> {
        if at == 0 || at >= self.segments.len() {
            return None;
        }
        let (head, tail) = self.segments.split_at(at);
        Some((
            WallData {
                name: self.name.clone(),
                segments: reindexed(head),
            },
            WallData {
                name: self.name.clone(),
                segments: reindexed(tail),
            },
        ))
    }

    /// One single-segment wall per segment, named `"<name> (k)"`.
    pub fn into_segment_walls(&self) -> Vec<WallData> {
        self.segments
            .iter()
            .enumerate()
            .map(|(k, segment)| WallData {
                name: self.name.as_ref().map(|name| format!("{} ({})", name, k + 1)),
                segments: vec![Segment {
                    index: 0,
                    ..segment.clone()
                }],
            })
            .collect()
    }
}

fn reindexed(segments: &[Segment]) -> Vec<Segment> {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| Segment {
            index: i as u32,
            ..segment.clone()
        })
        .collect()
}

/// A wall as stored in an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub index: EntityIndex,
    #[serde(flatten)]
    pub data: WallData,
}

impl Entity for Wall {
    type Data = WallData;

    const KIND: EntityKind = EntityKind::Wall;

    fn index(&self) -> EntityIndex {
        self.index
    }

    fn data(&self) -> &WallData {
        &self.data
    }

    fn from_parts(index: EntityIndex, data: WallData) -> Self {
        Self { index, data }
    }

    fn name_of(data: &WallData) -> Option<&str> {
        data.name.as_deref()
    }
}
