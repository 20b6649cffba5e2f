//! # Encounter Model
//!
//! Structural scene elements of an encounter, the scene a game master edits.
//!
//! Four entity kinds live in an encounter:
//! - [`Wall`]: an ordered chain of pole-to-pole [`Segment`]s
//! - [`Region`]: a polygon tagged with a [`RegionType`], including fog of war
//! - [`LightSource`]: a positioned light
//! - [`SoundSource`]: a positioned, media-backed sound
//!
//! ## Identity
//!
//! Entities are addressed by an [`EntityIndex`] that the authoritative store
//! assigns on creation. The index is unique among live entities of one kind in
//! one encounter, but it is **not** stable across a delete/recreate cycle:
//! recreating an entity yields a fresh index. Everything a caller authored
//! lives in the entity's `Data` type, which is what gets replayed on recreate.

pub mod id;
pub mod geometry;
pub mod entity;
pub mod wall;
pub mod region;
pub mod source;

pub use id::{EncounterId, EntityIndex};
pub use geometry::{Point, Pole};
pub use entity::{Entity, EntityKind, UNNAMED};
pub use wall::{Segment, SegmentState, SegmentType, Wall, WallData};
pub use region::{Region, RegionData, RegionError, RegionType};
pub use source::{
    LightSource, LightSourceData, LightSourceType, MediaRef, SoundSource, SoundSourceData,
};
