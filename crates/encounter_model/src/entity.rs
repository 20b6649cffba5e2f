//! The trait binding each entity kind to the command layer.

use std::fmt;

use crate::EntityIndex;

/// Display name used when an entity carries no name.
pub const UNNAMED: &str = "Unnamed";

/// The four structural entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Wall,
    Region,
    LightSource,
    SoundSource,
}

impl EntityKind {
    /// Lower-case noun used in command descriptions.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Wall => "wall",
            Self::Region => "region",
            Self::LightSource => "light source",
            Self::SoundSource => "sound source",
        }
    }

    /// Verb used for in-place edits of this kind.
    pub fn edit_verb(&self) -> &'static str {
        match self {
            Self::Wall | Self::Region => "Edit",
            Self::LightSource | Self::SoundSource => "Update",
        }
    }

    /// Noun used by drag-placement commands ("Place Wall", "Remove Source").
    pub fn placement_noun(&self) -> &'static str {
        match self {
            Self::Wall => "Wall",
            Self::Region => "Region",
            Self::LightSource | Self::SoundSource => "Source",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// A structural entity as the store returns it: an index plus authoring data.
///
/// `Data` is everything the user authored and is sufficient to recreate the
/// entity; the index is whatever the store assigned last.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    /// Authoring data, replayed verbatim on create and update.
    type Data: Clone + fmt::Debug + PartialEq + Send + Sync + 'static;

    const KIND: EntityKind;

    fn index(&self) -> EntityIndex;

    fn data(&self) -> &Self::Data;

    fn from_parts(index: EntityIndex, data: Self::Data) -> Self;

    /// Name stored in the authoring data, if any.
    fn name_of(data: &Self::Data) -> Option<&str>;

    /// Name for descriptions and logs.
    fn display_name(data: &Self::Data) -> &str {
        match Self::name_of(data) {
            Some(name) if !name.is_empty() => name,
            _ => UNNAMED,
        }
    }
}
