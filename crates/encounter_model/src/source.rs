//! Light and sound sources.

use serde::{Deserialize, Serialize};

use crate::{Entity, EntityIndex, EntityKind, Point};

/// Kind of light a source emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LightSourceType {
    #[default]
    Natural,
    Artificial,
    Supernatural,
}

/// Authoring data of a light source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightSourceData {
    #[serde(rename = "type")]
    pub source_type: LightSourceType,
    pub position: Point,
    pub range: f64,
    pub is_on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LightSourceData {
    /// A switched-on light with no direction, arc, color or name.
    pub fn new(source_type: LightSourceType, position: Point, range: f64) -> Self {
        Self {
            source_type,
            position,
            range,
            is_on: true,
            direction: None,
            arc: None,
            color: None,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict the light to a cone of `arc` degrees facing `direction`.
    pub fn with_cone(mut self, direction: f64, arc: f64) -> Self {
        self.direction = Some(direction);
        self.arc = Some(arc);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn switched(mut self, is_on: bool) -> Self {
        self.is_on = is_on;
        self
    }
}

/// A light source as stored in an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    pub index: EntityIndex,
    #[serde(flatten)]
    pub data: LightSourceData,
}

impl Entity for LightSource {
    type Data = LightSourceData;

    const KIND: EntityKind = EntityKind::LightSource;

    fn index(&self) -> EntityIndex {
        self.index
    }

    fn data(&self) -> &LightSourceData {
        &self.data
    }

    fn from_parts(index: EntityIndex, data: LightSourceData) -> Self {
        Self { index, data }
    }

    fn name_of(data: &LightSourceData) -> Option<&str> {
        data.name.as_deref()
    }
}

/// Reference to the media a sound source plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    pub id: String,
    pub content_type: String,
    pub path: String,
    /// Playback length as `HH:MM:SS`.
    pub duration: String,
}

/// Authoring data of a sound source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundSourceData {
    pub position: Point,
    pub radius: f64,
    pub volume: f64,
    pub is_playing: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub media: MediaRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SoundSourceData {
    /// A stopped, non-looping sound at full volume.
    pub fn new(position: Point, radius: f64, media: MediaRef) -> Self {
        Self {
            position,
            radius,
            volume: 1.0,
            is_playing: false,
            looping: false,
            media,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn playing(mut self, is_playing: bool, looping: bool) -> Self {
        self.is_playing = is_playing;
        self.looping = looping;
        self
    }
}

/// A sound source as stored in an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSource {
    pub index: EntityIndex,
    #[serde(flatten)]
    pub data: SoundSourceData,
}

impl Entity for SoundSource {
    type Data = SoundSourceData;

    const KIND: EntityKind = EntityKind::SoundSource;

    fn index(&self) -> EntityIndex {
        self.index
    }

    fn data(&self) -> &SoundSourceData {
        &self.data
    }

    fn from_parts(index: EntityIndex, data: SoundSourceData) -> Self {
        Self { index, data }
    }

    fn name_of(data: &SoundSourceData) -> Option<&str> {
        data.name.as_deref()
    }
}
