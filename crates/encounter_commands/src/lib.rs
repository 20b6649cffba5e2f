//! # Encounter Commands
//!
//! Reversible edits of encounter structure (walls, regions, fog of war,
//! light and sound sources) against a remote authoritative store.
//!
//! ## Architecture
//!
//! ```text
//! Toolbar / Dialog / Drag → Command → Collaborators → Store
//!                              ↑                        │
//!                         UndoHistory            refetch ┘
//! ```
//!
//! Every structural mutation goes through a [`Command`]. A command is bound
//! to one encounter through its [`Collaborators`] and keeps only the state it
//! needs to invert itself: authoring snapshots plus the indices the store
//! handed back on its most recent creations. Canonical state is pulled back
//! with a refetch after each mutating step.
//!
//! The store reassigns indices on every creation, so an inverse operation
//! always targets the index captured last, never the one the command was
//! constructed with.
//!
//! ## Command families
//!
//! - [`simple`]: create, delete and edit for each entity kind
//! - [`placement`]: fire-and-forget placement during drag gestures
//! - [`composite`]: break, merge and split walls
//! - [`fog`]: fog-of-war creation, deletion and bulk reveal

pub mod error;
pub mod command;
pub mod store;
pub mod sync;
pub mod simple;
pub mod placement;
pub mod composite;
pub mod fog;
pub mod history;
pub mod config;

pub use error::{CommandError, StoreError, StoreResult};
pub use command::{Command, CommandResult, ExecutionStyle};
pub use store::{EntityStore, Refetch, RefetchFn, StoreFns};
pub use store::memory::{MemoryStore, StoreCall, StoreOp};
pub use sync::Collaborators;
pub use simple::{
    CreateCommand, CreateLightSourceCommand, CreateRegionCommand, CreateSoundSourceCommand,
    CreateWallCommand, DeleteCommand, DeleteLightSourceCommand, DeleteRegionCommand,
    DeleteSoundSourceCommand, DeleteWallCommand, EditCommand, EditRegionCommand,
    EditWallCommand, UpdateLightSourceCommand, UpdateSoundSourceCommand,
};
pub use placement::{
    PlaceCommand, PlaceLightSourceCommand, PlaceRegionCommand, PlaceSoundSourceCommand,
    PlaceWallCommand, RemoveLightSourceCommand, RemovePlacedCommand, RemoveRegionCommand,
    RemoveSoundSourceCommand, RemoveWallCommand,
};
pub use composite::{BreakWallCommand, MergeWallsCommand, SplitTarget, SplitWallsCommand};
pub use fog::{
    CreateFogOfWarRegionCommand, DeleteFogOfWarRegionCommand, RevealAllFogOfWarCommand,
};
pub use history::{Transaction, UndoHistory};
pub use config::{ConfigError, EditorConfig};

pub use encounter_model as model;
