//! Encounter command demo
//!
//! Breaks a wall into segments against an in-memory store, then walks the
//! history back and forth and prints what the store saw.
//!
//! Run with: cargo run -p encounter_commands --bin encounter-demo

use std::sync::Arc;

use encounter_commands::model::{EncounterId, Entity, EntityIndex, Pole, Wall, WallData};
use encounter_commands::{
    BreakWallCommand, Collaborators, EditorConfig, MemoryStore, UndoHistory,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match EditorConfig::default_path() {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str())
    ).init();

    let encounter = EncounterId::new("demo-encounter");
    let store = Arc::new(MemoryStore::starting_at(10));
    store.insert(
        &encounter,
        Wall::from_parts(
            EntityIndex(0),
            WallData::from_poles(
                Some("Original Wall".to_string()),
                &[
                    Pole::new(0.0, 0.0, 2.0),
                    Pole::new(6.0, 0.0, 2.0),
                    Pole::new(6.0, 6.0, 2.0),
                ],
            ),
        ),
    );

    let collab = Collaborators::shared(encounter.clone(), store.clone())
        .with_refetch_on_failure(config.refetch_on_failure);
    let mut history = UndoHistory::from_config(&config);

    let wall: Wall = store
        .get(&encounter, EntityIndex(0))
        .ok_or("seeded wall missing")?;
    history
        .execute(Box::new(BreakWallCommand::at_every_segment(collab, wall)?))
        .await?;
    print_state("execute", &store, &encounter, &history)?;

    history.undo().await?;
    print_state("undo", &store, &encounter, &history)?;

    history.redo().await?;
    print_state("redo", &store, &encounter, &history)?;

    history.undo().await?;
    print_state("undo", &store, &encounter, &history)?;

    println!();
    println!("Store calls:");
    for call in store.calls() {
        println!("  {:?}", call);
    }
    Ok(())
}

fn print_state(
    step: &str,
    store: &MemoryStore,
    encounter: &EncounterId,
    history: &UndoHistory,
) -> Result<(), serde_json::Error> {
    let walls = store.all::<Wall>(encounter);
    println!();
    println!(
        "After {}: undo={:?} redo={:?}",
        step,
        history.undo_description(),
        history.redo_description()
    );
    println!("{}", serde_json::to_string_pretty(&walls)?);
    Ok(())
}
