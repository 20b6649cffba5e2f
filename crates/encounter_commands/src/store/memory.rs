//! In-memory authoritative store.
//!
//! Behaves like the remote store as far as commands can observe: it assigns
//! a fresh index on every creation (indices are never handed out twice),
//! rejects calls that target a missing index, and keeps an ordered log of
//! every call that succeeded. Failures can be injected per operation, and
//! creations can be held back to model a request that has not settled yet.
//!
//! Removing an entity retires its index. An `update` aimed at a retired index
//! re-occupies that slot, which is how a broken wall gets its original
//! content back at its original index.

use std::collections::HashMap;

use async_trait::async_trait;
use encounter_model::{EncounterId, EntityIndex, EntityKind};
use parking_lot::Mutex;
use tokio::sync::watch;

use self::tables::{MemoryBacked, Tables};
use super::{EntityStore, Refetch};
use crate::error::{StoreError, StoreResult};

/// A store operation, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Create(EntityKind),
    Update(EntityKind),
    Remove(EntityKind),
    Refetch,
}

/// A call the store served, in the order it was served.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Create {
        kind: EntityKind,
        index: EntityIndex,
        name: String,
    },
    Update {
        kind: EntityKind,
        index: EntityIndex,
        name: String,
    },
    Remove {
        kind: EntityKind,
        index: EntityIndex,
    },
    Refetch,
}

mod tables {
    use std::collections::BTreeMap;

    use encounter_model::{
        Entity, EntityIndex, LightSource, LightSourceData, Region, RegionData, SoundSource,
        SoundSourceData, Wall, WallData,
    };

    pub struct Table<D> {
        pub rows: BTreeMap<EntityIndex, D>,
        pub next_index: u32,
    }

    impl<D> Table<D> {
        fn starting_at(first_index: u32) -> Self {
            Self {
                rows: BTreeMap::new(),
                next_index: first_index,
            }
        }

        pub fn assign(&mut self) -> EntityIndex {
            let index = EntityIndex(self.next_index);
            self.next_index += 1;
            index
        }

        /// Keep future assignments clear of an externally chosen index.
        pub fn reserve(&mut self, index: EntityIndex) {
            self.next_index = self.next_index.max(index.0 + 1);
        }

        pub fn was_assigned(&self, index: EntityIndex) -> bool {
            index.0 < self.next_index
        }
    }

    pub struct Tables {
        walls: Table<WallData>,
        regions: Table<RegionData>,
        lights: Table<LightSourceData>,
        sounds: Table<SoundSourceData>,
    }

    impl Tables {
        pub fn starting_at(first_index: u32) -> Self {
            Self {
                walls: Table::starting_at(first_index),
                regions: Table::starting_at(first_index),
                lights: Table::starting_at(first_index),
                sounds: Table::starting_at(first_index),
            }
        }
    }

    /// Entity kinds the memory store can hold.
    pub trait MemoryBacked: Entity {
        fn table(tables: &Tables) -> &Table<Self::Data>;
        fn table_mut(tables: &mut Tables) -> &mut Table<Self::Data>;
    }

    macro_rules! memory_backed {
        ($entity:ty, $field:ident) => {
            impl MemoryBacked for $entity {
                fn table(tables: &Tables) -> &Table<Self::Data> {
                    &tables.$field
                }

                fn table_mut(tables: &mut Tables) -> &mut Table<Self::Data> {
                    &mut tables.$field
                }
            }
        };
    }

    memory_backed!(Wall, walls);
    memory_backed!(Region, regions);
    memory_backed!(LightSource, lights);
    memory_backed!(SoundSource, sounds);
}

struct StoreState {
    encounters: HashMap<EncounterId, Tables>,
    first_index: u32,
    calls: Vec<StoreCall>,
    failures: Vec<(StoreOp, StoreError)>,
}

impl StoreState {
    fn tables(&mut self, encounter: &EncounterId) -> &mut Tables {
        let first_index = self.first_index;
        self.encounters
            .entry(encounter.clone())
            .or_insert_with(|| Tables::starting_at(first_index))
    }

    fn take_failure(&mut self, op: StoreOp) -> StoreResult<()> {
        match self.failures.iter().position(|(target, _)| *target == op) {
            Some(pos) => {
                let (_, err) = self.failures.remove(pos);
                log::debug!("Injected failure for {:?}: {}", op, err);
                Err(err)
            }
            None => Ok(()),
        }
    }
}

/// In-memory store for every entity kind.
pub struct MemoryStore {
    state: Mutex<StoreState>,
    creations_held: watch::Sender<bool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// A store whose first assigned index of each kind is `first_index`.
    pub fn starting_at(first_index: u32) -> Self {
        let (creations_held, _) = watch::channel(false);
        Self {
            state: Mutex::new(StoreState {
                encounters: HashMap::new(),
                first_index,
                calls: Vec::new(),
                failures: Vec::new(),
            }),
            creations_held,
        }
    }

    /// Seed an existing entity at its own index. Not logged as a call.
    pub fn insert<E: MemoryBacked>(&self, encounter: &EncounterId, entity: E) {
        let mut state = self.state.lock();
        let table = E::table_mut(state.tables(encounter));
        table.reserve(entity.index());
        table.rows.insert(entity.index(), entity.data().clone());
    }

    pub fn get<E: MemoryBacked>(&self, encounter: &EncounterId, index: EntityIndex) -> Option<E> {
        let state = self.state.lock();
        let tables = state.encounters.get(encounter)?;
        E::table(tables)
            .rows
            .get(&index)
            .map(|data| E::from_parts(index, data.clone()))
    }

    /// Every live entity of one kind, ordered by index.
    pub fn all<E: MemoryBacked>(&self, encounter: &EncounterId) -> Vec<E> {
        let state = self.state.lock();
        state
            .encounters
            .get(encounter)
            .map(|tables| {
                E::table(tables)
                    .rows
                    .iter()
                    .map(|(index, data)| E::from_parts(*index, data.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count<E: MemoryBacked>(&self, encounter: &EncounterId) -> usize {
        let state = self.state.lock();
        state
            .encounters
            .get(encounter)
            .map_or(0, |tables| E::table(tables).rows.len())
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn refetch_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| matches!(call, StoreCall::Refetch))
            .count()
    }

    /// Fail the next call matching `op` with `error`.
    pub fn fail_on(&self, op: StoreOp, error: StoreError) {
        self.state.lock().failures.push((op, error));
    }

    /// Keep every creation pending until [`release_creations`](Self::release_creations).
    pub fn hold_creations(&self) {
        self.creations_held.send_replace(true);
    }

    pub fn release_creations(&self) {
        self.creations_held.send_replace(false);
    }

    async fn creations_released(&self) -> StoreResult<()> {
        let mut held = self.creations_held.subscribe();
        held.wait_for(|held| !*held)
            .await
            .map(|_| ())
            .map_err(|_| StoreError::Unavailable)
    }

    fn create_now<E: MemoryBacked>(&self, encounter: &EncounterId, data: E::Data) -> StoreResult<E> {
        let mut state = self.state.lock();
        state.take_failure(StoreOp::Create(E::KIND))?;
        let table = E::table_mut(state.tables(encounter));
        let index = table.assign();
        table.rows.insert(index, data.clone());
        log::debug!("Store created {} {} in {}", E::KIND, index, encounter);
        state.calls.push(StoreCall::Create {
            kind: E::KIND,
            index,
            name: E::display_name(&data).to_string(),
        });
        Ok(E::from_parts(index, data))
    }

    fn update_now<E: MemoryBacked>(
        &self,
        encounter: &EncounterId,
        index: EntityIndex,
        data: E::Data,
    ) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.take_failure(StoreOp::Update(E::KIND))?;
        let name = E::display_name(&data).to_string();
        let table = E::table_mut(state.tables(encounter));
        if !table.rows.contains_key(&index) && !table.was_assigned(index) {
            return Err(StoreError::NotFound {
                kind: E::KIND,
                index,
            });
        }
        table.rows.insert(index, data);
        log::debug!("Store updated {} {} in {}", E::KIND, index, encounter);
        state.calls.push(StoreCall::Update {
            kind: E::KIND,
            index,
            name,
        });
        Ok(())
    }

    fn remove_now<E: MemoryBacked>(&self, encounter: &EncounterId, index: EntityIndex) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.take_failure(StoreOp::Remove(E::KIND))?;
        let table = E::table_mut(state.tables(encounter));
        if table.rows.remove(&index).is_none() {
            return Err(StoreError::NotFound {
                kind: E::KIND,
                index,
            });
        }
        log::debug!("Store removed {} {} in {}", E::KIND, index, encounter);
        state.calls.push(StoreCall::Remove {
            kind: E::KIND,
            index,
        });
        Ok(())
    }
}

#[async_trait]
impl<E: MemoryBacked> EntityStore<E> for MemoryStore {
    async fn create(&self, encounter: &EncounterId, data: E::Data) -> StoreResult<E> {
        self.creations_released().await?;
        self.create_now(encounter, data)
    }

    async fn update(
        &self,
        encounter: &EncounterId,
        index: EntityIndex,
        data: E::Data,
    ) -> StoreResult<()> {
        self.update_now::<E>(encounter, index, data)
    }

    async fn remove(&self, encounter: &EncounterId, index: EntityIndex) -> StoreResult<()> {
        self.remove_now::<E>(encounter, index)
    }
}

#[async_trait]
impl Refetch for MemoryStore {
    async fn refetch(&self) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.take_failure(StoreOp::Refetch)?;
        state.calls.push(StoreCall::Refetch);
        Ok(())
    }
}
