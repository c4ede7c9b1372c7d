//! Selection state: cooldown window, pending choices, persisted selection
//! and pair history.

mod cooldown;
mod history;
mod pending;
mod storage;

pub use cooldown::CooldownGate;
pub use history::{PairHistory, MAX_HISTORY_ITEMS};
pub use pending::PendingSelection;
pub use storage::{
    JsonFileSelectionStore, MemorySelectionStore, SelectionStore, FROM_CURRENCY_KEY, HISTORY_KEY,
    SERVER_INSTANCE_KEY, TO_CURRENCY_KEY,
};
