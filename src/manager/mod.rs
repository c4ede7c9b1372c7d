//! Load orchestration: the currency manager, its view and its command handle.

mod command;
mod engine;
mod view;


pub use command::{Command, CommandError, ManagerHandle};
pub use engine::{
    ChartDispatch, CurrencyManager, ManagerConfig, ManagerSnapshot, PreloadOutcome, SwitchOutcome,
};
pub use view::{DashboardView, LogView, PeriodButton};
