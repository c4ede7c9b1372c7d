//! Load sessions for the chart and rate channels.

mod load;

pub use load::LoadSession;
