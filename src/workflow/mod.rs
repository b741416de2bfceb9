//! Workflow orchestration.
//!
//! A run moves through `Seeding -> Draining -> Finalizing -> Done`. The
//! engine is the only writer of the run's [`TaskQueue`](crate::task::TaskQueue)
//! and [`ResultAggregator`]; agents only ever see the task they were handed.

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;

pub use aggregator::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use events::*;
