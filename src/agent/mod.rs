//! Analysis agents and the router that dispatches tasks to them.
//!
//! Each agent serves exactly one [`TaskKind`](crate::task::TaskKind). Agents
//! never touch the queue; the workflow engine turns their results into
//! follow-up tasks.

pub mod directory;
pub mod retry;
pub mod router;
pub mod text;
pub mod types;

pub use directory::*;
pub use retry::*;
pub use router::*;
pub use text::*;
pub use types::*;
