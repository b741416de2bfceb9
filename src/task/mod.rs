pub mod queue;
pub mod types;

#[cfg(test)]
mod tests;

pub use queue::*;
pub use types::*;
