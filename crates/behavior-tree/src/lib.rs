//! Lightweight behavior tree primitives for tick-driven agents.
//!
//! The crate is deliberately small: nodes are evaluated synchronously within
//! a single simulation tick and report either success or failure.
//!
//! - **No Running state**: a node either holds this tick or it does not
//! - **Deterministic**: ties are broken by registration order, never by hashing
//! - **Zero dependencies**: pure Rust with no external crates
//!
//! # Architecture
//!
//! - [`Behavior`]: Core trait for all nodes
//! - [`Status`]: Success or Failure
//! - Composite nodes: [`Sequence`] (logical AND), [`PrioritySelector`]
//!   (highest-priority guard that holds)

pub mod behavior;
pub mod builder;
pub mod composite;
pub mod status;

// Re-export core types for ergonomic API
pub use behavior::Behavior;
pub use composite::{PrioritySelector, Sequence};
pub use status::Status;
