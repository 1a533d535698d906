// State store and tracker engine

mod engine;
mod store;

pub use engine::{Subscription, TrackerEngine};
pub use store::PositionStore;

#[cfg(test)]
mod tests;
