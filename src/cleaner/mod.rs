pub mod engine;

pub use engine::{CleanOutcome, CleanStatus, CleanupEngine};
