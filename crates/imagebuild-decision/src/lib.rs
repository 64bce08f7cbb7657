//! Build-trigger decisions for the imagebuild controller.
//!
//! Given an Image, its SourceResolver, its builder and the last Build, the
//! [`DecisionEngine`] decides whether a new build is needed and collects every
//! reason that applies. The decision is a pure function of those snapshots.

pub mod detect;
pub mod engine;
pub mod input;
pub mod reason;
pub mod render;

#[cfg(test)]
mod fixtures;

pub use engine::{BuildDecision, DecisionEngine, Reasons, build_needed};
pub use input::DecisionInput;
pub use reason::{Reason, ReasonKind, ReasonPayload, StackChange, Trigger};
