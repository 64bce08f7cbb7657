//! Core resource types for the imagebuild controller.
//!
//! This crate contains:
//! - Snapshots of the Image, Build, SourceResolver and builder resources
//! - Kubernetes-style status conditions
//! - Semantic (representation-insensitive) equality for spec fields
//! - Registry image reference parsing

pub mod build;
pub mod builder;
pub mod error;
pub mod image;
pub mod meta;
pub mod reference;
pub mod semantic;
pub mod source;

pub use build::{Build, BuildpackInfo};
pub use builder::{AnyBuilder, Builder, BuilderResource, BuildpackMetadataList, ClusterBuilder};
pub use error::{Error, Result};
pub use image::Image;
pub use meta::{Condition, ConditionStatus};
pub use reference::{DefaultReferenceParser, ImageRef, ReferenceParser};
pub use semantic::SemanticEq;
pub use source::{RevisionChange, SourceConfig, SourceResolver};
