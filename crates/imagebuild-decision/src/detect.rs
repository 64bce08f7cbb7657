//! Individual change checks.
//!
//! Each check compares one dimension of the current state against the last
//! build and returns the reason it found, if any. Checks never fail: input
//! they cannot interpret counts as unchanged.

use imagebuild_core::semantic::option_eq;
use imagebuild_core::{
    Build, BuilderResource, BuildpackInfo, Image, ReferenceParser, SemanticEq, SourceResolver,
};
use tracing::warn;

use crate::reason::{Reason, ReasonPayload, StackChange, Trigger};

/// Env, resources, bindings or source location drifted from the last build.
pub fn config_change(
    image: &Image,
    last_build: &Build,
    source_resolver: &SourceResolver,
) -> Option<Reason> {
    let changed = source_resolver.config_changed(last_build)
        || !image.env().semantic_eq(last_build.env())
        || !option_eq(image.resources(), last_build.resources())
        || !image.bindings().semantic_eq(last_build.bindings());

    changed.then(|| Reason::new(Trigger::Config, ReasonPayload::Empty))
}

/// The source resolved to a different revision than the last build used.
pub fn revision_change(last_build: &Build, source_resolver: &SourceResolver) -> Option<Reason> {
    let change = source_resolver.revision_change(last_build);
    change
        .has_changed()
        .then(|| Reason::new(Trigger::Commit, ReasonPayload::Revision(change)))
}

/// Buildpacks the last successful build used that the builder no longer provides.
///
/// Unsuccessful builds do not record reliable buildpack usage and are skipped.
pub fn buildpack_change(last_build: &Build, builder: &dyn BuilderResource) -> Option<Reason> {
    if !last_build.is_success() {
        return None;
    }

    let available = builder.buildpack_metadata();
    let missing: Vec<BuildpackInfo> = last_build
        .status
        .build_metadata
        .iter()
        .filter(|bp| !available.include(bp))
        .cloned()
        .collect();

    (!missing.is_empty()).then(|| Reason::new(Trigger::Buildpack, ReasonPayload::Buildpacks(missing)))
}

/// The builder's run image points at different content than the last successful build's.
///
/// A missing or unparseable run image on either side counts as unchanged.
pub fn stack_change(
    last_build: &Build,
    builder: &dyn BuilderResource,
    parser: &dyn ReferenceParser,
) -> Option<Reason> {
    if !last_build.is_success() {
        return None;
    }

    let recorded = last_build.run_image()?;
    let change = StackChange {
        last_build_run_image: parse_identifier(parser, recorded, "last build")?,
        builder_run_image: parse_identifier(parser, builder.run_image(), "builder")?,
    };

    change
        .has_changed()
        .then(|| Reason::new(Trigger::Stack, ReasonPayload::Stack(change)))
}

fn parse_identifier(parser: &dyn ReferenceParser, reference: &str, owner: &str) -> Option<String> {
    match parser.parse(reference) {
        Ok(image) => Some(image.identifier()),
        Err(e) => {
            warn!(owner, error = %e, "Ignoring unparseable run image");
            None
        }
    }
}

/// The last build carries the manual rebuild annotation.
pub fn trigger_annotation(last_build: &Build, annotation: &str) -> Option<Reason> {
    last_build
        .annotation(annotation)
        .map(|_| Reason::new(Trigger::Annotation, ReasonPayload::Empty))
}
