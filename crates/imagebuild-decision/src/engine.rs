//! The build decision: readiness gate, tag fast path and reason aggregation.

use imagebuild_config::EngineConfig;
use imagebuild_core::{
    Build, BuilderResource, ConditionStatus, DefaultReferenceParser, Image, ReferenceParser,
    SourceResolver,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::detect;
use crate::input::DecisionInput;
use crate::reason::{Reason, ReasonKind, ReasonPayload, Trigger};

/// Reasons keyed by kind. A kind reported twice keeps the later payload.
pub type Reasons = BTreeMap<ReasonKind, ReasonPayload>;

/// Whether a build is needed and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildDecision {
    pub status: ConditionStatus,
    pub reasons: Reasons,
}

impl BuildDecision {
    /// Dependencies are not ready; no decision can be made.
    pub fn unknown() -> Self {
        Self {
            status: ConditionStatus::Unknown,
            reasons: Reasons::new(),
        }
    }

    /// Folds reasons into a decision: `True` when any reason applies, else `False`.
    pub fn from_reasons(reasons: impl IntoIterator<Item = Reason>) -> Self {
        let mut folded = Reasons::new();
        for reason in reasons {
            debug!(trigger = %reason.trigger, kind = %reason.kind(), "Build reason");
            folded.insert(reason.kind(), reason.payload);
        }

        let status = if folded.is_empty() {
            ConditionStatus::False
        } else {
            ConditionStatus::True
        };
        Self {
            status,
            reasons: folded,
        }
    }

    pub fn is_needed(&self) -> bool {
        self.status.is_true()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ReasonKind> + '_ {
        self.reasons.keys().copied()
    }
}

/// Decides whether images need new builds.
///
/// The engine holds only configuration, so one instance can serve any number
/// of images concurrently.
#[derive(Debug, Clone)]
pub struct DecisionEngine<P = DefaultReferenceParser> {
    parser: P,
    trigger_annotation: String,
}

impl DecisionEngine {
    pub fn new() -> Self {
        Self::from_config(&EngineConfig::default())
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_parser(config.reference_parser(), config.trigger_annotation.clone())
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ReferenceParser> DecisionEngine<P> {
    /// Create an engine with a custom reference parser.
    pub fn with_parser(parser: P, trigger_annotation: impl Into<String>) -> Self {
        Self {
            parser,
            trigger_annotation: trigger_annotation.into(),
        }
    }

    /// Decide whether `image` needs a new build.
    ///
    /// - `Unknown` while the source resolver or builder is not ready.
    /// - `True` with only a config reason when there is no last build or it
    ///   was pushed to a different tag.
    /// - Otherwise every check runs and `True` carries all reasons found.
    pub fn build_needed(
        &self,
        image: &Image,
        last_build: Option<&Build>,
        source_resolver: &SourceResolver,
        builder: &dyn BuilderResource,
    ) -> BuildDecision {
        if !source_resolver.ready() || !builder.ready() {
            debug!(
                image = %image.name(),
                source_ready = source_resolver.ready(),
                builder = builder.kind(),
                builder_ready = builder.ready(),
                "Dependencies not ready"
            );
            return BuildDecision::unknown();
        }

        let last_build = match last_build {
            Some(build) if build.tag() == image.spec.tag => build,
            _ => {
                debug!(image = %image.name(), tag = %image.spec.tag, "No build for current tag");
                return BuildDecision::from_reasons([Reason::new(
                    Trigger::Tag,
                    ReasonPayload::Empty,
                )]);
            }
        };

        let reasons = [
            detect::config_change(image, last_build, source_resolver),
            detect::revision_change(last_build, source_resolver),
            detect::buildpack_change(last_build, builder),
            detect::stack_change(last_build, builder, &self.parser),
            detect::trigger_annotation(last_build, &self.trigger_annotation),
        ];

        let decision = BuildDecision::from_reasons(reasons.into_iter().flatten());
        debug!(
            image = %image.name(),
            last_build = %last_build.name(),
            status = %decision.status,
            reasons = decision.reasons.len(),
            "Build decision"
        );
        decision
    }

    /// Decide from a bundled snapshot.
    pub fn evaluate(&self, input: &DecisionInput) -> BuildDecision {
        self.build_needed(
            &input.image,
            input.last_build.as_ref(),
            &input.source_resolver,
            &input.builder,
        )
    }
}

/// Decide with the default configuration.
pub fn build_needed(
    image: &Image,
    last_build: Option<&Build>,
    source_resolver: &SourceResolver,
    builder: &dyn BuilderResource,
) -> BuildDecision {
    DecisionEngine::new().build_needed(image, last_build, source_resolver, builder)
}
