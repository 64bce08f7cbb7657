//! Property tests for the build decision.
//!
//! Covers the fast paths (not ready, no build, tag change) across arbitrary
//! inputs, and that repeated evaluation of the same snapshot agrees.

use imagebuild_core::build::{ADDITIONAL_BUILD_NEEDED_ANNOTATION, BuildSpec, BuildStatus, Stack};
use imagebuild_core::builder::{BuildpackMetadata, BuilderStatus};
use imagebuild_core::image::{ImageBuild, ImageSpec};
use imagebuild_core::meta::{CONDITION_READY, CONDITION_SUCCEEDED};
use imagebuild_core::source::SourceResolverStatus;
use imagebuild_core::{
    Build, BuildpackInfo, Builder, Condition, ConditionStatus, Image, SourceConfig,
    SourceResolver,
};
use imagebuild_decision::{DecisionEngine, ReasonKind, ReasonPayload, Reasons};
use k8s_openapi::api::core::v1::EnvVar;
use proptest::prelude::*;
use std::collections::BTreeMap;

const URL: &str = "https://github.com/team/app";

fn image(tag: &str, env: &[(String, String)]) -> Image {
    Image {
        spec: ImageSpec {
            tag: tag.to_string(),
            source: SourceConfig::git(URL, "main"),
            build: Some(ImageBuild {
                env: Some(
                    env.iter()
                        .map(|(name, value)| EnvVar {
                            name: name.clone(),
                            value: Some(value.clone()),
                            ..Default::default()
                        })
                        .collect(),
                ),
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn resolver(ready: bool, revision: &str) -> SourceResolver {
    let status = if ready {
        ConditionStatus::True
    } else {
        ConditionStatus::False
    };
    SourceResolver {
        status: SourceResolverStatus {
            conditions: vec![Condition::new(CONDITION_READY, status)],
            source: Some(SourceConfig::git(URL, revision)),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn builder(ready: bool, run_image: &str) -> Builder {
    let status = if ready {
        ConditionStatus::True
    } else {
        ConditionStatus::Unknown
    };
    Builder {
        status: BuilderStatus {
            conditions: vec![Condition::new(CONDITION_READY, status)],
            builder_metadata: vec![BuildpackMetadata {
                id: "paketo/java".into(),
                version: "1.0".into(),
                ..Default::default()
            }]
            .into(),
            stack: Stack {
                run_image: Some(run_image.to_string()),
                id: None,
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

fn build(tag: &str, revision: &str, run_image: &str, success: bool, annotated: bool) -> Build {
    let outcome = if success {
        ConditionStatus::True
    } else {
        ConditionStatus::False
    };
    let mut build = Build {
        spec: BuildSpec {
            tags: vec![tag.to_string()],
            source: SourceConfig::git(URL, revision),
            ..Default::default()
        },
        status: BuildStatus {
            conditions: vec![Condition::new(CONDITION_SUCCEEDED, outcome)],
            build_metadata: vec![BuildpackInfo::new("paketo/java", "1.0")],
            stack: Stack {
                run_image: Some(run_image.to_string()),
                id: None,
            },
            ..Default::default()
        },
        ..Default::default()
    };
    if annotated {
        build.metadata.annotations = Some(BTreeMap::from([(
            ADDITIONAL_BUILD_NEEDED_ANNOTATION.to_string(),
            String::new(),
        )]));
    }
    build
}

fn tag() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,12}(\\.[a-z]{2,3})?/[a-z0-9-]{1,16}"
}

fn revision() -> impl Strategy<Value = String> {
    "[0-9a-f]{7}"
}

fn run_image() -> impl Strategy<Value = String> {
    prop_oneof![
        "gcr.io/run:[a-z0-9]{1,8}",
        "[a-z]{1,8}",
        ".{0,12}",
    ]
}

proptest! {
    #[test]
    fn no_previous_build_requires_config_build(
        tag in tag(),
        revision in revision(),
        run_image in run_image(),
    ) {
        let decision = DecisionEngine::new().build_needed(
            &image(&tag, &[]),
            None,
            &resolver(true, &revision),
            &builder(true, &run_image),
        );
        prop_assert_eq!(decision.status, ConditionStatus::True);
        prop_assert_eq!(
            decision.reasons,
            Reasons::from([(ReasonKind::Config, ReasonPayload::Empty)])
        );
    }

    #[test]
    fn tag_change_yields_only_config(
        image_tag in tag(),
        build_tag in tag(),
        old in revision(),
        new in revision(),
        success in any::<bool>(),
        annotated in any::<bool>(),
    ) {
        prop_assume!(image_tag != build_tag);
        let last = build(&build_tag, &old, "gcr.io/run:a", success, annotated);
        let decision = DecisionEngine::new().build_needed(
            &image(&image_tag, &[]),
            Some(&last),
            &resolver(true, &new),
            &builder(true, "gcr.io/run:b"),
        );
        prop_assert_eq!(decision.status, ConditionStatus::True);
        prop_assert_eq!(decision.kinds().collect::<Vec<_>>(), vec![ReasonKind::Config]);
    }

    #[test]
    fn not_ready_is_unknown(
        source_ready in any::<bool>(),
        builder_ready in any::<bool>(),
        has_build in any::<bool>(),
        tag in tag(),
        old in revision(),
        new in revision(),
    ) {
        prop_assume!(!(source_ready && builder_ready));
        let last = build(&tag, &old, "gcr.io/run:a", true, true);
        let decision = DecisionEngine::new().build_needed(
            &image(&tag, &[]),
            has_build.then_some(&last),
            &resolver(source_ready, &new),
            &builder(builder_ready, "gcr.io/run:b"),
        );
        prop_assert_eq!(decision.status, ConditionStatus::Unknown);
        prop_assert!(decision.reasons.is_empty());
    }

    #[test]
    fn status_true_iff_reasons_present(
        tag in tag(),
        old in revision(),
        new in revision(),
        build_run_image in run_image(),
        builder_run_image in run_image(),
        success in any::<bool>(),
        annotated in any::<bool>(),
        env in proptest::collection::vec(("[A-Z_]{1,8}", "[a-z0-9]{0,4}"), 0..3),
    ) {
        let last = build(&tag, &old, &build_run_image, success, annotated);
        let engine = DecisionEngine::new();
        let decide = || engine.build_needed(
            &image(&tag, &env),
            Some(&last),
            &resolver(true, &new),
            &builder(true, &builder_run_image),
        );

        let decision = decide();
        prop_assert_eq!(decision.is_needed(), !decision.reasons.is_empty());
        prop_assert_ne!(decision.status, ConditionStatus::Unknown);
        if !success {
            prop_assert!(!decision.reasons.contains_key(&ReasonKind::Stack));
        }
        prop_assert_eq!(decision, decide());
    }
}
