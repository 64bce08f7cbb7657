//! Resource snapshots shared by the unit tests.

use imagebuild_core::build::{BuildSpec, BuildStatus, Stack};
use imagebuild_core::builder::{BuildpackMetadata, BuilderStatus};
use imagebuild_core::image::{ImageBuild, ImageSpec};
use imagebuild_core::meta::{CONDITION_READY, CONDITION_SUCCEEDED};
use imagebuild_core::source::SourceResolverStatus;
use imagebuild_core::{
    Build, BuildpackInfo, ClusterBuilder, Condition, ConditionStatus, Image, SourceConfig,
    SourceResolver,
};
use k8s_openapi::api::core::v1::{EnvVar, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

pub const TAG: &str = "registry.io/team/app";
pub const GIT_URL: &str = "https://github.com/team/app";
pub const COMMIT: &str = "9f2c1e7";
pub const RUN_IMAGE: &str = "gcr.io/paketo-buildpacks/run@sha256:4b9f5e4c9c4a1c2e6d0f1e2a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e";
pub const NEW_RUN_IMAGE: &str = "gcr.io/paketo-buildpacks/run@sha256:0000000000000000000000000000000000000000000000000000000000000001";

pub fn env(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.into(),
        value: Some(value.into()),
        ..Default::default()
    }
}

pub fn memory_limit(value: &str) -> ResourceRequirements {
    ResourceRequirements {
        limits: Some(BTreeMap::from([(
            "memory".to_string(),
            Quantity(value.to_string()),
        )])),
        ..Default::default()
    }
}

pub fn image() -> Image {
    let mut image = Image {
        spec: ImageSpec {
            tag: TAG.into(),
            source: SourceConfig::git(GIT_URL, "main"),
            build: Some(ImageBuild {
                env: Some(vec![env("BP_JVM_VERSION", "17")]),
                resources: Some(memory_limit("1Gi")),
                bindings: None,
            }),
            ..Default::default()
        },
        ..Default::default()
    };
    image.metadata.name = Some("app".into());
    image
}

pub fn resolver() -> SourceResolver {
    SourceResolver {
        status: SourceResolverStatus {
            conditions: vec![Condition::new(CONDITION_READY, ConditionStatus::True)],
            source: Some(SourceConfig::git(GIT_URL, COMMIT)),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn buildpack(id: &str, version: &str) -> BuildpackMetadata {
    BuildpackMetadata {
        id: id.into(),
        version: version.into(),
        api: Some("0.8".into()),
        homepage: None,
    }
}

pub fn builder() -> ClusterBuilder {
    ClusterBuilder {
        status: BuilderStatus {
            conditions: vec![Condition::new(CONDITION_READY, ConditionStatus::True)],
            builder_metadata: vec![buildpack("paketo/java", "1.0"), buildpack("paketo/node", "2.1")]
                .into(),
            stack: Stack {
                run_image: Some(RUN_IMAGE.into()),
                id: Some("io.buildpacks.stacks.jammy".into()),
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A successful build of `image()` against `resolver()` and `builder()`.
pub fn last_build() -> Build {
    let image = image();
    Build {
        spec: BuildSpec {
            tags: vec![TAG.into()],
            source: SourceConfig::git(GIT_URL, COMMIT),
            env: Some(image.env().to_vec()),
            resources: image.resources().cloned(),
            bindings: None,
            ..Default::default()
        },
        status: BuildStatus {
            conditions: vec![Condition::new(CONDITION_SUCCEEDED, ConditionStatus::True)],
            build_metadata: vec![
                BuildpackInfo::new("paketo/java", "1.0"),
                BuildpackInfo::new("paketo/node", "2.1"),
            ],
            stack: Stack {
                run_image: Some(RUN_IMAGE.into()),
                id: Some("io.buildpacks.stacks.jammy".into()),
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn failed(mut build: Build) -> Build {
    build.status.conditions = vec![Condition::new(CONDITION_SUCCEEDED, ConditionStatus::False)];
    build
}

pub fn annotated(mut build: Build, key: &str) -> Build {
    build
        .metadata
        .annotations
        .get_or_insert_with(BTreeMap::new)
        .insert(key.to_string(), "true".to_string());
    build
}
