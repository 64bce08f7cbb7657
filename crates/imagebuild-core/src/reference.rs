//! Registry image reference parsing.
//!
//! Understands the usual `[registry/]repository[:tag][@digest]` forms. A
//! reference without a registry host belongs to the default registry, and a
//! reference with neither tag nor digest gets the default tag.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Docker Hub's canonical registry host.
pub const DOCKER_HUB: &str = "index.docker.io";

const DOCKER_HUB_ALIAS: &str = "docker.io";
const DEFAULT_TAG: &str = "latest";
const REPOSITORY_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789_-./";

/// Parses image references.
pub trait ReferenceParser: Send + Sync {
    fn parse(&self, reference: &str) -> Result<ImageRef>;
}

/// The tag or digest part of a reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pointer {
    Tag(String),
    Digest(String),
}

/// A parsed image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    registry: String,
    repository: String,
    pointer: Pointer,
}

impl ImageRef {
    pub fn registry(&self) -> &str {
        &self.registry
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    /// Repository and tag or digest, without the registry host.
    ///
    /// Two references with the same identifier point at the same content
    /// regardless of which registry host they are pulled through.
    pub fn identifier(&self) -> String {
        match &self.pointer {
            Pointer::Tag(tag) => format!("{}:{}", self.repository, tag),
            Pointer::Digest(digest) => format!("{}@{}", self.repository, digest),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.registry, self.identifier())
    }
}

/// Reference parser with configurable registry and tag defaults.
#[derive(Debug, Clone)]
pub struct DefaultReferenceParser {
    default_registry: String,
    default_tag: String,
}

impl DefaultReferenceParser {
    pub fn new() -> Self {
        Self::with_defaults(DOCKER_HUB, DEFAULT_TAG)
    }

    pub fn with_defaults(registry: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            default_registry: canonical_registry(&registry.into()),
            default_tag: tag.into(),
        }
    }

    /// Check that the configured defaults are a valid registry host and tag.
    pub fn validate(&self) -> Result<()> {
        check_registry(&self.default_registry, &self.default_registry)?;
        check_tag(&self.default_tag, &self.default_tag)
    }

    fn split_registry<'a>(&self, reference: &str, name: &'a str) -> Result<(String, &'a str)> {
        let (registry, repository) = match name.split_once('/') {
            Some((host, rest))
                if host.contains('.') || host.contains(':') || host == "localhost" =>
            {
                check_registry(reference, host)?;
                (canonical_registry(host), rest)
            }
            _ => (self.default_registry.clone(), name),
        };
        check_repository(reference, repository)?;
        Ok((registry, repository))
    }
}

impl Default for DefaultReferenceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceParser for DefaultReferenceParser {
    fn parse(&self, reference: &str) -> Result<ImageRef> {
        if reference.is_empty() {
            return Err(Error::reference(reference, "reference is empty"));
        }
        if reference.chars().any(char::is_whitespace) {
            return Err(Error::reference(reference, "reference contains whitespace"));
        }

        let (name, pointer) = match reference.split_once('@') {
            Some((name, digest)) => {
                check_digest(reference, digest)?;
                // A tag next to a digest is informational only.
                let (name, _) = split_tag(name);
                (name, Pointer::Digest(digest.to_string()))
            }
            None => {
                let (name, tag) = split_tag(reference);
                let tag = tag.unwrap_or(&self.default_tag);
                check_tag(reference, tag)?;
                (name, Pointer::Tag(tag.to_string()))
            }
        };

        let (registry, repository) = self.split_registry(reference, name)?;
        let repository = if registry == DOCKER_HUB && !repository.contains('/') {
            format!("library/{}", repository)
        } else {
            repository.to_string()
        };

        Ok(ImageRef {
            registry,
            repository,
            pointer,
        })
    }
}

fn canonical_registry(registry: &str) -> String {
    if registry == DOCKER_HUB_ALIAS {
        DOCKER_HUB.to_string()
    } else {
        registry.to_string()
    }
}

/// Splits a trailing `:tag`, ignoring the colon of a `host:port` prefix.
fn split_tag(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once(':') {
        Some((base, tag)) if !tag.contains('/') => (base, Some(tag)),
        _ => (name, None),
    }
}

fn check_registry(reference: &str, registry: &str) -> Result<()> {
    let valid = !registry.is_empty()
        && registry
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']'));
    if valid {
        Ok(())
    } else {
        Err(Error::reference(reference, format!("invalid registry {:?}", registry)))
    }
}

fn check_repository(reference: &str, repository: &str) -> Result<()> {
    if repository.is_empty() || repository.len() > 255 {
        return Err(Error::reference(reference, "repository must be 1-255 characters"));
    }
    if let Some(c) = repository.chars().find(|c| !REPOSITORY_CHARS.contains(*c)) {
        return Err(Error::reference(
            reference,
            format!("repository contains invalid character {:?}", c),
        ));
    }
    if repository.split('/').any(str::is_empty) {
        return Err(Error::reference(reference, "repository has an empty path component"));
    }
    Ok(())
}

fn check_tag(reference: &str, tag: &str) -> Result<()> {
    let valid = (1..=128).contains(&tag.len())
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::reference(reference, format!("invalid tag {:?}", tag)))
    }
}

fn check_digest(reference: &str, digest: &str) -> Result<()> {
    let Some((algorithm, hex)) = digest.split_once(':') else {
        return Err(Error::reference(reference, "digest is missing its algorithm"));
    };
    let expected_len = match algorithm {
        "sha256" => 64,
        "sha512" => 128,
        _ => {
            return Err(Error::reference(
                reference,
                format!("unsupported digest algorithm {:?}", algorithm),
            ));
        }
    };
    let valid = hex.len() == expected_len
        && hex
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, 'a'..='f'));
    if valid {
        Ok(())
    } else {
        Err(Error::reference(reference, "malformed digest"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "sha256:4b9f5e4c9c4a1c2e6d0f1e2a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e";

    fn parse(reference: &str) -> ImageRef {
        DefaultReferenceParser::new().parse(reference).unwrap()
    }

    #[test]
    fn test_short_name_defaults() {
        let image = parse("ubuntu");
        assert_eq!(image.registry(), DOCKER_HUB);
        assert_eq!(image.repository(), "library/ubuntu");
        assert_eq!(image.pointer(), &Pointer::Tag("latest".into()));
        assert_eq!(image.to_string(), "index.docker.io/library/ubuntu:latest");
    }

    #[test]
    fn test_registry_with_port() {
        let image = parse("localhost:5000/team/app:1.2");
        assert_eq!(image.registry(), "localhost:5000");
        assert_eq!(image.repository(), "team/app");
        assert_eq!(image.identifier(), "team/app:1.2");

        let untagged = parse("localhost:5000/team/app");
        assert_eq!(untagged.identifier(), "team/app:latest");
    }

    #[test]
    fn test_digest_reference() {
        let image = parse(&format!("gcr.io/paketo-buildpacks/run@{}", DIGEST));
        assert_eq!(image.registry(), "gcr.io");
        assert_eq!(image.pointer(), &Pointer::Digest(DIGEST.into()));
        assert_eq!(
            image.identifier(),
            format!("paketo-buildpacks/run@{}", DIGEST)
        );

        let tagged = parse(&format!("gcr.io/paketo-buildpacks/run:base@{}", DIGEST));
        assert_eq!(tagged.identifier(), image.identifier());
    }

    #[test]
    fn test_identifier_ignores_registry_host() {
        let hub = parse("docker.io/paketobuildpacks/run:base-cnb");
        let mirror = parse("mirror.example.com/paketobuildpacks/run:base-cnb");
        assert_eq!(hub.registry(), DOCKER_HUB);
        assert_eq!(hub.identifier(), mirror.identifier());
        assert_ne!(hub.to_string(), mirror.to_string());
    }

    #[test]
    fn test_configured_defaults() {
        let parser = DefaultReferenceParser::with_defaults("registry.internal", "stable");
        let image = parser.parse("app").unwrap();
        assert_eq!(image.registry(), "registry.internal");
        assert_eq!(image.repository(), "app");
        assert_eq!(image.identifier(), "app:stable");
    }

    #[test]
    fn test_validate_defaults() {
        assert!(DefaultReferenceParser::new().validate().is_ok());
        assert!(DefaultReferenceParser::with_defaults("localhost:5000", "v1").validate().is_ok());
        assert!(DefaultReferenceParser::with_defaults("not a host!", "latest").validate().is_err());
        assert!(DefaultReferenceParser::with_defaults("", "latest").validate().is_err());
        assert!(DefaultReferenceParser::with_defaults(DOCKER_HUB, "a/b").validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_references() {
        let parser = DefaultReferenceParser::new();
        for bad in [
            "",
            "Ubuntu",
            "ubuntu:",
            "ubuntu:bad tag",
            "gcr.io/app@sha256:1234",
            "gcr.io/app@md5:0123456789abcdef0123456789abcdef",
            "gcr.io//app",
            "gcr.io/app/",
        ] {
            let result = parser.parse(bad);
            assert!(
                matches!(result, Err(Error::InvalidReference { .. })),
                "expected {:?} to be rejected",
                bad
            );
        }
    }
}
