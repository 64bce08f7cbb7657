//! Representation-insensitive equality for resource spec fields.
//!
//! Specs round-trip through the API server and client libraries that do not
//! preserve representation: an omitted list may come back empty, an env var
//! with no value may come back with `""`, and `1000m` CPU may come back as
//! `1`. Comparisons that decide whether to rebuild must not see those as
//! changes.

use k8s_openapi::api::core::v1::{EnvVar, EnvVarSource, ResourceClaim, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

/// Equality that ignores representation differences.
pub trait SemanticEq {
    fn semantic_eq(&self, other: &Self) -> bool;
}

impl SemanticEq for String {
    fn semantic_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl<T: SemanticEq> SemanticEq for [T] {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.semantic_eq(b))
    }
}

impl<T: SemanticEq> SemanticEq for Vec<T> {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.as_slice().semantic_eq(other.as_slice())
    }
}

/// Compares optional values, treating an absent value as the empty (default) one.
pub fn option_eq<T: SemanticEq + Default>(a: Option<&T>, b: Option<&T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.semantic_eq(b),
        (Some(value), None) | (None, Some(value)) => value.semantic_eq(&T::default()),
        (None, None) => true,
    }
}

impl<T: SemanticEq + Default> SemanticEq for Option<T> {
    fn semantic_eq(&self, other: &Self) -> bool {
        option_eq(self.as_ref(), other.as_ref())
    }
}

impl<K: Ord, V: SemanticEq> SemanticEq for BTreeMap<K, V> {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| v.semantic_eq(o)))
    }
}

impl SemanticEq for Quantity {
    fn semantic_eq(&self, other: &Self) -> bool {
        match (parse_quantity(&self.0), parse_quantity(&other.0)) {
            (Some(a), Some(b)) => a == b,
            _ => self.0 == other.0,
        }
    }
}

impl SemanticEq for EnvVar {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.value.as_deref().unwrap_or_default() == other.value.as_deref().unwrap_or_default()
            && self.value_from.semantic_eq(&other.value_from)
    }
}

impl SemanticEq for EnvVarSource {
    fn semantic_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl SemanticEq for ResourceClaim {
    fn semantic_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl SemanticEq for ResourceRequirements {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.limits.semantic_eq(&other.limits)
            && self.requests.semantic_eq(&other.requests)
            && self.claims.semantic_eq(&other.claims)
    }
}

/// A quantity as `mantissa * 10^exponent`, with trailing zeros folded into the exponent.
#[derive(Debug, PartialEq, Eq)]
struct Scaled {
    mantissa: i128,
    exponent: i32,
}

/// Parses a Kubernetes quantity (`128Mi`, `1.5`, `250m`, `1e3`).
///
/// Returns `None` for anything that is not a valid quantity or does not fit,
/// in which case callers fall back to comparing the raw strings.
fn parse_quantity(raw: &str) -> Option<Scaled> {
    let s = raw.trim();
    let (negative, s) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let number_len = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, suffix) = s.split_at(number_len);
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
        return None;
    }

    let mut mantissa: i128 = 0;
    for digit in whole.chars().chain(fraction.chars()) {
        mantissa = mantissa
            .checked_mul(10)?
            .checked_add(i128::from(digit.to_digit(10)?))?;
    }
    let mut exponent = -i32::try_from(fraction.len()).ok()?;

    match suffix {
        "" => {}
        "n" => exponent -= 9,
        "u" => exponent -= 6,
        "m" => exponent -= 3,
        "k" => exponent += 3,
        "M" => exponent += 6,
        "G" => exponent += 9,
        "T" => exponent += 12,
        "P" => exponent += 15,
        "E" => exponent += 18,
        "Ki" | "Mi" | "Gi" | "Ti" | "Pi" | "Ei" => {
            let power = match suffix {
                "Ki" => 1,
                "Mi" => 2,
                "Gi" => 3,
                "Ti" => 4,
                "Pi" => 5,
                _ => 6,
            };
            mantissa = mantissa.checked_mul(1024_i128.checked_pow(power)?)?;
        }
        _ => {
            let scientific = suffix
                .strip_prefix('e')
                .or_else(|| suffix.strip_prefix('E'))?;
            exponent = exponent.checked_add(scientific.parse::<i32>().ok()?)?;
        }
    }

    if mantissa == 0 {
        return Some(Scaled {
            mantissa: 0,
            exponent: 0,
        });
    }
    while mantissa % 10 == 0 {
        mantissa /= 10;
        exponent = exponent.checked_add(1)?;
    }

    Some(Scaled {
        mantissa: if negative { -mantissa } else { mantissa },
        exponent,
    })
}
