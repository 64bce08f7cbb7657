//! Evaluate a snapshot bundle.

use anyhow::{Context, Result};
use imagebuild_config::EngineConfig;
use imagebuild_core::Condition;
use imagebuild_decision::{BuildDecision, DecisionEngine, DecisionInput};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use tracing::info;

/// A decision together with what the reconciler would record for it.
#[derive(Serialize)]
struct DecisionReport<'a> {
    #[serde(flatten)]
    decision: &'a BuildDecision,
    annotations: BTreeMap<String, String>,
    condition: Condition,
}

pub fn run(config: &EngineConfig, input: &str, compact: bool) -> Result<()> {
    let content = read_input(input)?;
    let output =
        evaluate(config, &content, compact).with_context(|| format!("Failed to evaluate {}", input))?;
    println!("{}", output);
    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read snapshot bundle from stdin")?;
        Ok(content)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read snapshot bundle: {}", input))
    }
}

fn evaluate(config: &EngineConfig, content: &str, compact: bool) -> Result<String> {
    let snapshot: DecisionInput =
        serde_json::from_str(content).context("Failed to parse snapshot bundle")?;

    let engine = DecisionEngine::from_config(config);
    let decision = engine.evaluate(&snapshot);
    info!(
        image = %snapshot.image.name(),
        status = %decision.status,
        reasons = ?decision.kinds().collect::<Vec<_>>(),
        "Evaluated build decision"
    );

    let output = if compact {
        serde_json::to_string(&decision)?
    } else {
        serde_json::to_string_pretty(&DecisionReport {
            decision: &decision,
            annotations: decision.annotations()?,
            condition: decision.condition(),
        })?
    };
    Ok(output)
}
