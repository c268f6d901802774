use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use super::error::{ScoreFormatError, ScoringError};
use super::types::{Category, ScoreBreakdown, ScoreCard, ScoreResult};
use crate::constants::{MAX_FINAL_SCORE, SCORING_TEMPERATURE};
use crate::prompts::{SCORING_TEMPLATE, render};
use crate::reasoning::{ReasoningRequest, ReasoningService};

/// Removes a surrounding markdown code fence (```` ```json ... ``` ````), if any.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening line.
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn sub_score(value: &Value) -> Option<f64> {
    match value {
        Value::Object(obj) => obj.get("score").and_then(numeric),
        other => numeric(other),
    }
}

/// Rounds `value` and clamps it into `0..=cap`, warning when clamping changes it.
fn bounded(field: &str, value: f64, cap: u32) -> Result<u32, ScoreFormatError> {
    if !value.is_finite() {
        return Err(ScoreFormatError::InvalidValue {
            field: field.to_string(),
            reason: format!("{} is not finite", value),
        });
    }

    let rounded = value.round();
    let clamped = rounded.clamp(0.0, cap as f64);
    if clamped != rounded {
        warn!(field, value, cap, "Score outside range; clamped");
    }
    Ok(clamped as u32)
}

fn parse_breakdown(obj: &Map<String, Value>) -> Result<ScoreBreakdown, ScoreFormatError> {
    let mut breakdown = ScoreBreakdown::new();

    for (key, value) in obj {
        let Some(category) = Category::from_label(key) else {
            debug!(key = %key, "Ignoring unknown breakdown key");
            continue;
        };

        let raw = sub_score(value).ok_or_else(|| ScoreFormatError::InvalidValue {
            field: key.clone(),
            reason: format!("expected a number, got {}", value),
        })?;
        let score = bounded(key, raw, category.cap())?;

        if breakdown.insert(category, score).is_some() {
            return Err(ScoreFormatError::DuplicateCategory {
                category: category.key().to_string(),
            });
        }
    }

    if let Some(missing) = Category::ALL
        .iter()
        .find(|c| breakdown.get(**c).is_none())
    {
        return Err(ScoreFormatError::MissingCategory {
            category: missing.key().to_string(),
        });
    }

    Ok(breakdown)
}

/// Validates a raw scoring response into a [`ScoreCard`].
pub fn parse_score_response(raw: &str) -> Result<ScoreCard, ScoreFormatError> {
    let value: Value =
        serde_json::from_str(strip_code_fences(raw)).map_err(|e| ScoreFormatError::NotJson {
            reason: e.to_string(),
        })?;

    let obj = value.as_object().ok_or(ScoreFormatError::NotObject)?;

    let final_raw = obj
        .get("final_score")
        .ok_or(ScoreFormatError::MissingField {
            field: "final_score",
        })?;
    let final_value = numeric(final_raw).ok_or_else(|| ScoreFormatError::InvalidValue {
        field: "final_score".to_string(),
        reason: format!("expected a number, got {}", final_raw),
    })?;
    let final_score = bounded("final_score", final_value, MAX_FINAL_SCORE)?;

    let breakdown_obj = obj
        .get("score_breakdown")
        .ok_or(ScoreFormatError::MissingField {
            field: "score_breakdown",
        })?
        .as_object()
        .ok_or_else(|| ScoreFormatError::InvalidValue {
            field: "score_breakdown".to_string(),
            reason: "expected an object".to_string(),
        })?;

    Ok(ScoreCard {
        final_score,
        score_breakdown: parse_breakdown(breakdown_obj)?,
    })
}

/// Runs the scoring prompt and validates the answer.
pub struct Scorer {
    reasoner: Arc<dyn ReasoningService>,
}

impl std::fmt::Debug for Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorer").finish_non_exhaustive()
    }
}

impl Scorer {
    pub fn new(reasoner: Arc<dyn ReasoningService>) -> Self {
        Self { reasoner }
    }

    pub fn prompt(project_text: &str, evidence_text: &str) -> String {
        render(
            SCORING_TEMPLATE,
            &[
                ("project_text", project_text),
                ("search_results", evidence_text),
            ],
        )
    }

    /// One JSON-mode reasoning call. Format problems yield the error envelope;
    /// only transport failures are returned as `Err`.
    #[instrument(skip_all, fields(text_len = project_text.len(), evidence_len = evidence_text.len()))]
    pub async fn score(
        &self,
        project_text: &str,
        evidence_text: &str,
    ) -> Result<ScoreResult, ScoringError> {
        let request = ReasoningRequest::json(
            Self::prompt(project_text, evidence_text),
            SCORING_TEMPERATURE,
        );
        let response = self.reasoner.complete(request).await?;

        match parse_score_response(&response) {
            Ok(card) => {
                info!(final_score = card.final_score, "Project scored");
                Ok(ScoreResult::Scored(card))
            }
            Err(e) => {
                warn!(error = %e, response_len = response.len(), "Failed to parse scoring response");
                Ok(ScoreResult::parse_failure())
            }
        }
    }
}
