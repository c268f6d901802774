use super::*;
use crate::reasoning::{MockReasoner, ResponseFormat};
use serde_json::json;
use std::sync::Arc;

const VALID: &str = r#"{
    "score_breakdown": {
        "conservation_science_alignment": 20,
        "community_impact": 15,
        "biodiversity_outcomes": 25,
        "sustainability": 12,
        "replicability": 8
    },
    "final_score": 80
}"#;

#[test]
fn test_parse_valid_response() {
    let card = parse_score_response(VALID).unwrap();

    assert_eq!(card.final_score, 80);
    assert_eq!(card.score_breakdown.len(), 5);
    assert_eq!(card.score_breakdown.get(Category::BiodiversityOutcomes), Some(25));
    assert_eq!(card.score_breakdown.total(), 80);
}

#[test]
fn test_parse_fenced_response() {
    let fenced = format!("```json\n{}\n```", VALID);
    assert_eq!(parse_score_response(&fenced).unwrap().final_score, 80);
    assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
    assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
}

#[test]
fn test_parse_aliased_keys_and_value_shapes() {
    let raw = json!({
        "final_score": "71.6",
        "score_breakdown": {
            "Alignment with latest conservation science": {"score": 21, "reason": "solid"},
            "Community Impact": "14",
            "1. Biodiversity outcomes (0-30)": 22.4,
            "Sustainability": 9,
            "Replicability": 5
        }
    })
    .to_string();

    let card = parse_score_response(&raw).unwrap();

    assert_eq!(card.final_score, 72);
    assert_eq!(card.score_breakdown.get(Category::ConservationScience), Some(21));
    assert_eq!(card.score_breakdown.get(Category::CommunityImpact), Some(14));
    assert_eq!(card.score_breakdown.get(Category::BiodiversityOutcomes), Some(22));
}

#[test]
fn test_parse_clamps_out_of_range() {
    let raw = json!({
        "final_score": 140,
        "score_breakdown": {
            "conservation_science_alignment": 40,
            "community_impact": -3,
            "biodiversity_outcomes": 30,
            "sustainability": 15,
            "replicability": 11
        }
    })
    .to_string();

    let card = parse_score_response(&raw).unwrap();

    assert_eq!(card.final_score, 100);
    assert_eq!(card.score_breakdown.get(Category::ConservationScience), Some(25));
    assert_eq!(card.score_breakdown.get(Category::CommunityImpact), Some(0));
    assert_eq!(card.score_breakdown.get(Category::Replicability), Some(10));
    assert!(card.score_breakdown.within_caps());
}

#[test]
fn test_parse_ignores_unknown_keys() {
    let raw = json!({
        "final_score": 50,
        "score_breakdown": {
            "conservation_science_alignment": 10,
            "community_impact": 10,
            "biodiversity_outcomes": 10,
            "sustainability": 10,
            "replicability": 10,
            "total": 50
        }
    })
    .to_string();

    assert_eq!(parse_score_response(&raw).unwrap().score_breakdown.len(), 5);
}

#[test]
fn test_parse_format_errors() {
    let missing_category = json!({
        "final_score": 50,
        "score_breakdown": {"community_impact": 10}
    })
    .to_string();
    let duplicate = json!({
        "final_score": 50,
        "score_breakdown": {
            "community_impact": 10,
            "Community": 11,
            "conservation_science_alignment": 10,
            "biodiversity_outcomes": 10,
            "sustainability": 10,
            "replicability": 10
        }
    })
    .to_string();

    let cases: Vec<(&str, ScoreFormatError)> = vec![
        ("I think it scores 80", ScoreFormatError::NotJson { reason: String::new() }),
        ("[1, 2, 3]", ScoreFormatError::NotObject),
        (
            r#"{"score_breakdown": {}}"#,
            ScoreFormatError::MissingField { field: "final_score" },
        ),
        (
            r#"{"final_score": 10}"#,
            ScoreFormatError::MissingField { field: "score_breakdown" },
        ),
        (
            r#"{"final_score": "high", "score_breakdown": {}}"#,
            ScoreFormatError::InvalidValue {
                field: "final_score".into(),
                reason: String::new(),
            },
        ),
        (
            r#"{"final_score": 10, "score_breakdown": []}"#,
            ScoreFormatError::InvalidValue {
                field: "score_breakdown".into(),
                reason: String::new(),
            },
        ),
        (
            missing_category.as_str(),
            ScoreFormatError::MissingCategory { category: String::new() },
        ),
        (
            duplicate.as_str(),
            ScoreFormatError::DuplicateCategory { category: String::new() },
        ),
    ];

    for (raw, expected) in cases {
        let err = parse_score_response(raw).unwrap_err();
        assert_eq!(
            std::mem::discriminant(&err),
            std::mem::discriminant(&expected),
            "{raw}: {err}"
        );
    }
}

#[test]
fn test_category_aliases() {
    assert_eq!(Category::from_label("conservation_science_alignment"), Some(Category::ConservationScience));
    assert_eq!(Category::from_label("Science alignment"), Some(Category::ConservationScience));
    assert_eq!(Category::from_label("community-impact"), Some(Category::CommunityImpact));
    assert_eq!(Category::from_label("BIODIVERSITY"), Some(Category::BiodiversityOutcomes));
    assert_eq!(Category::from_label("sustainable practices"), Some(Category::Sustainability));
    assert_eq!(Category::from_label("replication"), Some(Category::Replicability));
    assert_eq!(Category::from_label("overall"), None);
}

#[test]
fn test_category_label_prefers_exact_then_leading_stem() {
    assert_eq!(
        Category::from_label("Sustainability of community programs"),
        Some(Category::Sustainability)
    );
    assert_eq!(
        Category::from_label("Community-led biodiversity monitoring"),
        Some(Category::CommunityImpact)
    );
    assert_eq!(
        Category::from_label("Biodiversity Outcomes"),
        Some(Category::BiodiversityOutcomes)
    );
}

#[test]
fn test_parse_mixed_stem_labels_do_not_collide() {
    let raw = json!({
        "final_score": 70,
        "score_breakdown": {
            "Alignment with latest conservation science": 20,
            "Community impact": 15,
            "Biodiversity outcomes": 20,
            "Sustainability of community programs": 10,
            "Replicability": 5
        }
    })
    .to_string();

    let card = parse_score_response(&raw).unwrap();

    assert_eq!(card.score_breakdown.get(Category::CommunityImpact), Some(15));
    assert_eq!(card.score_breakdown.get(Category::Sustainability), Some(10));
}

#[test]
fn test_caps_sum_to_hundred() {
    assert_eq!(Category::ALL.iter().map(|c| c.cap()).sum::<u32>(), 100);
}

#[test]
fn test_score_result_serialization() {
    let card = parse_score_response(VALID).unwrap();
    let value = ScoreResult::Scored(card).to_value();

    assert_eq!(value["final_score"], 80);
    assert_eq!(value["score_breakdown"]["conservation_science_alignment"], 20);
    assert_eq!(value["score_breakdown"].as_object().unwrap().len(), 5);

    assert_eq!(
        ScoreResult::zero().to_value(),
        json!({"final_score": 0, "score_breakdown": {}})
    );
    assert_eq!(
        ScoreResult::parse_failure().to_value(),
        json!({"error": "Failed to parse response"})
    );
}

#[test]
fn test_score_result_round_trips_untagged() {
    let failed: ScoreResult = serde_json::from_value(json!({"error": "x"})).unwrap();
    assert!(failed.is_failed());
    assert_eq!(failed.final_score(), None);

    let scored: ScoreResult =
        serde_json::from_value(json!({"final_score": 0, "score_breakdown": {}})).unwrap();
    assert_eq!(scored, ScoreResult::zero());
}

#[tokio::test]
async fn test_scorer_uses_json_mode_at_zero_temperature() {
    let reasoner = Arc::new(MockReasoner::with_responses([VALID]));
    let scorer = Scorer::new(reasoner.clone());

    let result = scorer.score("Project text", "- A: evidence").await.unwrap();

    assert_eq!(result.final_score(), Some(80));
    let request = &reasoner.requests()[0];
    assert_eq!(request.format, ResponseFormat::Json);
    assert_eq!(request.temperature, 0.0);
    assert!(request.prompt.contains("**Project Details:**\nProject text"));
    assert!(request.prompt.contains("**Recent Relevant Data:**\n- A: evidence"));
}

#[tokio::test]
async fn test_scorer_format_error_becomes_envelope() {
    let reasoner = Arc::new(MockReasoner::with_responses(["not json at all"]));
    let scorer = Scorer::new(reasoner);

    let result = scorer.score("p", "e").await.unwrap();

    assert_eq!(result, ScoreResult::parse_failure());
}

#[tokio::test]
async fn test_scorer_transport_error_propagates() {
    let reasoner = Arc::new(MockReasoner::new());
    reasoner.push_failure("503");
    let scorer = Scorer::new(reasoner);

    assert!(matches!(
        scorer.score("p", "e").await,
        Err(ScoringError::Reasoning(_))
    ));
}
