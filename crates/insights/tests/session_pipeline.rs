mod common;

use common::*;
use insights_core::{extract, MonthWindow};
use insights_render::flatten_symbols;
use insights_synth::{
    intake_text, synthesize_session, Gender, Identity, IntakeError, PlainTextSource, RecordStore,
    SqliteStore,
};
use std::time::Duration;

#[tokio::test]
async fn test_transcript_names_never_reach_report_header() {
    let generator = Scripted {
        narrative: template_narrative("Marcus", 8, 5),
        fields: r#"{"studentName": "Marcus", "observations": "Built a bridge with Marcus",
                   "strengths": ["collaboration"], "curiositySeed": "bridges"}"#
            .to_string(),
    };
    let identity = Identity::new(Some("Ava"), Gender::Female);

    let record = synthesize_session(
        &generator,
        "Observer: What are you building, Ava?\nChild: A bridge! Marcus said it would fall.",
        &identity,
        SUBJECT,
        day(2025, 3, 4),
        Duration::from_secs(1),
    )
    .await;

    let text = record.narrative_report.text();
    assert!(text.contains("Child's Name: Ava"));
    assert!(!text.contains("Child's Name: Marcus"));
    assert_eq!(record.structured_fields.strengths, vec!["collaboration"]);
    assert_eq!(record.structured_fields.curiosity_seed.as_deref(), Some("bridges"));

    // Metrics survive identity enforcement
    let sample = extract(text);
    assert_eq!(sample.engagement_index, Some(8));
    assert_eq!(sample.growth_score, Some(5));
}

#[tokio::test]
async fn test_generated_record_is_stored_once() {
    let generator = Scripted {
        narrative: template_narrative("Ava", 7, 4),
        fields: "not json at all".to_string(),
    };
    let identity = Identity::new(Some("Ava"), Gender::Female);
    let record = synthesize_session(
        &generator,
        "Sorted leaves by colour",
        &identity,
        SUBJECT,
        day(2025, 3, 6),
        Duration::from_secs(1),
    )
    .await;
    assert!(!record.narrative_report.is_fallback());
    assert!(record.structured_fields.strengths.is_empty());

    let store = SqliteStore::open_in_memory().unwrap();
    assert!(store.insert_observation(&record).unwrap());
    assert!(!store.insert_observation(&record).unwrap());

    let (observations, _) = store
        .month_inputs(SUBJECT, MonthWindow::new(2025, 3).unwrap())
        .unwrap();
    assert_eq!(observations, vec![record]);
}

#[tokio::test]
async fn test_empty_ocr_output_is_reported() {
    let err = intake_text(&PlainTextSource, b"\n\n", "text/plain", Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, IntakeError::NoContent { .. }));
}

#[test]
fn test_printable_daily_narrative_has_no_emoji() {
    let flat = flatten_symbols(&template_narrative("Ava", 7, 4));
    assert!(flat.starts_with("[Child] Child's Name: Ava"));
    assert!(flat.contains("[Growth Metrics] Growth Metrics:"));
    assert!(flat.contains("[Social] Social | [Excellent] Excellent"));
    assert!(!flat.chars().any(|c| u32::from(c) > 0xFFFF));
}
