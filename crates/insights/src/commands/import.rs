use insights_core::{Goal, ObservationRecord};
use insights_fs::{read_jsonl, Paths};
use insights_synth::{RecordStore, SqliteStore};
use std::path::Path;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub inserted: usize,
    pub duplicates: usize,
    pub goals: usize,
    pub alignments: usize,
}

pub fn run(file: &Path, goals: Option<&Path>) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("observation file not found: {}", file.display());
    }
    let paths = Paths::new()?;
    let store = super::open_store(&paths)?;
    let stats = import_into(&store, file, goals)?;

    println!(
        "✓ Imported {} observation(s), {} already present",
        stats.inserted, stats.duplicates
    );
    if goals.is_some() {
        println!(
            "  {} goal(s) with {} alignment(s)",
            stats.goals, stats.alignments
        );
    }
    Ok(())
}

/// Append observations and upsert goals. Existing observations are never
/// overwritten; a record whose id is already stored counts as a duplicate.
pub fn import_into(
    store: &SqliteStore,
    file: &Path,
    goals: Option<&Path>,
) -> anyhow::Result<ImportStats> {
    let mut stats = ImportStats::default();

    let records: Vec<ObservationRecord> = read_jsonl(file)?;
    for record in &records {
        if store.insert_observation(record)? {
            stats.inserted += 1;
        } else {
            stats.duplicates += 1;
        }
    }

    if let Some(goals_file) = goals {
        let goals: Vec<Goal> = read_jsonl(goals_file)?;
        for goal in &goals {
            store.upsert_goal(goal)?;
            stats.goals += 1;
            stats.alignments += goal.alignments.len();
        }
    }

    tracing::info!(
        file = %file.display(),
        inserted = stats.inserted,
        duplicates = stats.duplicates,
        goals = stats.goals,
        "import finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use insights_core::{GoalAlignment, GoalStatus, MonthWindow, NarrativeReport, StructuredFields};
    use insights_fs::append_jsonl;
    use tempfile::TempDir;

    fn record(id: &str, day: u32) -> ObservationRecord {
        ObservationRecord {
            id: id.to_string(),
            subject_id: "child-1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            created_at: Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap(),
            raw_text: "notes".to_string(),
            narrative_report: NarrativeReport::Generated("Engagement Index: 7/10".to_string()),
            structured_fields: StructuredFields::default(),
        }
    }

    #[test]
    fn test_import_counts_duplicates() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("obs.jsonl");
        append_jsonl(&file, &record("a", 3)).unwrap();
        append_jsonl(&file, &record("b", 4)).unwrap();
        append_jsonl(&file, &record("a", 3)).unwrap();

        let store = SqliteStore::open_in_memory().unwrap();
        let stats = import_into(&store, &file, None).unwrap();
        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.duplicates, 1);

        let again = import_into(&store, &file, None).unwrap();
        assert_eq!(again.inserted, 0);
        assert_eq!(again.duplicates, 3);
    }

    #[test]
    fn test_import_goals_with_alignments() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("obs.jsonl");
        let goals_file = temp.path().join("goals.jsonl");
        append_jsonl(&file, &record("a", 3)).unwrap();
        append_jsonl(
            &goals_file,
            &Goal {
                id: "g1".to_string(),
                subject_id: "child-1".to_string(),
                text: "Count to 20".to_string(),
                status: GoalStatus::Active,
                alignments: vec![GoalAlignment {
                    observation_id: "a".to_string(),
                    score: 7.0,
                }],
            },
        )
        .unwrap();

        let store = SqliteStore::open_in_memory().unwrap();
        let stats = import_into(&store, &file, Some(&goals_file)).unwrap();
        assert_eq!(stats.goals, 1);
        assert_eq!(stats.alignments, 1);

        let (observations, goals) = store
            .month_inputs("child-1", MonthWindow::new(2025, 3).unwrap())
            .unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(goals[0].alignments[0].score, 7.0);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("obs.jsonl");
        append_jsonl(&file, &record("a", 3)).unwrap();
        std::fs::write(
            &file,
            format!("{}\n{{\"broken\": true}}\n", std::fs::read_to_string(&file).unwrap().trim()),
        )
        .unwrap();

        let store = SqliteStore::open_in_memory().unwrap();
        let stats = import_into(&store, &file, None).unwrap();
        assert_eq!(stats.inserted, 1);
    }
}
