use anyhow::{bail, Result};
use chrono::NaiveDate;
use insights_core::{
    Goal, GoalAlignment, GoalStatus, MonthWindow, NarrativeReport, ObservationRecord,
    StructuredFields,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Record store reached through simple predicate filters
pub trait RecordStore {
    /// Observations for `subject_id` dated in `[start, end)`, oldest first
    fn observations_in(
        &self,
        subject_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ObservationRecord>>;

    /// The latest `limit` observations for `subject_id`, oldest first
    fn recent_observations(
        &self,
        subject_id: &str,
        limit: usize,
    ) -> Result<Vec<ObservationRecord>>;

    /// Goals for a subject, without alignments
    fn goals_for(&self, subject_id: &str) -> Result<Vec<Goal>>;

    fn alignments_for(&self, goal_id: &str) -> Result<Vec<GoalAlignment>>;

    /// Append a record. Returns false when the id already exists; stored
    /// records are never modified.
    fn insert_observation(&self, record: &ObservationRecord) -> Result<bool>;

    /// Everything aggregation needs for one subject and month
    fn month_inputs(
        &self,
        subject_id: &str,
        window: MonthWindow,
    ) -> Result<(Vec<ObservationRecord>, Vec<Goal>)> {
        let observations = self.observations_in(subject_id, window.start(), window.end())?;
        let mut goals = self.goals_for(subject_id)?;
        for goal in &mut goals {
            goal.alignments = self.alignments_for(&goal.id)?;
        }
        Ok((observations, goals))
    }
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS observations (
                id TEXT PRIMARY KEY,
                subject_id TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                raw_text TEXT NOT NULL,
                narrative_kind TEXT NOT NULL,
                narrative_text TEXT NOT NULL,
                strengths TEXT NOT NULL,
                areas_of_development TEXT NOT NULL,
                recommendations TEXT NOT NULL,
                theme_of_day TEXT,
                curiosity_seed TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_subject_date ON observations(subject_id, date);
            CREATE TABLE IF NOT EXISTS goals (
                id TEXT PRIMARY KEY,
                subject_id TEXT NOT NULL,
                text TEXT NOT NULL,
                status TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_goal_subject ON goals(subject_id);
            CREATE TABLE IF NOT EXISTS goal_alignments (
                goal_id TEXT NOT NULL,
                observation_id TEXT NOT NULL,
                score REAL NOT NULL,
                PRIMARY KEY (goal_id, observation_id)
            );
            ",
        )?;
        Ok(())
    }

    /// Insert a goal or update it in place, then add its alignments
    pub fn upsert_goal(&self, goal: &Goal) -> Result<()> {
        self.conn.execute(
            "INSERT INTO goals (id, subject_id, text, status) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                subject_id = excluded.subject_id,
                text = excluded.text,
                status = excluded.status",
            params![goal.id, goal.subject_id, goal.text, goal.status.as_str()],
        )?;
        for alignment in &goal.alignments {
            self.add_alignment(&goal.id, alignment)?;
        }
        Ok(())
    }

    pub fn add_alignment(&self, goal_id: &str, alignment: &GoalAlignment) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO goal_alignments VALUES (?, ?, ?)",
            params![goal_id, alignment.observation_id, alignment.score],
        )?;
        Ok(())
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<ObservationRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM observations WHERE id = ?")?;
        let mut rows = stmt.query(params![id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_observation(row)?))
        } else {
            Ok(None)
        }
    }

    fn row_to_observation(row: &rusqlite::Row) -> Result<ObservationRecord> {
        let kind: String = row.get(5)?;
        let text: String = row.get(6)?;
        let narrative_report = match kind.as_str() {
            "generated" => NarrativeReport::Generated(text),
            "fallback" => NarrativeReport::Fallback(text),
            other => bail!("unknown narrative kind: {other}"),
        };

        Ok(ObservationRecord {
            id: row.get(0)?,
            subject_id: row.get(1)?,
            date: row.get::<_, String>(2)?.parse()?,
            created_at: row.get::<_, String>(3)?.parse()?,
            raw_text: row.get(4)?,
            narrative_report,
            structured_fields: StructuredFields {
                strengths: serde_json::from_str(&row.get::<_, String>(7)?)?,
                areas_of_development: serde_json::from_str(&row.get::<_, String>(8)?)?,
                recommendations: serde_json::from_str(&row.get::<_, String>(9)?)?,
                theme_of_day: row.get(10)?,
                curiosity_seed: row.get(11)?,
            },
        })
    }
}

fn parse_status(status: &str) -> Result<GoalStatus> {
    match status {
        "active" => Ok(GoalStatus::Active),
        "achieved" => Ok(GoalStatus::Achieved),
        other => bail!("unknown goal status: {other}"),
    }
}

fn narrative_kind(report: &NarrativeReport) -> &'static str {
    if report.is_fallback() {
        "fallback"
    } else {
        "generated"
    }
}

impl RecordStore for SqliteStore {
    fn observations_in(
        &self,
        subject_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ObservationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM observations
             WHERE subject_id = ?1 AND date >= ?2 AND date < ?3
             ORDER BY date, created_at, rowid",
        )?;
        let mut rows = stmt.query(params![subject_id, start.to_string(), end.to_string()])?;

        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(Self::row_to_observation(row)?);
        }
        Ok(results)
    }

    fn recent_observations(
        &self,
        subject_id: &str,
        limit: usize,
    ) -> Result<Vec<ObservationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM observations WHERE subject_id = ?1
             ORDER BY date DESC, created_at DESC, rowid DESC LIMIT ?2",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut rows = stmt.query(params![subject_id, limit])?;

        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(Self::row_to_observation(row)?);
        }
        results.reverse();
        Ok(results)
    }

    fn goals_for(&self, subject_id: &str) -> Result<Vec<Goal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject_id, text, status FROM goals WHERE subject_id = ? ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![subject_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut goals = Vec::new();
        for row in rows {
            let (id, subject_id, text, status) = row?;
            goals.push(Goal {
                id,
                subject_id,
                text,
                status: parse_status(&status)?,
                alignments: Vec::new(),
            });
        }
        Ok(goals)
    }

    fn alignments_for(&self, goal_id: &str) -> Result<Vec<GoalAlignment>> {
        let mut stmt = self.conn.prepare(
            "SELECT observation_id, score FROM goal_alignments WHERE goal_id = ? ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![goal_id], |row| {
            Ok(GoalAlignment {
                observation_id: row.get(0)?,
                score: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn insert_observation(&self, record: &ObservationRecord) -> Result<bool> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM observations WHERE id = ?",
                params![record.id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Ok(false);
        }

        let fields = &record.structured_fields;
        self.conn.execute(
            "INSERT INTO observations VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.id,
                record.subject_id,
                record.date.to_string(),
                record.created_at.to_rfc3339(),
                record.raw_text,
                narrative_kind(&record.narrative_report),
                record.narrative_report.text(),
                serde_json::to_string(&fields.strengths)?,
                serde_json::to_string(&fields.areas_of_development)?,
                serde_json::to_string(&fields.recommendations)?,
                fields.theme_of_day,
                fields.curiosity_seed,
            ],
        )?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn test_observation(id: &str, date: (i32, u32, u32), hour: u32) -> ObservationRecord {
        ObservationRecord {
            id: id.to_string(),
            subject_id: "child-1".to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            created_at: Utc
                .with_ymd_and_hms(date.0, date.1, date.2, hour, 0, 0)
                .unwrap(),
            raw_text: "built a tower".to_string(),
            narrative_report: NarrativeReport::Fallback("filler".to_string()),
            structured_fields: StructuredFields {
                strengths: vec!["focus".to_string()],
                theme_of_day: Some("Towers".to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_db_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(&dir.path().join("records.db")).unwrap();

        let record = test_observation("obs_1", (2025, 3, 4), 9);
        assert!(store.insert_observation(&record).unwrap());

        let retrieved = store.get_by_id("obs_1").unwrap().unwrap();
        assert_eq!(retrieved, record);
    }

    #[test]
    fn test_insert_is_append_only() {
        let store = SqliteStore::open_in_memory().unwrap();
        let record = test_observation("obs_1", (2025, 3, 4), 9);
        assert!(store.insert_observation(&record).unwrap());

        let mut changed = record.clone();
        changed.raw_text = "edited".to_string();
        assert!(!store.insert_observation(&changed).unwrap());
        assert_eq!(store.get_by_id("obs_1").unwrap().unwrap().raw_text, "built a tower");
    }

    #[test]
    fn test_observations_in_half_open_range() {
        let store = SqliteStore::open_in_memory().unwrap();
        for (id, date) in [
            ("feb", (2025, 2, 28)),
            ("first", (2025, 3, 1)),
            ("last", (2025, 3, 31)),
            ("april", (2025, 4, 1)),
        ] {
            store.insert_observation(&test_observation(id, date, 9)).unwrap();
        }

        let window = MonthWindow::new(2025, 3).unwrap();
        let found = store
            .observations_in("child-1", window.start(), window.end())
            .unwrap();
        let ids: Vec<_> = found.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "last"]);

        assert!(store
            .observations_in("child-2", window.start(), window.end())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_recent_observations_oldest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        for (id, date) in [("b", (2025, 3, 9)), ("a", (2025, 3, 2)), ("c", (2025, 4, 1))] {
            store.insert_observation(&test_observation(id, date, 9)).unwrap();
        }

        let recent = store.recent_observations("child-1", 2).unwrap();
        let ids: Vec<_> = recent.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert!(store.recent_observations("child-2", 5).unwrap().is_empty());
    }

    #[test]
    fn test_month_inputs_attach_alignments() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_observation(&test_observation("obs_1", (2025, 3, 4), 9))
            .unwrap();
        store
            .upsert_goal(&Goal {
                id: "g1".to_string(),
                subject_id: "child-1".to_string(),
                text: "Count to 20".to_string(),
                status: GoalStatus::Active,
                alignments: vec![GoalAlignment {
                    observation_id: "obs_1".to_string(),
                    score: 7.5,
                }],
            })
            .unwrap();

        let (observations, goals) = store
            .month_inputs("child-1", MonthWindow::new(2025, 3).unwrap())
            .unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].alignments[0].score, 7.5);
        assert_eq!(goals[0].status, GoalStatus::Active);
    }

    #[test]
    fn test_reimported_goal_keeps_its_position() {
        let store = SqliteStore::open_in_memory().unwrap();
        let goal = |id: &str, status| Goal {
            id: id.to_string(),
            subject_id: "child-1".to_string(),
            text: format!("Goal {id}"),
            status,
            alignments: Vec::new(),
        };
        store.upsert_goal(&goal("g1", GoalStatus::Active)).unwrap();
        store.upsert_goal(&goal("g2", GoalStatus::Active)).unwrap();
        store.upsert_goal(&goal("g1", GoalStatus::Achieved)).unwrap();

        let goals = store.goals_for("child-1").unwrap();
        let ids: Vec<_> = goals.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["g1", "g2"]);
        assert_eq!(goals[0].status, GoalStatus::Achieved);
    }
}
