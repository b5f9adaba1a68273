//! JSONL record files and atomic artifact writes

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Append one record as a JSON line, creating parent directories as needed
pub fn append_jsonl<T: Serialize>(path: &Path, record: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let json = serde_json::to_string(record)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

/// Read every well-formed record from a JSONL file.
///
/// A missing file reads as empty. Blank lines are ignored and lines that do not
/// deserialize into `T` are skipped, so one bad row never blocks an import.
pub fn read_jsonl<T: for<'de> Deserialize<'de>>(path: &Path) -> std::io::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                tracing::debug!(line = line_no + 1, error = %e, "skipping malformed record");
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(path = %path.display(), skipped, "skipped malformed JSONL lines");
    }

    Ok(records)
}

/// Write data atomically using temp file + rename
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, data)?;
    std::fs::rename(temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Note {
        id: u32,
        subject: String,
    }

    #[test]
    fn test_jsonl_append_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.jsonl");

        let notes = vec![
            Note {
                id: 1,
                subject: "child-1".to_string(),
            },
            Note {
                id: 2,
                subject: "child-2".to_string(),
            },
        ];
        for note in &notes {
            append_jsonl(&file, note).unwrap();
        }

        let read_back: Vec<Note> = read_jsonl(&file).unwrap();
        assert_eq!(notes, read_back);
    }

    #[test]
    fn test_read_jsonl_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mixed.jsonl");
        std::fs::write(
            &file,
            "{\"id\":1,\"subject\":\"a\"}\nnot json\n\n{\"id\":2}\n{\"id\":3,\"subject\":\"c\"}\n",
        )
        .unwrap();

        let notes: Vec<Note> = read_jsonl(&file).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1].id, 3);
    }

    #[test]
    fn test_read_jsonl_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let notes: Vec<Note> = read_jsonl(&dir.path().join("absent.jsonl")).unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn test_atomic_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("reports").join("march.html");

        atomic_write(&target, b"<html></html>").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"<html></html>");
        assert!(!target.with_extension("tmp").exists());
    }
}
