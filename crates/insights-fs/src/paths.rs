//! Path resolution for the insights data directory

use std::path::PathBuf;

/// Environment variable that relocates the data directory
pub const HOME_ENV: &str = "INSIGHTS_HOME";

/// Resolves standard paths inside the data directory
#[derive(Debug, Clone)]
pub struct Paths {
    pub root: PathBuf,
}

impl Paths {
    /// Resolve the data directory: `$INSIGHTS_HOME` when set, else `~/.insights`
    pub fn new() -> std::io::Result<Self> {
        if let Some(custom) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::at(PathBuf::from(custom)));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;

        Ok(Self::at(home.join(".insights")))
    }

    /// Use an explicit root directory
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get config.json path
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Get the SQLite record store path
    pub fn records_db(&self) -> PathBuf {
        self.root.join("records.db")
    }

    /// Get the directory rendered artifacts are written to
    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    /// Get the output path for one artifact of a subject's monthly report
    pub fn report_file(&self, subject_id: &str, year: i32, month: u32, ext: &str) -> PathBuf {
        let safe_subject = subject_id.replace(['/', '\\', '.', ' '], "-");
        self.reports_dir()
            .join(format!("{}_{}-{:02}.{}", safe_subject, year, month, ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_paths_respect_env_override() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var(HOME_ENV, dir.path());

        let paths = Paths::new().unwrap();
        assert_eq!(paths.root, dir.path());

        std::env::remove_var(HOME_ENV);
    }

    #[test]
    #[serial]
    fn test_paths_default_under_home() {
        std::env::remove_var(HOME_ENV);
        let paths = Paths::new().unwrap();
        assert!(paths.root.ends_with(".insights"));
    }

    #[test]
    fn test_standard_files() {
        let paths = Paths::at("/data");
        assert!(paths.config_file().ends_with("config.json"));
        assert!(paths.records_db().ends_with("records.db"));
        assert!(paths.reports_dir().ends_with("reports"));
    }

    #[test]
    fn test_report_file_sanitizes_subject() {
        let paths = Paths::at("/data");
        let file = paths.report_file("kids/ava.b", 2025, 3, "xlsx");
        assert!(file.ends_with("kids-ava-b_2025-03.xlsx"));
    }
}
