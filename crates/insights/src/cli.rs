use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "insights")]
#[command(version)]
#[command(about = "Observation reports and monthly learning analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory, default config and record store
    Init,

    /// Import observation records (and optionally goals) from JSONL
    Import {
        /// Observation records, one JSON object per line
        #[arg(short, long)]
        file: PathBuf,

        /// Goals with their alignments, one JSON object per line
        #[arg(long)]
        goals: Option<PathBuf>,
    },

    /// Generate a daily report from session notes and store it
    Generate {
        /// Subject (child) identifier
        #[arg(long)]
        subject: String,

        /// Canonical name used in the report
        #[arg(long)]
        name: Option<String>,

        /// male, female or unspecified
        #[arg(long, default_value = "unspecified")]
        gender: String,

        /// Session date (YYYY-MM-DD); defaults to today in the organization timezone
        #[arg(long)]
        date: Option<String>,

        /// Notes file: typed text, or an OCR/transcript dump
        #[arg(long)]
        notes: PathBuf,

        /// Content type of the notes file
        #[arg(long, default_value = "text/plain")]
        mime: String,

        /// Notes are a conversation transcript; alternate observer and child lines
        #[arg(long)]
        transcript: bool,

        /// Skip the generation service and store a fallback report
        #[arg(long)]
        offline: bool,
    },

    /// Review an observer's listening in a conversation transcript
    Review {
        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value = "unspecified")]
        gender: String,

        /// Observer named in the review
        #[arg(long, default_value = "Observer")]
        observer: String,

        /// Transcript file
        #[arg(long)]
        notes: PathBuf,

        #[arg(long, default_value = "text/plain")]
        mime: String,

        /// Alternate observer and child lines before reviewing
        #[arg(long)]
        transcript: bool,

        #[arg(long)]
        offline: bool,

        /// Print the review as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest topics for the next session from stored observations
    Suggest {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value = "unspecified")]
        gender: String,

        /// How many of the latest observations to draw on
        #[arg(long, default_value_t = 10)]
        recent: usize,

        #[arg(long)]
        offline: bool,

        /// Print the suggestions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the monthly report for one subject
    Monthly {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value = "unspecified")]
        gender: String,

        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,

        /// Output artifact(s)
        #[arg(long, value_enum, default_value_t = ReportFormat::All)]
        format: ReportFormat,

        /// Skip the generation service and use the deterministic narrative
        #[arg(long)]
        offline: bool,

        /// Also print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the metrics recovered from a narrative file
    Extract {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Docx,
    Xlsx,
    Html,
    Txt,
    All,
}

impl ReportFormat {
    pub fn includes(self, other: ReportFormat) -> bool {
        self == ReportFormat::All || self == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::try_parse_from(["insights", "version"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Version));
    }

    #[test]
    fn test_cli_parse_import() {
        let cli = Cli::try_parse_from(["insights", "import", "--file", "obs.jsonl"]).unwrap();
        if let Commands::Import { file, goals } = cli.command {
            assert_eq!(file, PathBuf::from("obs.jsonl"));
            assert!(goals.is_none());
        } else {
            panic!("Expected Import command");
        }
    }

    #[test]
    fn test_cli_parse_monthly_defaults() {
        let cli = Cli::try_parse_from([
            "insights", "monthly", "--subject", "child-1", "--year", "2025", "--month", "3",
        ])
        .unwrap();
        if let Commands::Monthly {
            format, offline, name, ..
        } = cli.command
        {
            assert_eq!(format, ReportFormat::All);
            assert!(!offline);
            assert!(name.is_none());
        } else {
            panic!("Expected Monthly command");
        }
    }

    #[test]
    fn test_cli_parse_monthly_format() {
        let cli = Cli::try_parse_from([
            "insights", "monthly", "--subject", "c", "--year", "2025", "--month", "3", "--format",
            "xlsx",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Monthly {
                format: ReportFormat::Xlsx,
                ..
            }
        ));
    }

    #[test]
    fn test_cli_parse_generate_transcript() {
        let cli = Cli::try_parse_from([
            "insights", "generate", "--subject", "c", "--notes", "n.txt", "--transcript",
        ])
        .unwrap();
        if let Commands::Generate {
            transcript, mime, ..
        } = cli.command
        {
            assert!(transcript);
            assert_eq!(mime, "text/plain");
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn test_cli_parse_suggest_defaults() {
        let cli = Cli::try_parse_from(["insights", "suggest", "--subject", "c"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Suggest {
                recent: 10,
                json: false,
                ..
            }
        ));
    }

    #[test]
    fn test_cli_parse_review() {
        let cli = Cli::try_parse_from([
            "insights", "review", "--notes", "t.txt", "--observer", "Ms. Rao",
        ])
        .unwrap();
        if let Commands::Review {
            observer, transcript, ..
        } = cli.command
        {
            assert_eq!(observer, "Ms. Rao");
            assert!(!transcript);
        } else {
            panic!("Expected Review command");
        }
    }

    #[test]
    fn test_generate_requires_notes() {
        let cli = Cli::try_parse_from(["insights", "generate", "--subject", "child-1"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_format_includes() {
        assert!(ReportFormat::All.includes(ReportFormat::Docx));
        assert!(ReportFormat::Html.includes(ReportFormat::Html));
        assert!(!ReportFormat::Html.includes(ReportFormat::Xlsx));
        assert!(ReportFormat::All.includes(ReportFormat::Txt));
    }
}
