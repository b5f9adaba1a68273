//! Canonical subject identity and its enforcement on generated text

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const DEFAULT_NAME: &str = "Student";

static HEADER_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn header_name_re() -> &'static Regex {
    // Label may be preceded by emoji or markdown; the rest of the line is the name
    HEADER_NAME_RE.get_or_init(|| {
        Regex::new(r"(?im)^(\W*(?:child['’]?s\s+name|student\s+name|student)\s*:\**)[^\n]*$").unwrap()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unspecified,
}

impl Gender {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" | "boy" => Gender::Male,
            "female" | "f" | "girl" => Gender::Female,
            _ => Gender::Unspecified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pronouns {
    pub subject: &'static str,
    pub object: &'static str,
    pub possessive: &'static str,
}

impl Pronouns {
    pub fn for_gender(gender: Gender) -> Self {
        match gender {
            Gender::Male => Self {
                subject: "he",
                object: "him",
                possessive: "his",
            },
            Gender::Female => Self {
                subject: "she",
                object: "her",
                possessive: "her",
            },
            Gender::Unspecified => Self {
                subject: "they",
                object: "them",
                possessive: "their",
            },
        }
    }
}

/// The only name and pronouns a generated report may use for its subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub name: String,
    pub pronouns: Pronouns,
}

impl Identity {
    pub fn new(name: Option<&str>, gender: Gender) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_NAME);
        Self {
            name: name.to_string(),
            pronouns: Pronouns::for_gender(gender),
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new(None, Gender::Unspecified)
    }
}

/// Rewrite every name header line of a narrative to the canonical name.
///
/// A transcript can carry other names spoken aloud; whatever the model put on
/// these lines is replaced.
pub fn enforce_identity(narrative: &str, identity: &Identity) -> String {
    header_name_re()
        .replace_all(narrative, |caps: &Captures| {
            format!("{} {}", &caps[1], identity.name)
        })
        .into_owned()
}
