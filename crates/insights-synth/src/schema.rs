//! JSON shapes requested from the generation service

use crate::identity::Identity;
use crate::validator::ResponseSchema;
use chrono::NaiveDate;
use insights_core::{MonthlySummary, StructuredFields};
use serde::{Deserialize, Serialize};

/// Structured fields recovered from one session's notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFields {
    pub student_name: String,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    pub observations: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_of_development: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub theme_of_day: Option<String>,
    #[serde(default)]
    pub curiosity_seed: Option<String>,
}

impl SessionFields {
    /// Raw notes as the observation text, with no lists
    pub fn fallback(raw_text: &str, identity: &Identity, date: NaiveDate) -> Self {
        Self {
            student_name: identity.name.clone(),
            class_name: None,
            date: Some(date.to_string()),
            observations: raw_text.trim().to_string(),
            strengths: Vec::new(),
            areas_of_development: Vec::new(),
            recommendations: Vec::new(),
            theme_of_day: None,
            curiosity_seed: None,
        }
    }

    pub fn into_structured_fields(self) -> StructuredFields {
        let clean = |items: Vec<String>| -> Vec<String> {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };
        let clean_opt = |value: Option<String>| {
            value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        StructuredFields {
            strengths: clean(self.strengths),
            areas_of_development: clean(self.areas_of_development),
            recommendations: clean(self.recommendations),
            theme_of_day: clean_opt(self.theme_of_day),
            curiosity_seed: clean_opt(self.curiosity_seed),
        }
    }
}

impl ResponseSchema for SessionFields {}

/// Monthly narrative produced from an aggregated summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyNarrative {
    pub student_name: String,
    pub period: String,
    pub observations: String,
    pub strengths: Vec<String>,
    pub areas_of_development: Vec<String>,
    pub recommendations: Vec<String>,
    pub total_observations: usize,
    #[serde(default)]
    pub progress_insights: Vec<String>,
    #[serde(default)]
    pub learning_analytics: serde_json::Map<String, serde_json::Value>,
}

impl MonthlyNarrative {
    /// Deterministic narrative built only from the summary and identity
    pub fn fallback(summary: &MonthlySummary, identity: &Identity) -> Self {
        let name = &identity.name;
        let period = summary.window.label();
        let total = summary.total_observations;

        let mut strengths: Vec<String> = summary.top_strengths(8).map(String::from).collect();
        if strengths.is_empty() {
            strengths = vec!["Learning engagement".to_string(), "Curiosity".to_string()];
        }
        let mut areas_of_development: Vec<String> =
            summary.top_development_areas(6).map(String::from).collect();
        if areas_of_development.is_empty() {
            areas_of_development = vec!["Continued practice".to_string()];
        }

        let mut learning_analytics = serde_json::Map::new();
        if let Some(metrics) = &summary.learning_metrics {
            learning_analytics.insert(
                "engagementLevel".to_string(),
                metrics.consistency.as_str().into(),
            );
            learning_analytics.insert(
                "sessionFrequency".to_string(),
                metrics.session_frequency.into(),
            );
        }

        Self {
            student_name: name.clone(),
            period: period.clone(),
            observations: format!(
                "Monthly learning summary for {name} covering {total} observation sessions in {period}."
            ),
            strengths,
            areas_of_development,
            recommendations: vec![
                format!("Continue supporting {name}'s learning journey"),
                "Maintain current engagement strategies".to_string(),
                "Monitor progress in key development areas".to_string(),
            ],
            total_observations: total,
            progress_insights: vec![
                format!("{name} was observed in {total} sessions this month"),
                "Areas of strength are well established".to_string(),
                "Development areas show potential for growth".to_string(),
            ],
            learning_analytics,
        }
    }
}

impl ResponseSchema for MonthlyNarrative {
    fn check(&self) -> Result<(), String> {
        if self.student_name.trim().is_empty() {
            return Err("studentName is empty".to_string());
        }
        if self.observations.trim().is_empty() {
            return Err("observations is empty".to_string());
        }
        Ok(())
    }
}

/// One activity proposed for the next session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSuggestion {
    pub title: String,
    pub description: String,
    /// Which theme, curiosity or past session motivated it
    #[serde(default)]
    pub rationale: String,
}

/// Session planning help built from a subject's recent history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSuggestions {
    pub topics: Vec<TopicSuggestion>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub session_tip: String,
}

impl TopicSuggestions {
    /// Five general activities that need no history
    pub fn fallback(identity: &Identity) -> Self {
        let name = &identity.name;
        let topic = |title: &str, description: String| TopicSuggestion {
            title: title.to_string(),
            description,
            rationale: String::new(),
        };
        Self {
            topics: vec![
                topic(
                    "Creative Storytelling",
                    format!("Have {name} create and narrate a story using everyday objects"),
                ),
                topic(
                    "Nature Exploration",
                    "Observe and discuss plants, weather or seasonal changes".to_string(),
                ),
                topic(
                    "Math in Daily Life",
                    "Practice counting, sorting or measuring with household items".to_string(),
                ),
                topic(
                    "Science Experiments",
                    "Simple experiments using safe household materials".to_string(),
                ),
                topic(
                    "Cultural Learning",
                    "Explore traditions, festivals or geography through discussion".to_string(),
                ),
            ],
            focus_areas: vec![
                "Encourage curiosity and questioning".to_string(),
                "Build confidence through hands-on activities".to_string(),
                "Develop communication and expression skills".to_string(),
            ],
            session_tip: format!(
                "Start with what interests {name} most and build the lesson around {} \
                 natural curiosity!",
                identity.pronouns.possessive
            ),
        }
    }

    /// Plain-text rendering for the terminal
    pub fn to_text(&self) -> String {
        let mut text = String::from("🎯 SUGGESTED TOPICS FOR TODAY'S SESSION\n\n");
        for (i, topic) in self.topics.iter().enumerate() {
            text.push_str(&format!("{}. {} - {}\n", i + 1, topic.title, topic.description));
            if !topic.rationale.is_empty() {
                text.push_str(&format!("   Why: {}\n", topic.rationale));
            }
        }
        if !self.focus_areas.is_empty() {
            text.push_str("\n💡 FOCUS AREAS TO EMPHASIZE:\n");
            for area in &self.focus_areas {
                text.push_str(&format!("- {area}\n"));
            }
        }
        if !self.session_tip.is_empty() {
            text.push_str(&format!("\n🌟 SESSION TIP: {}\n", self.session_tip));
        }
        text
    }
}

impl ResponseSchema for TopicSuggestions {
    fn check(&self) -> Result<(), String> {
        if self.topics.is_empty() {
            return Err("topics is empty".to_string());
        }
        if self.topics.iter().any(|t| t.title.trim().is_empty()) {
            return Err("topic without a title".to_string());
        }
        Ok(())
    }
}

/// Advice, judgment or teaching where the observer should have listened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedFlag {
    pub issue: String,
    #[serde(default)]
    pub quote: Option<String>,
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rephrasing {
    pub instead_of: String,
    pub ask: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedOpportunity {
    pub moment: String,
    pub suggested_question: String,
}

/// Review of the observer's non-judgmental listening in one transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationReview {
    #[serde(default)]
    pub red_flags: Vec<RedFlag>,
    #[serde(default)]
    pub rephrasings: Vec<Rephrasing>,
    #[serde(default)]
    pub missed_opportunities: Vec<MissedOpportunity>,
    /// `None` when adherence could not be assessed
    #[serde(default)]
    pub adherent: Option<bool>,
    #[serde(default)]
    pub observer_improvement_areas: Vec<String>,
    pub impact_on_student: String,
    pub recommendation: String,
}

impl CommunicationReview {
    /// Makes no claims about the transcript; asks for a manual review
    pub fn fallback(identity: &Identity) -> Self {
        Self {
            red_flags: Vec::new(),
            rephrasings: Vec::new(),
            missed_opportunities: Vec::new(),
            adherent: None,
            observer_improvement_areas: Vec::new(),
            impact_on_student: format!(
                "No automated assessment of the impact on {} is available for this session.",
                identity.name
            ),
            recommendation: "Review this transcript manually for advice, judgment or teaching \
                             in place of open questions."
                .to_string(),
        }
    }

    /// Sectioned plain-text report
    pub fn to_text(&self, identity: &Identity, observer: &str) -> String {
        let name = &identity.name;
        let mut text = format!(
            "Analysis of Observer's Communication Style\n\
             Observer: {observer}\nStudent: {name}\n\n\
             1. Instances of Direct Advice, Judgment, or Teaching\n"
        );
        if self.red_flags.is_empty() {
            text.push_str("● None identified\n");
        }
        for flag in &self.red_flags {
            text.push_str(&format!("● 🚩 Red Flag: {}\n", flag.issue));
            if let Some(quote) = &flag.quote {
                text.push_str(&format!("○ Instance: \"{quote}\"\n"));
            }
            text.push_str(&format!("○ Analysis: {}\n", flag.analysis));
        }

        text.push_str("\n2. Suggested Rephrasing for Non-Judgmental Communication\n");
        for r in &self.rephrasings {
            text.push_str(&format!("○ Instead of: \"{}\"\n○ Ask: \"{}\"\n", r.instead_of, r.ask));
        }

        text.push_str("\n3. Missed Opportunities for Deeper Conversation\n");
        for m in &self.missed_opportunities {
            text.push_str(&format!(
                "○ Missed Opportunity: {}\n○ Suggested Question: \"{}\"\n",
                m.moment, m.suggested_question
            ));
        }

        let adherence = match self.adherent {
            Some(true) => "✅",
            Some(false) => "❌",
            None => "not assessed",
        };
        text.push_str(&format!(
            "\n4. Adherence to Non-Judgmental Listening: {adherence}\n\
             Red Flags: {}\n",
            if self.red_flags.is_empty() { "No" } else { "Yes" }
        ));

        text.push_str("\n5. Findings and Recommendations for Program Managers\n");
        if !self.observer_improvement_areas.is_empty() {
            text.push_str("Observer Improvement Areas\n");
            for area in &self.observer_improvement_areas {
                text.push_str(&format!("● {area}\n"));
            }
        }
        text.push_str(&format!(
            "Impact on the Student ({name})\n{}\nRecommendation: {}\n",
            self.impact_on_student, self.recommendation
        ));
        text
    }
}

impl ResponseSchema for CommunicationReview {
    fn check(&self) -> Result<(), String> {
        if self.recommendation.trim().is_empty() {
            return Err("recommendation is empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Gender;
    use crate::validator::conform;
    use insights_core::{summarize, MonthWindow};

    fn empty_summary() -> MonthlySummary {
        summarize(&[], &[], MonthWindow::new(2025, 3).unwrap())
    }

    #[test]
    fn test_monthly_fallback_defaults() {
        let identity = Identity::new(Some("Ava"), Gender::Female);
        let narrative = MonthlyNarrative::fallback(&empty_summary(), &identity);

        assert_eq!(narrative.strengths, vec!["Learning engagement", "Curiosity"]);
        assert_eq!(narrative.areas_of_development, vec!["Continued practice"]);
        assert_eq!(
            narrative.recommendations[0],
            "Continue supporting Ava's learning journey"
        );
        assert_eq!(narrative.period, "March 2025");
    }

    #[test]
    fn test_fallbacks_conform() {
        let identity = Identity::default();
        let monthly = MonthlyNarrative::fallback(&empty_summary(), &identity);
        let json = serde_json::to_string(&monthly).unwrap();
        assert_eq!(conform::<MonthlyNarrative>(&json).unwrap(), monthly);

        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let session = SessionFields::fallback("built a tower", &identity, date);
        let json = serde_json::to_string(&session).unwrap();
        assert_eq!(conform::<SessionFields>(&json).unwrap(), session);
    }

    #[test]
    fn test_monthly_requires_total() {
        let json = r#"{"studentName":"Ava","period":"March 2025","observations":"x",
            "strengths":[],"areasOfDevelopment":[],"recommendations":[]}"#;
        assert!(conform::<MonthlyNarrative>(json).is_err());
    }

    #[test]
    fn test_session_fields_cleaned() {
        let fields = SessionFields {
            student_name: "Ava".to_string(),
            class_name: None,
            date: None,
            observations: "x".to_string(),
            strengths: vec![" focus ".to_string(), "".to_string()],
            areas_of_development: vec![],
            recommendations: vec![],
            theme_of_day: Some("  ".to_string()),
            curiosity_seed: Some("Magnets".to_string()),
        }
        .into_structured_fields();
        assert_eq!(fields.strengths, vec!["focus"]);
        assert_eq!(fields.theme_of_day, None);
        assert_eq!(fields.curiosity_seed.as_deref(), Some("Magnets"));
    }

    #[test]
    fn test_topic_fallback_names_subject() {
        let identity = Identity::new(Some("Ava"), Gender::Female);
        let topics = TopicSuggestions::fallback(&identity);
        assert_eq!(topics.topics.len(), 5);
        assert!(topics.check().is_ok());

        let text = topics.to_text();
        assert!(text.contains("1. Creative Storytelling - Have Ava create"));
        assert!(text.contains("around her natural curiosity"));
    }

    #[test]
    fn test_topics_require_titles() {
        let json = r#"{"topics": []}"#;
        assert!(conform::<TopicSuggestions>(json).is_err());
        let json = r#"{"topics": [{"title": " ", "description": "x"}]}"#;
        assert!(conform::<TopicSuggestions>(json).is_err());
        let json = r#"{"topics": [{"title": "Leaf sorting", "description": "x"}]}"#;
        let topics = conform::<TopicSuggestions>(json).unwrap();
        assert!(topics.focus_areas.is_empty());
    }

    #[test]
    fn test_review_fallback_is_unassessed() {
        let identity = Identity::new(Some("Ava"), Gender::Female);
        let review = CommunicationReview::fallback(&identity);
        assert_eq!(review.adherent, None);

        let text = review.to_text(&identity, "Ms. Rao");
        assert!(text.contains("Observer: Ms. Rao"));
        assert!(text.contains("● None identified"));
        assert!(text.contains("Listening: not assessed"));
        assert!(text.contains("Impact on the Student (Ava)"));
    }

    #[test]
    fn test_review_lists_red_flags() {
        let json = r#"{"redFlags": [{"issue": "Gave the answer", "quote": "It's a magnet.",
            "analysis": "Closed the question"}], "adherent": false,
            "impactOnStudent": "Less exploration", "recommendation": "Ask first"}"#;
        let review = conform::<CommunicationReview>(json).unwrap();
        let text = review.to_text(&Identity::default(), "Observer");
        assert!(text.contains("● 🚩 Red Flag: Gave the answer"));
        assert!(text.contains("○ Instance: \"It's a magnet.\""));
        assert!(text.contains("Listening: ❌"));
        assert!(text.contains("Red Flags: Yes"));
    }
}
