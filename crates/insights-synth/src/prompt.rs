use crate::identity::Identity;
use chrono::NaiveDate;
use insights_core::{MonthlySummary, ObservationRecord};

const MAX_INPUT_CHARS: usize = 12_000;

/// Which output shape a prompt asks the model for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTemplate {
    /// Template-bound narrative the metric extractor reads
    DailyNarrative { session_date: NaiveDate },
    /// JSON matching [`crate::SessionFields`]
    SessionFields { session_date: NaiveDate },
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn identity_rules(identity: &Identity) -> String {
    let p = identity.pronouns;
    format!(
        "NAME AND PRONOUN RULES:\n\
         - The student's name is \"{name}\". Use exactly this name and no other.\n\
         - Names in the notes may belong to parents, siblings or friends. Never use any of them for the student.\n\
         - Refer to the student as \"{name}\" or with the pronouns {s}/{o}/{p} only.\n",
        name = identity.name,
        s = p.subject,
        o = p.object,
        p = p.possessive,
    )
}

/// Build the generation prompt for one session's notes
pub fn build_prompt(raw_text: &str, identity: &Identity, template: ReportTemplate) -> String {
    let notes = truncate(raw_text.trim());
    match template {
        ReportTemplate::DailyNarrative { session_date } => {
            daily_narrative_prompt(notes, identity, session_date)
        }
        ReportTemplate::SessionFields { session_date } => {
            session_fields_prompt(notes, identity, session_date)
        }
    }
}

fn daily_narrative_prompt(notes: &str, identity: &Identity, date: NaiveDate) -> String {
    let name = &identity.name;
    format!(
        "You are an educational observer writing a Daily Insights report for parents from the session notes below. \
         Be warm, specific and evidence-based. Justify every rating with its own reason.\n\n\
         {rules}\n\
         Follow this format exactly. Keep every label and the legend. Output the report only.\n\n\
         SESSION NOTES:\n{notes}\n\n\
         🧒 Child's Name: {name}\n\
         📅 Date: [{date}]\n\
         🌱 Curiosity Seed Explored: [from the notes]\n\n\
         📊 Growth Metrics & Observations\n\
         Growth Area | Rating | Observation Summary\n\
         🧠 Intellectual | [Excellent/Good/Fair/Needs Work] | [summary]\n\
         😊 Emotional | [Excellent/Good/Fair/Needs Work] | [summary]\n\
         🤝 Social | [Excellent/Good/Fair/Needs Work] | [summary]\n\
         🎨 Creativity | [Excellent/Good/Fair/Needs Work] | [summary]\n\
         🏃 Physical | [Excellent/Good/Fair/Needs Work] | [summary]\n\
         🧭 Character/Values | [Excellent/Good/Fair/Needs Work] | [summary]\n\
         🚀 Planning/Independence | [Excellent/Good/Fair/Needs Work] | [summary]\n\n\
         🗣️ Communication Skills & Thought Clarity\n\
         Confidence level: [Strong/Moderate/Weak]\n\
         Clarity of thought: [Clear/Moderate/Unclear]\n\
         Participation & Engagement: [Active/Moderate/Passive]\n\
         Sequence of explanation: [Logical/Moderate/Disorganized]\n\n\
         🌈 Engagement Index: [0-10]/10\n\
         [how {name} engaged with the curiosity seed]\n\n\
         🧠 Overall Growth Score: [X]/7 Areas Active\n\
         [next steps for {name}]\n\n\
         📣 Note for Parent:\n\
         [summary with actionable encouragement]\n\n\
         🟢 Legend\n\
         🟢 Excellent (7/7 areas) - Clear growth with strong evidence\n\
         💚 Good (5-6 areas) - Solid engagement with positive trends\n\
         ⚠️ Fair (3-4 areas) - Some engagement, needs encouragement\n\
         📈 Needs Work (1-2 areas) - Area not activated or underperforming today\n",
        rules = identity_rules(identity),
    )
}

fn session_fields_prompt(notes: &str, identity: &Identity, date: NaiveDate) -> String {
    format!(
        "Extract structured information from the observation notes below.\n\n\
         {rules}\n\
         Return only JSON with this structure:\n\
         {{\n\
           \"studentName\": \"{name}\",\n\
           \"className\": \"subject or class of the session\",\n\
           \"date\": \"{date}\",\n\
           \"observations\": \"detailed description of what was learned\",\n\
           \"strengths\": [\"short strength labels\"],\n\
           \"areasOfDevelopment\": [\"short development labels\"],\n\
           \"recommendations\": [\"actionable recommendations\"],\n\
           \"themeOfDay\": \"main theme of the day\",\n\
           \"curiositySeed\": \"what sparked the child's interest\"\n\
         }}\n\n\
         NOTES:\n{notes}\n",
        rules = identity_rules(identity),
        name = identity.name,
    )
}

/// Build the monthly narrative prompt from an aggregated summary
pub fn build_monthly_prompt(summary: &MonthlySummary, identity: &Identity) -> String {
    let period = summary.window.label();
    let strengths: Vec<&str> = summary.top_strengths(8).collect();
    let development: Vec<&str> = summary.top_development_areas(6).collect();
    let communication = serde_json::to_string(&summary.communication_summary).unwrap_or_default();
    let growth = serde_json::to_string(&summary.growth_summary).unwrap_or_default();
    let weekly = serde_json::to_string(&summary.weekly_trend).unwrap_or_default();
    let goals: Vec<String> = summary
        .goal_progress
        .iter()
        .map(|g| {
            format!(
                "{} (average {:.1}/10 over {} sessions)",
                g.goal_text, g.average_score, g.observation_count
            )
        })
        .collect();

    format!(
        "You are preparing a monthly learning progress report for parents.\n\n\
         {rules}\n\
         REPORTING PERIOD: {period}\n\
         STUDENT: {name}\n\
         TOTAL OBSERVATIONS: {total}\n\
         GOALS STATUS: {active} active, {achieved} achieved\n\
         GOAL PROGRESS: {goals:?}\n\
         COMMUNICATION SKILLS SUMMARY: {communication}\n\
         GROWTH METRICS SUMMARY: {growth}\n\
         STRENGTHS IDENTIFIED: {strengths:?}\n\
         DEVELOPMENT AREAS: {development:?}\n\
         WEEKLY TRENDS: {weekly}\n\n\
         Return only JSON with this structure:\n\
         {{\n\
           \"studentName\": \"{name}\",\n\
           \"period\": \"{period}\",\n\
           \"observations\": \"narrative summary of the month's learning journey\",\n\
           \"strengths\": [\"...\"],\n\
           \"areasOfDevelopment\": [\"...\"],\n\
           \"recommendations\": [\"specific actionable recommendations for next month\"],\n\
           \"totalObservations\": {total},\n\
           \"progressInsights\": [\"key breakthroughs and patterns\"],\n\
           \"learningAnalytics\": {{\"engagementLevel\": \"High/Medium/Low\"}}\n\
         }}\n",
        rules = identity_rules(identity),
        name = identity.name,
        total = summary.total_observations,
        active = summary.goal_status.active,
        achieved = summary.goal_status.achieved,
    )
}

/// Most recent distinct items, newest last
fn recent_distinct<'a>(items: impl Iterator<Item = &'a str>, keep: usize) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for item in items.filter(|s| !s.trim().is_empty()) {
        seen.retain(|s| *s != item);
        seen.push(item);
    }
    let skip = seen.len().saturating_sub(keep);
    seen.split_off(skip)
}

fn or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "None available".to_string()
    } else {
        items.join(", ")
    }
}

/// Build the session-planning prompt from a subject's history, oldest first
pub fn build_topic_prompt(history: &[ObservationRecord], identity: &Identity) -> String {
    let fields = || history.iter().map(|o| &o.structured_fields);
    let themes = recent_distinct(fields().filter_map(|f| f.theme_of_day.as_deref()), 8);
    let curiosities = recent_distinct(fields().filter_map(|f| f.curiosity_seed.as_deref()), 5);
    let strengths = recent_distinct(
        fields().flat_map(|f| f.strengths.iter().take(3).map(String::as_str)),
        10,
    );
    let development = recent_distinct(
        fields().flat_map(|f| f.areas_of_development.iter().take(2).map(String::as_str)),
        8,
    );
    let patterns: Vec<String> = history[history.len().saturating_sub(3)..]
        .iter()
        .map(|o| {
            let excerpt: String = o.raw_text.chars().take(150).collect();
            format!("- {}: {excerpt}", o.date)
        })
        .collect();
    let patterns = if patterns.is_empty() {
        "None available".to_string()
    } else {
        patterns.join("\n")
    };

    format!(
        "You are an educational consultant helping an observer plan an engaging session \
         with {name}. Suggest 5-7 specific, actionable topics or activities for today, each \
         with a rationale naming the theme, curiosity or past session that informed it.\n\n\
         {rules}\n\
         LEARNING HISTORY:\n\
         Recent themes: {themes}\n\
         Curiosity seeds: {curiosities}\n\
         Observed strengths: {strengths}\n\
         Areas for development: {development}\n\
         Recent sessions:\n{patterns}\n\n\
         GUIDELINES:\n\
         1. Build on previous themes with fresh perspectives\n\
         2. Address development areas through engaging activities\n\
         3. Use {possessive} demonstrated strengths and interests\n\
         4. Mix academic, creative, social-emotional and practical life skills\n\
         5. Each topic must fit a 30-45 minute session held over a voice call\n\n\
         Return only JSON with this structure:\n\
         {{\n\
           \"topics\": [{{\"title\": \"...\", \"description\": \"activity and learning objective\", \
         \"rationale\": \"which past report motivated it\"}}],\n\
           \"focusAreas\": [\"strength to build on\", \"area to address\", \"curiosity to explore\"],\n\
           \"sessionTip\": \"one practical tip for today\"\n\
         }}\n",
        name = identity.name,
        rules = identity_rules(identity),
        themes = or_none(&themes),
        curiosities = or_none(&curiosities),
        strengths = or_none(&strengths),
        development = or_none(&development),
        possessive = identity.pronouns.possessive,
    )
}

/// Build the prompt reviewing an observer's listening in one transcript
pub fn build_review_prompt(transcript: &str, identity: &Identity, observer: &str) -> String {
    format!(
        "You are assessing an observer-student conversation for educational quality. \
         Observers should listen without judging or teaching.\n\n\
         {rules}\n\
         OBSERVER: {observer}\n\
         TRANSCRIPT:\n{transcript}\n\n\
         Identify direct advice, judgment or teaching (quote the transcript), suggest \
         non-judgmental rephrasings, list missed chances to explore what {name} shared, and \
         state whether the observer adhered to non-judgmental listening.\n\n\
         Return only JSON with this structure:\n\
         {{\n\
           \"redFlags\": [{{\"issue\": \"...\", \"quote\": \"exact words\", \"analysis\": \"impact\"}}],\n\
           \"rephrasings\": [{{\"insteadOf\": \"...\", \"ask\": \"...\"}}],\n\
           \"missedOpportunities\": [{{\"moment\": \"...\", \"suggestedQuestion\": \"...\"}}],\n\
           \"adherent\": true,\n\
           \"observerImprovementAreas\": [\"...\"],\n\
           \"impactOnStudent\": \"how the style affects {name}\",\n\
           \"recommendation\": \"specific actionable recommendation\"\n\
         }}\n",
        rules = identity_rules(identity),
        transcript = truncate(transcript.trim()),
        name = identity.name,
    )
}
