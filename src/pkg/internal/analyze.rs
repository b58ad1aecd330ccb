use std::sync::Arc;
use std::time::Duration;

use ai::{
    chat_completions::{ChatCompletion, ChatCompletionMessage, ChatCompletionRequestBuilder},
    clients::openai::Client,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use standard_error::StandardError;

use crate::{conf::Settings, prelude::Result};

/// Score used for whole-report fallbacks (call or parse failure).
pub const DEFAULT_FALLBACK_SCORE: i32 = 50;
/// Score used when a single numeric field is missing from an otherwise
/// parseable response.
pub const DEFAULT_FIELD_SCORE: i32 = 60;

const CALL_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub strength_score: i32,
    pub ats_score: i32,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub suggested_skills: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl AnalysisReport {
    /// Report stored when no AI credentials are configured. Signals
    /// "feature off" rather than "call failed".
    pub fn disabled() -> Self {
        AnalysisReport {
            strength_score: 0,
            ats_score: 0,
            strengths: vec![],
            improvements: vec!["AI analysis unavailable - API key not configured".into()],
            suggested_skills: vec![],
            recommendations: vec![],
        }
    }

    /// Entry-level-friendly report stored when the analysis call fails.
    pub fn fallback() -> Self {
        AnalysisReport {
            strength_score: DEFAULT_FALLBACK_SCORE,
            ats_score: DEFAULT_FALLBACK_SCORE,
            strengths: vec![
                "Resume uploaded successfully".into(),
                "Document is readable and well-formatted".into(),
                "Good start for an entry-level resume".into(),
            ],
            improvements: vec![
                "Add quantifiable achievements (e.g., \"Led team of 5 students\")".into(),
                "Include relevant coursework or academic projects".into(),
                "Add technical skills relevant to your target role".into(),
                "Consider adding links to GitHub or portfolio".into(),
                "Use action verbs (e.g., \"Developed\", \"Implemented\", \"Led\")".into(),
            ],
            suggested_skills: [
                "Python",
                "JavaScript",
                "Git",
                "React",
                "SQL",
                "Communication",
                "Teamwork",
                "Problem Solving",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            recommendations: vec![
                "For students: academic projects count as experience!".into(),
                "Add your GPA if it's above 3.0".into(),
                "Include relevant coursework for your field".into(),
                "Join GitHub and showcase your projects".into(),
                "Consider free certifications (Coursera, Google, AWS)".into(),
            ],
        }
    }

    /// Report stored when the AI responded but returned nothing parseable.
    pub fn parse_failed() -> Self {
        AnalysisReport {
            strength_score: DEFAULT_FALLBACK_SCORE,
            ats_score: DEFAULT_FALLBACK_SCORE,
            strengths: vec![],
            improvements: vec![
                "AI response could not be parsed into a structured report".into(),
            ],
            suggested_skills: vec![],
            recommendations: vec![],
        }
    }
}

/// Every way an analysis attempt can end. All variants normalize to a
/// well-formed `AnalysisReport`; none of them is an error to the caller.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Disabled,
    CallFailed(String),
    ParseFailed,
    Ok(AnalysisReport),
}

impl AnalysisOutcome {
    pub fn into_report(self) -> AnalysisReport {
        match self {
            AnalysisOutcome::Disabled => AnalysisReport::disabled(),
            AnalysisOutcome::CallFailed(_) => AnalysisReport::fallback(),
            AnalysisOutcome::ParseFailed => AnalysisReport::parse_failed(),
            AnalysisOutcome::Ok(report) => report,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResumeAnalyzer {
    client: Option<Arc<Client>>,
    model: String,
}

impl ResumeAnalyzer {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = if settings.ai_key.is_empty() {
            tracing::warn!("ai_key not configured, resume analysis disabled");
            None
        } else {
            let client = Client::from_url(&settings.ai_key, &settings.ai_endpoint)
                .map_err(|_| StandardError::new("ERR-AI-000"))?;
            Some(Arc::new(client))
        };
        Ok(ResumeAnalyzer {
            client,
            model: settings.ai_model.clone(),
        })
    }

    pub fn disabled() -> Self {
        ResumeAnalyzer {
            client: None,
            model: String::new(),
        }
    }

    pub async fn analyze(&self, text: &str) -> AnalysisOutcome {
        let client = match &self.client {
            Some(client) => client,
            None => return AnalysisOutcome::Disabled,
        };
        let request = match ChatCompletionRequestBuilder::default()
            .model(&self.model)
            .messages(vec![ChatCompletionMessage::User(scoring_prompt(text).into())])
            .build()
        {
            Ok(request) => request,
            Err(e) => return AnalysisOutcome::CallFailed(e.to_string()),
        };
        let response =
            match tokio::time::timeout(CALL_TIMEOUT, client.chat_completions(&request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => return AnalysisOutcome::CallFailed(e.to_string()),
                Err(_) => return AnalysisOutcome::CallFailed("analysis call timed out".into()),
            };
        let content = match response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
        {
            Some(content) => content,
            None => return AnalysisOutcome::CallFailed("empty completion".into()),
        };
        match parse_report(&content) {
            Some(report) => AnalysisOutcome::Ok(report),
            None => AnalysisOutcome::ParseFailed,
        }
    }
}

fn scoring_prompt(text: &str) -> String {
    format!(
        r#"You are an expert career coach and resume analyst. Analyze the following resume and provide:

1. Overall strength score (0-100)
2. Key strengths (list 3-5 points)
3. Areas for improvement (list 3-5 points)
4. Suggested skills to add
5. ATS (Applicant Tracking System) compatibility score (0-100)
6. Industry-specific recommendations

Treat academic projects, coursework and internships as valid experience; this
service is aimed at students and entry-level candidates.

Resume content:
{}

Return ONLY a single valid JSON object with exactly these keys:
strengthScore, strengths, improvements, suggestedSkills, atsScore, recommendations.
strengthScore and atsScore are numbers between 0 and 100, the rest are arrays of
strings. No markdown code blocks, no explanations, no trailing commas."#,
        text
    )
}

/// Locates the first top-level JSON object span in the response and parses
/// it. Missing or mis-shaped fields are defaulted individually; only a
/// completely unparseable response yields `None`.
fn parse_report(raw: &str) -> Option<AnalysisReport> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    let value: Value = serde_json::from_str(&raw[start..=end]).ok()?;
    Some(report_from_value(&value))
}

fn report_from_value(value: &Value) -> AnalysisReport {
    AnalysisReport {
        strength_score: score_field(value, "strengthScore"),
        ats_score: score_field(value, "atsScore"),
        strengths: list_field(value, "strengths"),
        improvements: list_field(value, "improvements"),
        suggested_skills: list_field(value, "suggestedSkills"),
        recommendations: list_field(value, "recommendations"),
    }
}

fn score_field(value: &Value, key: &str) -> i32 {
    value
        .get(key)
        .and_then(Value::as_f64)
        .map(|score| (score.round() as i32).clamp(0, 100))
        .unwrap_or(DEFAULT_FIELD_SCORE)
}

fn list_field(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_fenced_response() {
        let raw = r#"Here is the assessment:
```json
{"strengthScore": 82, "atsScore": 74.4, "strengths": ["clear layout"],
 "improvements": ["add metrics"], "suggestedSkills": ["Docker"],
 "recommendations": ["tailor per role"]}
```"#;
        let report = parse_report(raw).expect("report expected");
        assert_eq!(report.strength_score, 82);
        assert_eq!(report.ats_score, 74);
        assert_eq!(report.strengths, vec!["clear layout".to_string()]);
        assert_eq!(report.suggested_skills, vec!["Docker".to_string()]);
    }

    #[test]
    fn test_missing_fields_are_defaulted_individually() {
        let report = parse_report(r#"{"strengths": ["concise"]}"#).expect("report expected");
        assert_eq!(report.strength_score, DEFAULT_FIELD_SCORE);
        assert_eq!(report.ats_score, DEFAULT_FIELD_SCORE);
        assert_eq!(report.strengths, vec!["concise".to_string()]);
        assert!(report.improvements.is_empty());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_mis_shaped_fields_are_defaulted() {
        let raw = r#"{"strengthScore": "eighty", "strengths": "not a list",
                      "atsScore": 150, "improvements": [1, "real advice", 2]}"#;
        let report = parse_report(raw).expect("report expected");
        assert_eq!(report.strength_score, DEFAULT_FIELD_SCORE);
        assert_eq!(report.ats_score, 100);
        assert!(report.strengths.is_empty());
        assert_eq!(report.improvements, vec!["real advice".to_string()]);
    }

    #[test]
    fn test_scores_clamped_to_range() {
        let report =
            parse_report(r#"{"strengthScore": -12, "atsScore": 420}"#).expect("report expected");
        assert_eq!(report.strength_score, 0);
        assert_eq!(report.ats_score, 100);
    }

    #[test]
    fn test_unparseable_response_is_none() {
        assert!(parse_report("no json here").is_none());
        assert!(parse_report("{broken json").is_none());
        assert!(parse_report("}{").is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_analyzer_reports_disabled() {
        let analyzer = ResumeAnalyzer::disabled();
        let outcome = analyzer.analyze("some resume text").await;
        assert!(matches!(outcome, AnalysisOutcome::Disabled));
        let report = outcome.into_report();
        assert_eq!(report.strength_score, 0);
        assert_eq!(report.improvements.len(), 1);
        assert!(report.improvements[0].contains("unavailable"));
    }

    #[test]
    fn test_call_failure_normalizes_to_fallback() {
        let report = AnalysisOutcome::CallFailed("connection refused".into()).into_report();
        assert_eq!(report.strength_score, DEFAULT_FALLBACK_SCORE);
        assert_eq!(report.ats_score, DEFAULT_FALLBACK_SCORE);
        assert!(!report.improvements.is_empty());
        assert!(!report.suggested_skills.is_empty());
    }

    #[test]
    fn test_parse_failure_normalizes_to_defaults() {
        let report = AnalysisOutcome::ParseFailed.into_report();
        assert_eq!(report.strength_score, DEFAULT_FALLBACK_SCORE);
        assert!(report.improvements[0].contains("could not be parsed"));
    }

    #[test]
    fn test_every_outcome_stays_in_score_bounds() {
        let outcomes = vec![
            AnalysisOutcome::Disabled,
            AnalysisOutcome::CallFailed("x".into()),
            AnalysisOutcome::ParseFailed,
            AnalysisOutcome::Ok(parse_report(r#"{"strengthScore": 95}"#).unwrap()),
        ];
        for outcome in outcomes {
            let report = outcome.into_report();
            assert!((0..=100).contains(&report.strength_score));
            assert!((0..=100).contains(&report.ats_score));
        }
    }
}
