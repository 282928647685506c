use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The scoring service's categorical verdict on a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Qualified,
    Review,
    Rejected,
}

impl Recommendation {
    /// Lenient parse of the free-form verdicts the live service emits.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw
            .trim()
            .to_ascii_lowercase()
            .replace(|c: char| c == '_' || c == '-', " ");
        match normalized.as_str() {
            "qualified" | "recommended" | "strong match" => Some(Self::Qualified),
            "review" | "under review" | "maybe" | "consider" => Some(Self::Review),
            "rejected" | "not qualified" | "not recommended" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qualified => "qualified",
            Self::Review => "review",
            Self::Rejected => "rejected",
        }
    }
}

/// One candidate's analysis outcome, independent of the schema it arrived in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResult {
    pub rank: u32,
    pub name: String,
    pub match_score: u8,
    pub experience_years: f64,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    pub recommendation: Recommendation,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CandidateResult {
    /// True when the service reported a per-candidate failure.
    pub fn is_failed(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

/// A full, ranked analysis for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResultSet {
    pub job_title: String,
    pub total_candidates: usize,
    pub candidates: Vec<CandidateResult>,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_parse_variants() {
        assert_eq!(Recommendation::parse("Qualified"), Some(Recommendation::Qualified));
        assert_eq!(Recommendation::parse("under_review"), Some(Recommendation::Review));
        assert_eq!(Recommendation::parse(" Not Qualified "), Some(Recommendation::Rejected));
        assert_eq!(Recommendation::parse("rejected"), Some(Recommendation::Rejected));
        assert_eq!(Recommendation::parse("???"), None);
    }

    #[test]
    fn test_failed_requires_non_empty_error() {
        let mut c = CandidateResult {
            rank: 1,
            name: "a".to_string(),
            match_score: 50,
            experience_years: 1.0,
            matching_skills: vec![],
            missing_skills: vec![],
            strengths: vec![],
            weaknesses: vec![],
            recommendation: Recommendation::Review,
            summary: String::new(),
            error: None,
        };
        assert!(!c.is_failed());
        c.error = Some("  ".to_string());
        assert!(!c.is_failed());
        c.error = Some("could not read file".to_string());
        assert!(c.is_failed());
    }

    #[test]
    fn test_canonical_json_is_camel_case() {
        let c = CandidateResult {
            rank: 1,
            name: "a".to_string(),
            match_score: 50,
            experience_years: 2.5,
            matching_skills: vec!["Rust".to_string()],
            missing_skills: vec![],
            strengths: vec![],
            weaknesses: vec![],
            recommendation: Recommendation::Qualified,
            summary: String::new(),
            error: None,
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["matchScore"], 50);
        assert_eq!(json["experienceYears"], 2.5);
        assert_eq!(json["recommendation"], "qualified");
        assert!(json.get("error").is_none());
    }
}
