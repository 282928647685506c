//! Result Normalizer — decodes whatever shape the scoring service returned and
//! turns it into one ranked `AnalysisResultSet`.
//!
//! Three shapes are accepted at the boundary:
//! - the live API object (`job_title`, `results`, ...),
//! - the legacy mock array (`name`, `matchScore`, `status`, ...),
//! - an already canonical result set, so re-normalizing is a no-op.
//!
//! Nothing downstream of `normalize` sees the wire shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::analysis::{AnalysisResultSet, CandidateResult, Recommendation};

/// How many leading candidates get the "Top N" badge.
pub const TOP_N: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Wire shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LiveResponse {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub total_candidates: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub results: Vec<LiveCandidate>,
}

/// Failed entries may carry `null` in any field, so every field is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveCandidate {
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub match_score: Option<f64>,
    #[serde(default)]
    pub experience_years: Option<f64>,
    #[serde(default)]
    pub matching_skills: Option<Vec<String>>,
    #[serde(default)]
    pub missing_skills: Option<Vec<String>>,
    #[serde(default)]
    pub strengths: Option<Vec<String>>,
    #[serde(default)]
    pub weaknesses: Option<Vec<String>>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCandidate {
    // Never read, but required: it keeps unrelated arrays from decoding as this shape.
    #[allow(dead_code)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub job_role: String,
    #[serde(default)]
    pub experience: String,
    pub match_score: f64,
    #[serde(default)]
    pub skills: Vec<String>,
    pub status: String,
}

/// Tagged-variant decode of a scoring response.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAnalysisResponse {
    Live(LiveResponse),
    Legacy(Vec<LegacyCandidate>),
    Canonical(AnalysisResultSet),
}

/// Decodes a response body into one of the known shapes.
pub fn decode(body: &[u8]) -> Result<RawAnalysisResponse, serde_json::Error> {
    serde_json::from_slice(body)
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Produces the canonical, ranked result set.
///
/// `fallback_title` is used when the response carries no job title (legacy
/// shape, or a live response that omits it); `received_at` stands in for a
/// missing or unparseable timestamp.
pub fn normalize(
    raw: RawAnalysisResponse,
    fallback_title: &str,
    received_at: DateTime<Utc>,
) -> AnalysisResultSet {
    let (job_title, candidates, completed_at) = match raw {
        RawAnalysisResponse::Live(live) => {
            let completed_at = live
                .timestamp
                .as_deref()
                .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or(received_at);
            if let Some(reported) = live.total_candidates {
                if reported as usize != live.results.len() {
                    warn!(
                        "Scoring service reported {} candidates but returned {}",
                        reported,
                        live.results.len()
                    );
                }
            }
            let title = live
                .job_title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| fallback_title.to_string());
            let candidates = live.results.into_iter().map(from_live).collect();
            (title, candidates, completed_at)
        }
        RawAnalysisResponse::Legacy(records) => {
            let title = if fallback_title.trim().is_empty() {
                records
                    .first()
                    .map(|r| r.job_role.clone())
                    .unwrap_or_default()
            } else {
                fallback_title.to_string()
            };
            let candidates = records.into_iter().map(from_legacy).collect();
            (title, candidates, received_at)
        }
        RawAnalysisResponse::Canonical(set) => (set.job_title, set.candidates, set.completed_at),
    };

    let candidates = rank_candidates(candidates);
    AnalysisResultSet {
        job_title,
        total_candidates: candidates.len(),
        candidates,
        completed_at,
    }
}

/// Stable sort by score (descending) and dense 1-based ranks by position.
pub fn rank_candidates(mut candidates: Vec<CandidateResult>) -> Vec<CandidateResult> {
    candidates.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    for (position, candidate) in candidates.iter_mut().enumerate() {
        candidate.rank = position as u32 + 1;
    }
    candidates
}

fn from_live(c: LiveCandidate) -> CandidateResult {
    let name = c
        .candidate_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "Unknown candidate".to_string());
    let raw_recommendation = c.recommendation.unwrap_or_default();
    let recommendation = Recommendation::parse(&raw_recommendation).unwrap_or_else(|| {
        if !raw_recommendation.is_empty() {
            warn!("Unknown recommendation '{raw_recommendation}' for {name}, treating as review");
        }
        Recommendation::Review
    });
    CandidateResult {
        rank: 0,
        name,
        match_score: clamp_score(c.match_score.unwrap_or_default()),
        experience_years: c.experience_years.unwrap_or_default().max(0.0),
        matching_skills: dedup(c.matching_skills.unwrap_or_default()),
        missing_skills: dedup(c.missing_skills.unwrap_or_default()),
        strengths: c.strengths.unwrap_or_default(),
        weaknesses: c.weaknesses.unwrap_or_default(),
        recommendation,
        summary: c.summary.unwrap_or_default(),
        error: c.error.filter(|e| !e.trim().is_empty()),
    }
}

fn from_legacy(c: LegacyCandidate) -> CandidateResult {
    let recommendation = Recommendation::parse(&c.status).unwrap_or(Recommendation::Review);
    CandidateResult {
        rank: 0,
        name: c.name,
        match_score: clamp_score(c.match_score),
        experience_years: parse_experience_years(&c.experience),
        matching_skills: dedup(c.skills),
        missing_skills: Vec::new(),
        strengths: Vec::new(),
        weaknesses: Vec::new(),
        recommendation,
        summary: String::new(),
        error: None,
    }
}

fn clamp_score(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u8
}

/// Leading number of a label such as `"3 years"` or `"2.5 yrs"`; 0 when absent.
pub fn parse_experience_years(label: &str) -> f64 {
    let number: String = label
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number.parse::<f64>().unwrap_or(0.0)
}

/// Drops repeated skills, keeping the first occurrence (case-insensitive).
fn dedup(skills: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Display annotations
// ────────────────────────────────────────────────────────────────────────────

/// Severity band used to colour a score; plays no part in ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => ScoreBand::Excellent,
            80..=89 => ScoreBand::Good,
            70..=79 => ScoreBand::Fair,
            _ => ScoreBand::Poor,
        }
    }
}

/// A ranked candidate with its derived, non-persisted display flags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateView {
    #[serde(flatten)]
    pub candidate: CandidateResult,
    pub band: ScoreBand,
    /// `Some(n)` for the first `TOP_N` positions.
    pub top: Option<usize>,
    pub failed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSetView {
    pub job_title: String,
    pub total_candidates: usize,
    pub completed_at: DateTime<Utc>,
    pub candidates: Vec<CandidateView>,
}

pub fn to_view(set: &AnalysisResultSet) -> ResultSetView {
    let candidates = set
        .candidates
        .iter()
        .enumerate()
        .map(|(position, c)| CandidateView {
            candidate: c.clone(),
            band: ScoreBand::from_score(c.match_score),
            top: (position < TOP_N).then_some(position + 1),
            failed: c.is_failed(),
        })
        .collect();
    ResultSetView {
        job_title: set.job_title.clone(),
        total_candidates: set.total_candidates,
        completed_at: set.completed_at,
        candidates,
    }
}
