//! CSV export of a ranked result set.

use anyhow::Result;

use crate::models::analysis::AnalysisResultSet;

pub const CSV_HEADER: [&str; 8] = [
    "Rank",
    "Name",
    "Match Score",
    "Experience",
    "Recommendation",
    "Matching Skills",
    "Missing Skills",
    "Summary",
];

/// Serializes candidates in their ranked order. Fields containing commas,
/// quotes or newlines are quoted.
pub fn to_delimited_text(set: &AnalysisResultSet) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;
    for c in &set.candidates {
        wtr.write_record([
            format!("#{}", c.rank),
            c.name.clone(),
            format!("{}%", c.match_score),
            format!("{} years", c.experience_years),
            c.recommendation.as_str().to_string(),
            c.matching_skills.join("; "),
            c.missing_skills.join("; "),
            c.summary.clone(),
        ])?;
    }
    let data = wtr.into_inner()?;
    Ok(String::from_utf8(data)?)
}

/// `resume-analysis-<job title>.csv`, each whitespace run replaced by `-`.
pub fn export_filename(job_title: &str) -> String {
    let mut slug = String::with_capacity(job_title.len());
    let mut in_whitespace = false;
    for ch in job_title.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            if !matches!(ch, '"' | '/' | '\\') && !ch.is_control() {
                slug.push(ch);
            }
        }
    }
    format!("resume-analysis-{slug}.csv")
}
