use std::fmt;

use scangate_model::{Finding, Profile, Severity, SeverityCounts};
use serde::{Deserialize, Serialize};

const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GateStatus::Pass => "pass",
            GateStatus::Warn => "warn",
            GateStatus::Fail => "fail",
        };
        f.write_str(label)
    }
}

/// Summary grade for a finding set under one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityScore {
    pub score: u32,
    pub grade: String,
    pub status: GateStatus,
    pub profile: String,
    pub total_findings: usize,
    pub counts: SeverityCounts,
}

impl SecurityScore {
    pub fn compute(findings: &[Finding], profile: &Profile) -> Self {
        let counts = SeverityCounts::tally(findings.iter().map(|f| &f.severity));
        let score = score_from_counts(&counts);

        let thresholds = profile.severity_thresholds;
        let status = if findings.iter().any(|f| f.severity.meets(thresholds.error)) {
            GateStatus::Fail
        } else if findings.iter().any(|f| f.severity.meets(thresholds.warn)) {
            GateStatus::Warn
        } else {
            GateStatus::Pass
        };

        Self {
            score,
            grade: grade(score).to_string(),
            status,
            profile: profile.name.clone(),
            total_findings: findings.len(),
            counts,
        }
    }
}

/// 100 minus the summed per-severity penalties, floored at 0.
fn score_from_counts(counts: &SeverityCounts) -> u32 {
    let penalty = Severity::ALL.iter().fold(0u64, |total, &severity| {
        let count = u64::try_from(counts.get(severity)).unwrap_or(u64::MAX);
        total.saturating_add(u64::from(penalty(severity)).saturating_mul(count))
    });
    let score = u64::from(MAX_SCORE).saturating_sub(penalty);
    u32::try_from(score).unwrap_or(0)
}

fn penalty(severity: Severity) -> u32 {
    match severity {
        Severity::Critical => 25,
        Severity::High => 10,
        Severity::Medium => 5,
        Severity::Low => 2,
        Severity::Info => 0,
    }
}

fn grade(score: u32) -> &'static str {
    match score {
        90.. => "A",
        80..=89 => "B",
        70..=79 => "C",
        60..=69 => "D",
        _ => "F",
    }
}
