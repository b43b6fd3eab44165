use std::collections::HashSet;

use scangate_model::Finding;

/// Drop findings whose `(file, line, cwe-or-title)` was already seen.
///
/// The first occurrence wins and input order is preserved, so feeding the
/// router's registration-ordered concatenation gives reproducible output.
pub fn dedup_findings(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::with_capacity(findings.len());
    findings
        .into_iter()
        .filter(|finding| seen.insert(finding.dedup_key()))
        .collect()
}
