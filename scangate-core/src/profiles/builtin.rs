//! Compliance profiles shipped with the gateway.

use scangate_model::{Profile, Severity, SeverityThresholds};
use serde_json::{Map, Value, json};

pub const STANDARD: &str = "standard";
pub const HARDENED: &str = "hardened";
pub const OWASP: &str = "owasp";
pub const SOC2: &str = "soc2";
pub const PCI_DSS: &str = "pci-dss";
pub const HIPAA: &str = "hipaa";

/// Name reserved for the project-local override.
pub const CUSTOM: &str = "custom";

const BUILTIN_VERSION: &str = "1.0.0";

const COPYLEFT: &[&str] = &["GPL-2.0", "GPL-3.0", "AGPL-3.0"];

pub fn builtin_profiles() -> Vec<Profile> {
    vec![standard(), hardened(), owasp(), soc2(), pci_dss(), hipaa()]
}

fn profile(
    name: &str,
    description: &str,
    error: Severity,
    warn: Severity,
    rules: Value,
) -> Profile {
    Profile {
        name: name.to_string(),
        version: BUILTIN_VERSION.to_string(),
        description: description.to_string(),
        severity_thresholds: SeverityThresholds { error, warn },
        rules: match rules {
            Value::Object(map) => map,
            _ => Map::new(),
        },
    }
}

pub(crate) fn standard() -> Profile {
    profile(
        STANDARD,
        "Balanced defaults for everyday development",
        Severity::High,
        Severity::Medium,
        json!({
            "sast": {
                "enabled": true,
                "rulesets": ["security-audit", "secrets"],
                "custom_rules": []
            },
            "sca": { "enabled": true, "max_cvss": 7.0, "include_dev": false },
            "secrets": { "enabled": true, "entropy_threshold": 4.5, "patterns": [] },
            "iac": { "enabled": true, "frameworks": ["terraform", "kubernetes", "dockerfile"] },
            "container": { "enabled": true, "max_cvss": 7.0, "ignore_unfixed": true },
            "dast": { "enabled": false, "active_scan": false, "max_depth": 3 },
            "license": { "enabled": true, "blocked": ["AGPL-3.0"] },
            "posture": { "enabled": true, "checks": ["authentication", "transport"] }
        }),
    )
}

fn hardened() -> Profile {
    profile(
        HARDENED,
        "Strict settings that fail on medium severity and above",
        Severity::Medium,
        Severity::Low,
        json!({
            "sast": {
                "enabled": true,
                "rulesets": ["security-audit", "secrets", "insecure-transport", "command-injection"],
                "custom_rules": []
            },
            "sca": { "enabled": true, "max_cvss": 4.0, "include_dev": true },
            "secrets": { "enabled": true, "entropy_threshold": 3.5, "patterns": [] },
            "iac": {
                "enabled": true,
                "frameworks": ["terraform", "kubernetes", "dockerfile", "cloudformation", "helm"]
            },
            "container": { "enabled": true, "max_cvss": 4.0, "ignore_unfixed": false },
            "dast": { "enabled": true, "active_scan": true, "max_depth": 5 },
            "license": { "enabled": true, "blocked": COPYLEFT },
            "posture": {
                "enabled": true,
                "checks": ["authentication", "transport", "rate_limiting", "input_validation"]
            }
        }),
    )
}

fn owasp() -> Profile {
    profile(
        OWASP,
        "OWASP Top 10 coverage",
        Severity::High,
        Severity::Medium,
        json!({
            "sast": {
                "enabled": true,
                "rulesets": ["owasp-top-ten", "security-audit"],
                "custom_rules": []
            },
            "sca": { "enabled": true, "max_cvss": 7.0, "include_dev": false },
            "secrets": { "enabled": true, "entropy_threshold": 4.5, "patterns": [] },
            "iac": { "enabled": true, "frameworks": ["terraform", "kubernetes", "dockerfile"] },
            "container": { "enabled": true, "max_cvss": 7.0, "ignore_unfixed": true },
            "dast": { "enabled": true, "active_scan": false, "max_depth": 3 },
            "license": { "enabled": false, "blocked": [] },
            "posture": {
                "enabled": true,
                "checks": ["owasp-api-top-ten", "authentication", "transport"]
            }
        }),
    )
}

fn soc2() -> Profile {
    profile(
        SOC2,
        "SOC 2 security and availability controls",
        Severity::High,
        Severity::Medium,
        json!({
            "sast": {
                "enabled": true,
                "rulesets": ["security-audit", "secrets", "logging"],
                "custom_rules": []
            },
            "sca": { "enabled": true, "max_cvss": 7.0, "include_dev": false },
            "secrets": { "enabled": true, "entropy_threshold": 4.0, "patterns": [] },
            "iac": {
                "enabled": true,
                "frameworks": ["terraform", "kubernetes", "cloudformation"],
                "require_encryption": true,
                "require_logging": true
            },
            "container": { "enabled": true, "max_cvss": 7.0, "ignore_unfixed": true },
            "dast": { "enabled": false, "active_scan": false, "max_depth": 3 },
            "license": { "enabled": true, "blocked": ["AGPL-3.0"] },
            "posture": {
                "enabled": true,
                "checks": ["authentication", "transport", "audit_logging"]
            }
        }),
    )
}

fn pci_dss() -> Profile {
    profile(
        PCI_DSS,
        "PCI DSS requirements for cardholder data",
        Severity::Medium,
        Severity::Low,
        json!({
            "sast": {
                "enabled": true,
                "rulesets": ["security-audit", "secrets", "crypto", "pci-dss"],
                "custom_rules": []
            },
            "sca": { "enabled": true, "max_cvss": 4.0, "include_dev": false },
            "secrets": { "enabled": true, "entropy_threshold": 3.5, "patterns": ["pan", "cvv"] },
            "iac": {
                "enabled": true,
                "frameworks": ["terraform", "kubernetes", "cloudformation"],
                "require_encryption": true,
                "require_network_segmentation": true
            },
            "container": { "enabled": true, "max_cvss": 4.0, "ignore_unfixed": false },
            "dast": { "enabled": true, "active_scan": true, "max_depth": 5 },
            "license": { "enabled": true, "blocked": COPYLEFT },
            "posture": {
                "enabled": true,
                "checks": ["authentication", "transport", "encryption", "rate_limiting"]
            }
        }),
    )
}

fn hipaa() -> Profile {
    profile(
        HIPAA,
        "HIPAA safeguards for protected health information",
        Severity::Medium,
        Severity::Low,
        json!({
            "sast": {
                "enabled": true,
                "rulesets": ["security-audit", "secrets", "crypto", "pii"],
                "custom_rules": []
            },
            "sca": { "enabled": true, "max_cvss": 4.0, "include_dev": false },
            "secrets": { "enabled": true, "entropy_threshold": 3.5, "patterns": ["ssn", "mrn"] },
            "iac": {
                "enabled": true,
                "frameworks": ["terraform", "kubernetes", "cloudformation"],
                "require_encryption": true,
                "require_logging": true
            },
            "container": { "enabled": true, "max_cvss": 4.0, "ignore_unfixed": false },
            "dast": { "enabled": true, "active_scan": false, "max_depth": 3 },
            "license": { "enabled": true, "blocked": COPYLEFT },
            "posture": {
                "enabled": true,
                "checks": ["authentication", "transport", "encryption", "audit_logging"]
            }
        }),
    )
}
