use serde::{Deserialize, Serialize};

/// The license authority's answer for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseVerdict {
    pub valid: bool,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl LicenseVerdict {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            plan: None,
            features: Vec::new(),
            expires_at: None,
        }
    }

    pub fn allows(&self, feature: &str) -> bool {
        self.valid && self.features.iter().any(|f| f == feature)
    }
}
