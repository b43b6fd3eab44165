//! Compliance profiles and the active-profile pointer.
//!
//! A [`ProfileManager`] is a plain value. The server clones one per session so
//! `set_profile` in one session never leaks into another.

pub mod builtin;
pub mod merge;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use scangate_model::Profile;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ProfileError, Result};

pub use builtin::{CUSTOM, STANDARD, builtin_profiles};
pub use merge::deep_merge;

/// Override file names searched under `<project>/.scangate/`, in order.
pub const OVERRIDE_FILES: [&str; 3] = ["profile.yaml", "profile.yml", "profile.json"];

const OVERRIDE_DIR: &str = ".scangate";
const EXTENDS_KEY: &str = "extends";

#[derive(Debug, Clone)]
pub struct ProfileManager {
    profiles: BTreeMap<String, Arc<Profile>>,
    active: Arc<Profile>,
}

impl Default for ProfileManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileManager {
    /// Built-in profiles with `standard` active.
    pub fn new() -> Self {
        let profiles: BTreeMap<String, Arc<Profile>> = builtin_profiles()
            .into_iter()
            .map(|p| (p.name.clone(), Arc::new(p)))
            .collect();
        let active = profiles
            .get(STANDARD)
            .cloned()
            .unwrap_or_else(|| Arc::new(builtin::standard()));
        Self { profiles, active }
    }

    /// Built-ins with `name` active instead of `standard`.
    pub fn with_active(name: &str) -> Result<Self> {
        let mut manager = Self::new();
        manager.set_active(name)?;
        Ok(manager)
    }

    pub fn active(&self) -> &Profile {
        &self.active
    }

    pub fn active_name(&self) -> &str {
        &self.active.name
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let Some(profile) = self.profiles.get(name) else {
            return Err(ProfileError::UnknownProfile {
                name: name.to_string(),
                known: self.list_profiles(),
            });
        };
        debug!(profile = name, "active profile changed");
        self.active = Arc::clone(profile);
        Ok(())
    }

    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name).map(Arc::as_ref)
    }

    /// Registered profile names, sorted.
    pub fn list_profiles(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values().map(Arc::as_ref)
    }

    /// Load `<project_dir>/.scangate/profile.{yaml,yml,json}`.
    ///
    /// An `extends` key names the built-in to start from; the rest of the
    /// file is deep-merged over it. The result is registered as `custom` and
    /// made active. Returns `Ok(None)` and leaves the active profile alone
    /// when no override file exists.
    pub fn load_custom_profile(
        &mut self,
        project_dir: &Path,
    ) -> Result<Option<Profile>> {
        let Some(path) = find_override(project_dir) else {
            debug!(dir = %project_dir.display(), "no profile override found");
            return Ok(None);
        };

        let contents = std::fs::read_to_string(&path).map_err(|source| {
            ProfileError::Io {
                path: path.clone(),
                source,
            }
        })?;
        let profile = self.build_custom(&path, &contents)?;

        info!(
            path = %path.display(),
            version = %profile.version,
            "loaded custom profile"
        );
        let installed = Arc::new(profile.clone());
        self.profiles.insert(CUSTOM.to_string(), Arc::clone(&installed));
        self.active = installed;
        Ok(Some(profile))
    }

    fn build_custom(&self, path: &Path, contents: &str) -> Result<Profile> {
        let parse_error = |message: String| ProfileError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let overlay = parse_override(path, contents).map_err(parse_error)?;
        let Value::Object(mut overlay) = overlay else {
            return Err(parse_error("expected a mapping at the top level".into()));
        };

        let mut tree = match overlay.remove(EXTENDS_KEY) {
            Some(Value::String(base_name)) => {
                let base = self.get_profile(&base_name).ok_or_else(|| {
                    ProfileError::UnknownBaseProfile {
                        name: base_name.clone(),
                        known: self.list_profiles(),
                    }
                })?;
                let mut tree = serde_json::to_value(base)
                    .map_err(|e| parse_error(e.to_string()))?;
                deep_merge(&mut tree, Value::Object(overlay));
                tree
            }
            Some(other) => {
                return Err(parse_error(format!(
                    "'extends' must be a profile name, found {}",
                    other
                )));
            }
            None => Value::Object(overlay),
        };

        if let Value::Object(map) = &mut tree {
            map.insert("name".into(), Value::String(CUSTOM.to_string()));
        }

        serde_json::from_value(tree).map_err(|e| parse_error(e.to_string()))
    }
}

fn find_override(project_dir: &Path) -> Option<PathBuf> {
    let dir = project_dir.join(OVERRIDE_DIR);
    OVERRIDE_FILES
        .iter()
        .map(|file| dir.join(file))
        .find(|candidate| candidate.is_file())
}

fn parse_override(
    path: &Path,
    contents: &str,
) -> std::result::Result<Value, String> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(contents).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scangate_model::Severity;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_override(dir: &TempDir, file: &str, contents: &str) {
        let target = dir.path().join(OVERRIDE_DIR);
        std::fs::create_dir_all(&target).expect("create override dir");
        std::fs::write(target.join(file), contents).expect("write override");
    }

    #[test]
    fn starts_with_builtins_and_standard_active() {
        let manager = ProfileManager::new();
        assert_eq!(manager.active().name, "standard");
        assert_eq!(
            manager.list_profiles(),
            vec!["hardened", "hipaa", "owasp", "pci-dss", "soc2", "standard"]
        );
    }

    #[test]
    fn set_active_switches_profile() {
        let mut manager = ProfileManager::new();
        manager.set_active("hipaa").expect("hipaa exists");
        assert_eq!(manager.active().name, "hipaa");
        assert_eq!(manager.active_name(), "hipaa");
    }

    #[test]
    fn unknown_profile_is_rejected_and_active_unchanged() {
        let mut manager = ProfileManager::new();
        manager.set_active("owasp").expect("owasp exists");

        let err = manager.set_active("nope").expect_err("unknown profile");
        assert!(matches!(err, ProfileError::UnknownProfile { ref name, .. } if name == "nope"));
        let message = err.to_string();
        assert!(message.contains("Unknown profile 'nope'"));
        assert!(message.contains("hardened, hipaa, owasp, pci-dss, soc2, standard"));
        assert_eq!(manager.active().name, "owasp");
    }

    #[test]
    fn missing_override_leaves_active_alone() {
        let dir = TempDir::new().expect("tempdir");
        let mut manager = ProfileManager::new();
        manager.set_active("soc2").expect("soc2 exists");

        let loaded = manager.load_custom_profile(dir.path()).expect("no error");
        assert!(loaded.is_none());
        assert_eq!(manager.active().name, "soc2");
        assert!(manager.get_profile(CUSTOM).is_none());
    }

    #[test]
    fn extends_merges_override_onto_base() {
        let dir = TempDir::new().expect("tempdir");
        write_override(
            &dir,
            "profile.yaml",
            "extends: standard\nrules:\n  secrets:\n    enabled: false\n",
        );

        let mut manager = ProfileManager::new();
        let custom = manager
            .load_custom_profile(dir.path())
            .expect("override loads")
            .expect("override present");

        assert_eq!(custom.name, "custom");
        assert_eq!(manager.active().name, "custom");
        assert_eq!(custom.rules["secrets"]["enabled"], json!(false));
        assert_eq!(
            custom.rules["secrets"]["entropy_threshold"],
            json!(4.5),
            "untouched keys inside a merged entry survive"
        );

        let standard = manager.get_profile("standard").expect("standard");
        for (backend, rule) in &standard.rules {
            if backend != "secrets" {
                assert_eq!(&custom.rules[backend], rule, "{backend} changed");
            }
        }
        assert_eq!(custom.severity_thresholds, standard.severity_thresholds);
        let as_json = serde_json::to_value(&custom).expect("serialize");
        assert!(as_json.get("extends").is_none());
    }

    #[test]
    fn json_override_can_raise_thresholds() {
        let dir = TempDir::new().expect("tempdir");
        write_override(
            &dir,
            "profile.json",
            r#"{"extends":"hardened","severity_thresholds":{"error":"critical"},"rules":{"license":{"blocked":["SSPL-1.0"]}}}"#,
        );

        let mut manager = ProfileManager::new();
        let custom = manager
            .load_custom_profile(dir.path())
            .expect("override loads")
            .expect("override present");

        assert_eq!(custom.severity_thresholds.error, Severity::Critical);
        assert_eq!(custom.severity_thresholds.warn, Severity::Low);
        assert_eq!(custom.rules["license"]["blocked"], json!(["SSPL-1.0"]));
        assert_eq!(custom.rules["license"]["enabled"], json!(true));
    }

    #[test]
    fn unknown_base_profile_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        write_override(&dir, "profile.yml", "extends: iso27001\n");

        let mut manager = ProfileManager::new();
        let err = manager
            .load_custom_profile(dir.path())
            .expect_err("unknown base");
        assert!(matches!(err, ProfileError::UnknownBaseProfile { ref name, .. } if name == "iso27001"));
        assert_eq!(manager.active().name, "standard");
    }

    #[test]
    fn standalone_override_must_be_complete() {
        let dir = TempDir::new().expect("tempdir");
        write_override(&dir, "profile.yaml", "rules:\n  sast:\n    enabled: true\n");

        let mut manager = ProfileManager::new();
        let err = manager
            .load_custom_profile(dir.path())
            .expect_err("incomplete profile");
        assert!(matches!(err, ProfileError::Parse { .. }));
    }

    #[test]
    fn standalone_override_is_named_custom() {
        let dir = TempDir::new().expect("tempdir");
        write_override(
            &dir,
            "profile.yaml",
            "name: mine\nversion: 2.0.0\ndescription: Team profile\nseverity_thresholds:\n  error: high\n  warn: low\nrules: {}\n",
        );

        let mut manager = ProfileManager::new();
        let custom = manager
            .load_custom_profile(dir.path())
            .expect("override loads")
            .expect("override present");
        assert_eq!(custom.name, "custom");
        assert_eq!(custom.version, "2.0.0");
        assert!(manager.get_profile("mine").is_none());
    }

    #[test]
    fn clones_are_independent() {
        let shared = ProfileManager::new();
        let mut session = shared.clone();
        session.set_active("pci-dss").expect("pci-dss exists");
        assert_eq!(shared.active().name, "standard");
        assert_eq!(session.active().name, "pci-dss");
    }
}
