/// Rewrites paths between the caller's view of the filesystem and the
/// gateway's mounted view of the same tree.
///
/// This is a pure string-prefix rewrite. With either root unset, or when a
/// path does not start with the expected root, paths pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMapping {
    pub host_root: Option<String>,
    pub mount_root: Option<String>,
}

impl PathMapping {
    pub fn new(host_root: impl Into<String>, mount_root: impl Into<String>) -> Self {
        Self {
            host_root: Some(host_root.into()),
            mount_root: Some(mount_root.into()),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.roots().is_none()
    }

    /// Caller path -> gateway path.
    pub fn to_gateway(&self, path: &str) -> String {
        match self.roots() {
            Some((host, mount)) => rewrite(path, host, mount),
            None => path.to_string(),
        }
    }

    /// Gateway path -> caller path.
    pub fn to_caller(&self, path: &str) -> String {
        match self.roots() {
            Some((host, mount)) => rewrite(path, mount, host),
            None => path.to_string(),
        }
    }

    fn roots(&self) -> Option<(&str, &str)> {
        match (self.host_root.as_deref(), self.mount_root.as_deref()) {
            (Some(host), Some(mount)) if host != mount => Some((
                host.trim_end_matches('/'),
                mount.trim_end_matches('/'),
            )),
            _ => None,
        }
    }
}

/// Roots arrive with trailing slashes trimmed, so the filesystem root `/` is
/// the empty string here. Every absolute path lies under it.
fn rewrite(path: &str, from: &str, to: &str) -> String {
    match path.strip_prefix(from) {
        // Only rewrite on a component boundary: `/work` must not match `/workspace`.
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            let rest = if rest == "/" { "" } else { rest };
            if to.is_empty() && rest.is_empty() {
                "/".to_string()
            } else {
                format!("{to}{rest}")
            }
        }
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_prefix_in_both_directions() {
        let mapping = PathMapping::new("/Users/dev/project", "/workspace/");
        assert_eq!(
            mapping.to_gateway("/Users/dev/project/src/app.js"),
            "/workspace/src/app.js"
        );
        assert_eq!(mapping.to_gateway("/Users/dev/project"), "/workspace");
        assert_eq!(
            mapping.to_caller("/workspace/src/app.js"),
            "/Users/dev/project/src/app.js"
        );
    }

    #[test]
    fn filesystem_root_maps_as_a_directory() {
        let mapping = PathMapping::new("/", "/host");
        assert_eq!(mapping.to_gateway("/etc/app.conf"), "/host/etc/app.conf");
        assert_eq!(mapping.to_gateway("/"), "/host");
        assert_eq!(mapping.to_gateway("relative/a.py"), "relative/a.py");
        assert_eq!(mapping.to_caller("/host/etc/app.conf"), "/etc/app.conf");
        assert_eq!(mapping.to_caller("/host"), "/");
        assert_eq!(mapping.to_caller("/hostname/x"), "/hostname/x");

        let mapping = PathMapping::new("/Users/dev/project", "/");
        assert_eq!(mapping.to_gateway("/Users/dev/project"), "/");
        assert_eq!(mapping.to_gateway("/Users/dev/project/src/a.js"), "/src/a.js");
        assert_eq!(mapping.to_caller("/src/a.js"), "/Users/dev/project/src/a.js");
        assert_eq!(mapping.to_caller("/"), "/Users/dev/project");
    }

    #[test]
    fn leaves_unrelated_paths_alone() {
        let mapping = PathMapping::new("/work", "/mnt/work");
        assert_eq!(mapping.to_gateway("/workspace/a.py"), "/workspace/a.py");
        assert_eq!(mapping.to_gateway("relative/a.py"), "relative/a.py");
        assert!(PathMapping::default().is_identity());
        assert_eq!(PathMapping::default().to_gateway("/x"), "/x");
    }
}
