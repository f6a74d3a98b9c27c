//! # Bundled Resources
//!
//! Schema files packaged with a deployment, addressed by names rooted
//! under the `/resources` namespace.
//!
//! ## Naming
//!
//! [`normalize_resource_name`] turns whatever the configuration says into
//! the canonical form: a single leading `/`, then `/resources` if the name
//! is not already under it. `order.json`, `/order.json` and
//! `/resources/order.json` all name the same resource.

use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use jsv_core::ResourceError;

/// Root of the bundled-resource namespace.
pub const RESOURCE_ROOT: &str = "/resources";

/// Suffix that marks a schema property as a resource name.
pub const RESOURCE_SUFFIX: &str = ".json";

/// Canonical form of a resource name.
pub fn normalize_resource_name(name: &str) -> String {
    let mut normalized = if name.starts_with('/') {
        name.to_string()
    } else {
        format!("/{name}")
    };
    if normalized != RESOURCE_ROOT && !normalized.starts_with("/resources/") {
        normalized = format!("{RESOURCE_ROOT}{normalized}");
    }
    normalized
}

/// Source of bundled resources. Implementations must be safe to share
/// across concurrently executing requests.
pub trait ResourceBundle: Send + Sync + fmt::Debug {
    /// Read the resource with the given (already normalized) name.
    ///
    /// # Errors
    ///
    /// [`ResourceError::NotFound`] when nothing exists under `name`.
    fn read(&self, name: &str) -> Result<Vec<u8>, ResourceError>;

    /// Whether a resource exists under the given normalized name.
    fn contains(&self, name: &str) -> bool {
        self.read(name).is_ok()
    }
}

/// Resources served from a directory that stands for `/resources`.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
}

impl DirectoryBundle {
    /// Serve resources from `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The directory backing the namespace.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for a normalized name, refusing anything that
    /// would leave the root.
    fn path_for(&self, name: &str) -> Result<PathBuf, ResourceError> {
        let invalid = || ResourceError::InvalidName {
            name: name.to_string(),
        };
        let relative = name
            .strip_prefix(RESOURCE_ROOT)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(invalid)?;
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(invalid());
        }
        Ok(self.root.join(relative))
    }
}

impl ResourceBundle for DirectoryBundle {
    fn read(&self, name: &str) -> Result<Vec<u8>, ResourceError> {
        let path = self.path_for(name)?;
        std::fs::read(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => ResourceError::NotFound {
                name: name.to_string(),
            },
            _ => ResourceError::Io {
                name: name.to_string(),
                source,
            },
        })
    }

    fn contains(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }
}

/// Resources held in memory, keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct MemoryBundle {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryBundle {
    /// Empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource; `name` is normalized first.
    pub fn with_resource(mut self, name: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(name, contents);
        self
    }

    /// Add or replace a resource; `name` is normalized first.
    pub fn insert(&mut self, name: &str, contents: impl Into<Vec<u8>>) {
        self.resources
            .insert(normalize_resource_name(name), contents.into());
    }

    /// Number of resources held.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if the bundle holds nothing.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceBundle for MemoryBundle {
    fn read(&self, name: &str) -> Result<Vec<u8>, ResourceError> {
        self.resources
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound {
                name: name.to_string(),
            })
    }

    fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("jsv-bundle-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        dir
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_resource_name("a.json"), "/resources/a.json");
        assert_eq!(normalize_resource_name("/a.json"), "/resources/a.json");
        assert_eq!(normalize_resource_name("/resources/a.json"), "/resources/a.json");
        assert_eq!(normalize_resource_name("resources/a.json"), "/resources/a.json");
        assert_eq!(normalize_resource_name("nested/a.json"), "/resources/nested/a.json");
        assert_eq!(
            normalize_resource_name("/resourcesx.json"),
            "/resources/resourcesx.json"
        );
    }

    #[test]
    fn memory_bundle_reads_normalized() {
        let bundle = MemoryBundle::new().with_resource("a.json", "{}");
        assert_eq!(bundle.len(), 1);
        assert!(bundle.contains("/resources/a.json"));
        assert_eq!(bundle.read("/resources/a.json").unwrap(), b"{}");
        let err = bundle.read("/resources/b.json").unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { ref name } if name == "/resources/b.json"));
    }

    #[test]
    fn directory_bundle_reads_files() {
        let dir = temp_dir("read");
        std::fs::write(dir.join("nested/s.json"), b"{\"type\":\"string\"}").unwrap();
        let bundle = DirectoryBundle::new(&dir);
        assert!(bundle.contains("/resources/nested/s.json"));
        assert_eq!(
            bundle.read("/resources/nested/s.json").unwrap(),
            b"{\"type\":\"string\"}"
        );
        assert!(matches!(
            bundle.read("/resources/absent.json"),
            Err(ResourceError::NotFound { .. })
        ));
    }

    #[test]
    fn directory_bundle_refuses_traversal() {
        let bundle = DirectoryBundle::new(temp_dir("traversal"));
        assert!(matches!(
            bundle.read("/resources/../secret.json"),
            Err(ResourceError::InvalidName { .. })
        ));
        assert!(matches!(
            bundle.read("/elsewhere/a.json"),
            Err(ResourceError::InvalidName { .. })
        ));
        assert!(!bundle.contains("/resources/../secret.json"));
    }
}
