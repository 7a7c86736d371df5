//! Make-style dependency file for the bundle archive
//!
//! Every input the build reads is recorded here, whether or not the cache let
//! the expensive step be skipped, so external build systems re-trigger the
//! bundle when any of them changes.

use crate::error::{BundleError, BundleResult};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ordered set of input paths consumed by one build output
#[derive(Debug, Clone)]
pub struct DependencyRecord {
    target: String,
    path: PathBuf,
    inputs: Vec<String>,
    seen: HashSet<String>,
}

impl DependencyRecord {
    /// Create an empty record for `target`, to be written to `path`
    pub fn new(target: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            path: path.into(),
            inputs: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Record an input; repeated paths keep their first position
    pub fn add(&mut self, input: impl AsRef<Path>) {
        let input = input.as_ref().to_string_lossy().into_owned();
        if self.seen.insert(input.clone()) {
            self.inputs.push(input);
        }
    }

    /// Inputs in first-occurrence order
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Render as `<target>: <input> <input> ...`
    pub fn render(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(|i| escape(i)).collect();
        format!("{}: {}", escape(&self.target), inputs.join(" "))
    }

    /// Write the record, replacing any previous dependency file
    ///
    /// May be called repeatedly; each call writes whatever has accumulated.
    pub fn write(&self) -> BundleResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    BundleError::io(format!("creating directory {}", parent.display()), e)
                })?;
            }
        }

        fs::write(&self.path, self.render()).map_err(|e| {
            BundleError::io(format!("writing dependency file {}", self.path.display()), e)
        })?;

        debug!(
            "Wrote {} dependencies to {}",
            self.inputs.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn escape(path: &str) -> String {
    path.replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn keeps_first_occurrence_order() {
        let mut deps = DependencyRecord::new("out.tar", "out.d");
        for input in ["b", "a", "b", "c", "a"] {
            deps.add(input);
        }

        assert_eq!(deps.inputs(), ["b", "a", "c"]);
    }

    #[test]
    fn renders_make_rule() {
        let mut deps = DependencyRecord::new("build/bundle.tar", "build/bundle.d");
        deps.add("assets/shaders/basic.hlsl");
        deps.add("assets/fonts/Inter.ttf");

        assert_eq!(
            deps.render(),
            "build/bundle.tar: assets/shaders/basic.hlsl assets/fonts/Inter.ttf"
        );
    }

    #[test]
    fn escapes_spaces() {
        let mut deps = DependencyRecord::new("bundle.tar", "bundle.d");
        deps.add("assets/My Font.ttf");

        assert_eq!(deps.render(), "bundle.tar: assets/My\\ Font.ttf");
    }

    #[test]
    fn empty_record_renders_bare_target() {
        let deps = DependencyRecord::new("bundle.tar", "bundle.d");
        assert_eq!(deps.render(), "bundle.tar: ");
    }

    #[test]
    fn write_is_repeatable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("bundle.d");
        let mut deps = DependencyRecord::new("bundle.tar", &path);

        deps.add("a.hlsl");
        deps.write().unwrap();
        deps.add("b.hlsl");
        deps.write().unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "bundle.tar: a.hlsl b.hlsl"
        );
    }
}
