//! Theme manifest reader (`manifest.hl` / `manifest.toml`)

use std::fs;
use std::path::{Path, PathBuf};

use crate::directive::{self, Directive, Schema, Syntax};
use crate::error::{CursorError, CursorResult};

/// Base name of the manifest file at the theme root
pub const MANIFEST_STEM: &str = "manifest";

const SCHEMA: Schema = Schema {
    values: &[
        "name",
        "description",
        "version",
        "author",
        "cursors_directory",
    ],
    repeatable: &[],
};

/// Theme-level metadata. All fields default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    /// Subdirectory of the theme root holding the shape archives
    pub cursors_directory: String,
}

impl Manifest {
    /// Parse manifest source in the given syntax
    pub fn parse(source: &str, syntax: Syntax) -> CursorResult<Self> {
        let directives = directive::parse(source, syntax, &SCHEMA)?;

        let mut manifest = Self::default();
        for directive in directives {
            manifest.apply(directive);
        }
        Ok(manifest)
    }

    /// Find and parse `manifest.hl` or `manifest.toml` inside `theme_root`
    pub fn load(theme_root: &Path) -> CursorResult<(Self, PathBuf)> {
        let (path, syntax) = Self::locate(theme_root).ok_or_else(|| {
            CursorError::Parse(format!(
                "Failed to find an appropriate manifest in {}",
                theme_root.display()
            ))
        })?;

        let source = fs::read_to_string(&path)?;
        let manifest = Self::parse(&source, syntax)
            .map_err(|e| CursorError::Parse(format!("{}: {}", path.display(), e)))?;

        Ok((manifest, path))
    }

    /// Path and syntax of the manifest inside `theme_root`, if any
    pub fn locate(theme_root: &Path) -> Option<(PathBuf, Syntax)> {
        directive::find_source(&theme_root.join(MANIFEST_STEM))
    }

    fn apply(&mut self, directive: Directive) {
        let slot = match directive.key.as_str() {
            "name" => &mut self.name,
            "description" => &mut self.description,
            "version" => &mut self.version,
            "author" => &mut self.author,
            "cursors_directory" => &mut self.cursors_directory,
            _ => return,
        };
        *slot = directive.value;
    }
}
