//! Theme resolver
//!
//! Walks the search path hierarchy looking for directories that carry a
//! manifest. Each level is scanned in full, in name order, before the next.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ThemeSearchPaths;
use crate::log::Logger;
use crate::manifest::Manifest;

/// Finds theme directories by name or first availability
#[derive(Debug, Clone)]
pub struct ThemeResolver {
    paths: ThemeSearchPaths,
}

impl ThemeResolver {
    pub fn new(paths: ThemeSearchPaths) -> Self {
        Self { paths }
    }

    /// Every candidate theme directory, in search order
    pub fn candidates(&self) -> Vec<PathBuf> {
        self.paths.iter().flat_map(candidates_in).collect()
    }

    /// First candidate whose manifest `name` or directory name equals `name`
    pub fn find_by_name(&self, name: &str, logger: &Logger) -> Option<PathBuf> {
        self.candidates()
            .into_iter()
            .find(|dir| theme_matches(dir, name, logger))
    }

    /// First candidate in search order, whatever its name
    pub fn first_available(&self) -> Option<PathBuf> {
        self.candidates().into_iter().next()
    }

    /// Resolve a theme directory.
    ///
    /// With a name, only matching themes are considered unless
    /// `allow_fallback` is set, in which case a failed lookup retries with
    /// the first available theme.
    pub fn resolve(
        &self,
        name: Option<&str>,
        allow_fallback: bool,
        logger: &Logger,
    ) -> Option<PathBuf> {
        let found = match name {
            Some(name) => {
                let found = self.find_by_name(name, logger);
                if found.is_none() {
                    log!(logger, Info, "theme {} not found", name);
                }
                match found {
                    None if allow_fallback => self.first_available(),
                    found => found,
                }
            }
            None if allow_fallback => self.first_available(),
            None => None,
        }?;

        Some(fs::canonicalize(&found).unwrap_or(found))
    }
}

/// Subdirectories of `dir` holding a manifest, sorted by name
fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut themes: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter(|path| has_readable_manifest(path))
        .collect();

    themes.sort();
    themes
}

fn has_readable_manifest(dir: &Path) -> bool {
    Manifest::locate(dir)
        .map(|(path, _)| fs::File::open(path).is_ok())
        .unwrap_or(false)
}

fn theme_matches(dir: &Path, name: &str, logger: &Logger) -> bool {
    let basename_matches = dir.file_name().and_then(|n| n.to_str()) == Some(name);

    match Manifest::load(dir) {
        Ok((manifest, _)) => manifest.name == name || basename_matches,
        Err(e) => {
            log!(logger, Warn, "skipping manifest of {}: {}", dir.display(), e);
            basename_matches
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn user_resolver(user: &TempDir) -> ThemeResolver {
        ThemeResolver::new(ThemeSearchPaths::new(vec![user.path().into()], Vec::new()))
    }

    fn theme(root: &Path, dir: &str, manifest: &str) {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("manifest.hl"), manifest).unwrap();
    }

    #[test]
    fn test_find_by_manifest_name_or_dir() {
        let user = TempDir::new().unwrap();
        theme(user.path(), "bibata", "name = Bibata Modern\n");
        theme(user.path(), "other", "name = Other\n");

        let resolver = user_resolver(&user);
        let logger = Logger::default();

        let found = resolver.find_by_name("Bibata Modern", &logger).unwrap();
        assert!(found.ends_with("bibata"));

        let found = resolver.find_by_name("other", &logger).unwrap();
        assert!(found.ends_with("other"));

        assert!(resolver.find_by_name("missing", &logger).is_none());
    }

    #[test]
    fn test_user_level_wins_over_system() {
        let user = TempDir::new().unwrap();
        let system = TempDir::new().unwrap();
        theme(system.path(), "a", "name = Shared\n");
        theme(user.path(), "z", "name = Shared\n");

        let resolver = ThemeResolver::new(ThemeSearchPaths::new(
            vec![user.path().into()],
            vec![system.path().into()],
        ));

        let found = resolver.find_by_name("Shared", &Logger::default()).unwrap();
        assert!(found.starts_with(user.path()));
    }

    #[test]
    fn test_directories_without_manifest_are_ignored() {
        let user = TempDir::new().unwrap();
        fs::create_dir_all(user.path().join("aaa")).unwrap();
        theme(user.path(), "bbb", "name = B\n");

        let resolver = user_resolver(&user);
        let candidates = resolver.candidates();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].ends_with("bbb"));
    }

    #[test]
    fn test_fallback_policy() {
        let user = TempDir::new().unwrap();
        theme(user.path(), "only", "name = Only\n");

        let resolver = user_resolver(&user);
        let logger = Logger::default();

        assert!(resolver.resolve(Some("nope"), false, &logger).is_none());
        assert!(resolver.resolve(None, false, &logger).is_none());

        let found = resolver.resolve(Some("nope"), true, &logger).unwrap();
        assert!(found.ends_with("only"));
        assert!(found.is_absolute());

        let found = resolver.resolve(None, true, &logger).unwrap();
        assert!(found.ends_with("only"));
    }

    #[test]
    fn test_broken_manifest_matches_by_basename() {
        let user = TempDir::new().unwrap();
        theme(user.path(), "broken", "this is not = \n{\n");

        let resolver = user_resolver(&user);
        let found = resolver.find_by_name("broken", &Logger::default()).unwrap();
        assert!(found.ends_with("broken"));
    }

    #[test]
    fn test_missing_search_dirs_are_skipped() {
        let resolver = ThemeResolver::new(ThemeSearchPaths::new(
            vec![PathBuf::from("/nonexistent/hyprcursor/icons")],
            Vec::new(),
        ));
        assert!(resolver.candidates().is_empty());
        assert!(resolver.first_available().is_none());
    }
}
