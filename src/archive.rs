//! Archive shape loader
//!
//! Every shape ships as `<shape>.hlc`, a zip archive holding `meta.hl` or
//! `meta.toml` and the images it declares, all at the archive root.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::directive::Syntax;
use crate::error::{CursorError, CursorResult};
use crate::log::Logger;
use crate::manifest::Manifest;
use crate::meta::{ShapeMeta, META_STEM};
use crate::raster;
use crate::shape::{LoadedImage, LoadedShape, Shape, ShapeType};

/// File extension of shape archives
pub const ARCHIVE_EXTENSION: &str = "hlc";

/// Upper bound for a single archive entry
pub const MAX_ENTRY_SIZE: u64 = 8 * 1024 * 1024;

/// Resolved theme location and its manifest
#[derive(Debug, Clone)]
pub struct ThemeInfo {
    pub root: PathBuf,
    pub manifest: Manifest,
}

impl ThemeInfo {
    pub fn shapes_dir(&self) -> PathBuf {
        self.root.join(&self.manifest.cursors_directory)
    }
}

/// A fully loaded theme: manifest plus every shape with its native images
#[derive(Debug)]
pub struct LoadedTheme {
    pub info: ThemeInfo,
    pub shapes: Vec<LoadedShape>,
}

/// Load the theme rooted at `root`. Any failing shape fails the whole theme.
pub fn load_theme(root: &Path, keep_raw_data: bool, logger: &Logger) -> CursorResult<LoadedTheme> {
    let (manifest, manifest_path) = Manifest::load(root)?;
    log!(logger, Trace, "parsed manifest {}", manifest_path.display());

    if manifest.cursors_directory.is_empty() {
        return Err(CursorError::Parse(format!(
            "{}: cursors_directory is missing",
            manifest_path.display()
        )));
    }

    let info = ThemeInfo {
        root: root.to_path_buf(),
        manifest,
    };

    let shapes_dir = info.shapes_dir();
    if !shapes_dir.is_dir() {
        return Err(CursorError::archive(
            &shapes_dir,
            "cursors directory does not exist",
        ));
    }

    let shapes = archives_in(&shapes_dir, logger)?
        .iter()
        .map(|path| load_shape(path, keep_raw_data, logger))
        .collect::<CursorResult<Vec<_>>>()?;

    if shapes.is_empty() {
        return Err(CursorError::Parse(format!(
            "theme {} has no shapes",
            root.display()
        )));
    }

    log!(
        logger,
        Info,
        "loaded theme {} with {} shapes",
        info.manifest.name,
        shapes.len()
    );

    Ok(LoadedTheme { info, shapes })
}

/// `*.hlc` files in `dir`, sorted by name
fn archives_in(dir: &Path, logger: &Logger) -> CursorResult<Vec<PathBuf>> {
    let mut archives = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_archive = path.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(ARCHIVE_EXTENSION);

        if is_archive {
            archives.push(path);
        } else {
            log!(logger, Trace, "skipping {}", path.display());
        }
    }

    archives.sort();
    Ok(archives)
}

/// Load one shape archive: parse its metadata and read every declared image
pub fn load_shape(path: &Path, keep_raw_data: bool, logger: &Logger) -> CursorResult<LoadedShape> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CursorError::archive(path, "archive name is not valid UTF-8"))?
        .to_string();

    let file = File::open(path).map_err(|e| CursorError::archive(path, e.to_string()))?;
    let mut archive = ZipArchive::new(file).map_err(|e| CursorError::archive(path, e.to_string()))?;

    let (meta_bytes, syntax) = read_meta(&mut archive, path)?;
    let source = String::from_utf8(meta_bytes)
        .map_err(|_| CursorError::archive(path, "metadata is not valid UTF-8"))?;

    let meta = ShapeMeta::parse(&source, syntax)
        .map_err(|e| CursorError::Parse(format!("{}: {}", path.display(), e)))?;
    let shape = Shape::from_meta(name, meta, logger)?;

    let mut images = Vec::with_capacity(shape.images.len());
    for (index, decl) in shape.images.iter().enumerate() {
        let data = read_entry(&mut archive, path, &decl.filename)?
            .ok_or_else(|| {
                CursorError::archive(path, format!("image {} is missing", decl.filename))
            })?;

        log!(
            logger,
            Trace,
            "loaded {} ({} bytes) for shape {}",
            decl.filename,
            data.len(),
            shape.name
        );

        let image = match shape.shape_type {
            ShapeType::Raster => {
                let raw = keep_raw_data.then(|| data.clone());
                let surface = raster::decode_png(data).map_err(|e| {
                    CursorError::Decode(format!("{} in {}: {}", decl.filename, path.display(), e))
                })?;
                LoadedImage::native_raster(index, decl.size, decl.delay_ms, surface, raw)
            }
            ShapeType::Vector => LoadedImage::native_vector(index, decl.delay_ms, data),
        };
        images.push(image);
    }

    Ok(LoadedShape::new(shape, images))
}

/// `meta.hl`, then `meta.toml`
fn read_meta(archive: &mut ZipArchive<File>, path: &Path) -> CursorResult<(Vec<u8>, Syntax)> {
    for syntax in Syntax::LOOKUP_ORDER {
        if let Some(bytes) = read_entry(archive, path, &syntax.entry_for(META_STEM))? {
            return Ok((bytes, syntax));
        }
    }

    Err(CursorError::archive(path, "no meta.hl or meta.toml entry"))
}

/// Read an entry fully. `Ok(None)` if the archive has no such entry.
fn read_entry(
    archive: &mut ZipArchive<File>,
    path: &Path,
    name: &str,
) -> CursorResult<Option<Vec<u8>>> {
    let entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(CursorError::archive(path, format!("{}: {}", name, e))),
    };

    let size = entry.size();
    if size > MAX_ENTRY_SIZE {
        return Err(CursorError::archive(
            path,
            format!("{} is too large ({} bytes)", name, size),
        ));
    }

    let mut buf = Vec::with_capacity(size as usize);
    entry
        .take(MAX_ENTRY_SIZE)
        .read_to_end(&mut buf)
        .map_err(|e| CursorError::archive(path, format!("{}: {}", name, e)))?;

    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{solid_png, svg_rect, write_archive, ThemeFixture, GREEN, RED};
    use tempfile::TempDir;

    #[test]
    fn test_load_raster_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("left_ptr.hlc");
        let meta = "hotspot_x = 0.5\ndefine_size = 24, a.png\ndefine_size = 32, b.png, 60\n";
        write_archive(
            &path,
            &[
                ("meta.hl", meta.as_bytes().to_vec()),
                ("a.png", solid_png(24, RED)),
                ("b.png", solid_png(32, GREEN)),
            ],
        );

        let loaded = load_shape(&path, false, &Logger::default()).unwrap();
        assert_eq!(loaded.shape.name, "left_ptr");
        assert_eq!(loaded.shape.shape_type, ShapeType::Raster);
        assert_eq!(loaded.images.len(), 2);
        assert_eq!(loaded.images[1].side, 32);
        assert_eq!(loaded.images[1].delay_ms, 60);
        assert!(loaded.images.iter().all(|i| i.data.is_none() && i.is_renderable()));
        assert_eq!(loaded.images[0].surface.as_ref().unwrap().get_pixel(0, 0).0, RED);
    }

    #[test]
    fn test_keep_raw_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hand.hlc");
        let png = solid_png(16, RED);
        write_archive(
            &path,
            &[("meta.hl", b"define_size = 16, h.png\n".to_vec()), ("h.png", png.clone())],
        );

        let loaded = load_shape(&path, true, &Logger::default()).unwrap();
        assert_eq!(loaded.images[0].data.as_deref(), Some(png.as_slice()));
    }

    #[test]
    fn test_load_vector_shape_with_toml_meta() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wait.hlc");
        write_archive(
            &path,
            &[
                ("meta.toml", b"[General]\ndefine_size = \"0, wait.svg, 100\"\n".to_vec()),
                ("wait.svg", svg_rect("red")),
            ],
        );

        let loaded = load_shape(&path, false, &Logger::default()).unwrap();
        assert_eq!(loaded.shape.shape_type, ShapeType::Vector);
        assert_eq!(loaded.images[0].side, 0);
        assert_eq!(loaded.images[0].delay_ms, 100);
        assert!(loaded.images[0].data.is_some());
        assert!(!loaded.images[0].is_renderable());
    }

    #[test]
    fn test_missing_meta_or_image_fails() {
        let dir = TempDir::new().unwrap();

        let path = dir.path().join("no_meta.hlc");
        write_archive(&path, &[("a.png", solid_png(8, RED))]);
        assert!(matches!(
            load_shape(&path, false, &Logger::default()),
            Err(CursorError::Archive { .. })
        ));

        let path = dir.path().join("no_image.hlc");
        write_archive(&path, &[("meta.hl", b"define_size = 8, a.png\n".to_vec())]);
        let err = load_shape(&path, false, &Logger::default()).unwrap_err();
        assert!(err.to_string().contains("a.png"));
    }

    #[test]
    fn test_corrupt_image_fails_with_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.hlc");
        write_archive(
            &path,
            &[("meta.hl", b"define_size = 8, a.png\n".to_vec()), ("a.png", b"nope".to_vec())],
        );

        assert!(matches!(
            load_shape(&path, false, &Logger::default()),
            Err(CursorError::Decode(_))
        ));
    }

    #[test]
    fn test_load_theme() {
        let fixture = ThemeFixture::new("Test")
            .raster("left_ptr", "", &[(24, RED)])
            .raster("hand2", "define_override = pointer\n", &[(24, GREEN)]);
        fs::write(fixture.shapes_dir().join("README"), "not an archive").unwrap();

        let theme = load_theme(&fixture.root, false, &Logger::default()).unwrap();
        assert_eq!(theme.info.manifest.name, "Test");
        let names: Vec<_> = theme.shapes.iter().map(|s| s.shape.name.as_str()).collect();
        assert_eq!(names, vec!["hand2", "left_ptr"]);
    }

    #[test]
    fn test_theme_without_shapes_fails() {
        let fixture = ThemeFixture::new("Empty");
        assert!(load_theme(&fixture.root, false, &Logger::default()).is_err());
    }

    #[test]
    fn test_one_bad_shape_fails_theme() {
        let fixture = ThemeFixture::new("Mixed")
            .raster("left_ptr", "", &[(24, RED)])
            .shape(
                "wait",
                "define_size = 24, a.png\ndefine_size = b.svg\n",
                vec![("a.png", solid_png(24, RED)), ("b.svg", svg_rect("red"))],
            );

        assert!(load_theme(&fixture.root, false, &Logger::default()).is_err());
    }
}
