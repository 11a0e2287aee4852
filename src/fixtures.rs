//! On-disk theme fixtures for tests

use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::config::{ManagerOptions, ThemeSearchPaths};

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];

/// Encoded PNG of a single-color square
pub fn solid_png(side: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(side, side, Rgba(color));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// SVG document of a filled square
pub fn svg_rect(fill: &str) -> Vec<u8> {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" "#,
            r#"width="32" height="32" viewBox="0 0 32 32">"#,
            r#"<rect x="0" y="0" width="32" height="32" fill="{}"/></svg>"#,
        ),
        fill
    )
    .into_bytes()
}

pub fn write_archive(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, data) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

/// A theme under `<tmp>/icons/<dir>` with a `hyprcursors` shapes directory
pub struct ThemeFixture {
    _dir: TempDir,
    pub icons: PathBuf,
    pub root: PathBuf,
}

impl ThemeFixture {
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let icons = dir.path().join("icons");
        let root = icons.join(name);
        fs::create_dir_all(root.join("hyprcursors")).unwrap();
        fs::write(
            root.join("manifest.hl"),
            format!("name = {}\ndescription = test theme\ncursors_directory = hyprcursors\n", name),
        )
        .unwrap();

        Self {
            _dir: dir,
            icons,
            root,
        }
    }

    pub fn shapes_dir(&self) -> PathBuf {
        self.root.join("hyprcursors")
    }

    /// Add `<shape>.hlc` holding `meta.hl` and the given images
    pub fn shape(self, name: &str, meta: &str, images: Vec<(&str, Vec<u8>)>) -> Self {
        let mut entries = vec![("meta.hl", meta.as_bytes().to_vec())];
        entries.extend(images);
        write_archive(&self.shapes_dir().join(format!("{}.hlc", name)), &entries);
        self
    }

    /// Raster shape with one solid frame per `(side, color)`
    pub fn raster(self, name: &str, extra_meta: &str, frames: &[(u32, [u8; 4])]) -> Self {
        let mut meta = String::from(extra_meta);
        let mut images = Vec::new();
        for (i, (side, color)) in frames.iter().enumerate() {
            let file = format!("{}_{}_{}.png", name, side, i);
            meta.push_str(&format!("define_size = {}, {}\n", side, file));
            images.push((file, solid_png(*side, *color)));
        }

        let images = images
            .iter()
            .map(|(file, data)| (file.as_str(), data.clone()))
            .collect();
        self.shape(name, &meta, images)
    }

    pub fn search_paths(&self) -> ThemeSearchPaths {
        ThemeSearchPaths::new(vec![self.icons.clone()], Vec::new())
    }

    pub fn options(&self) -> ManagerOptions {
        ManagerOptions::default().with_search_paths(self.search_paths())
    }
}
