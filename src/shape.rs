//! Shape data model
//!
//! A [`Shape`] is the static description of one cursor shape as declared by
//! its metadata. A [`LoadedShape`] pairs it with the images currently held in
//! memory, native ones from the archive and artificial ones synthesized for a
//! requested size.

use image::RgbaImage;

use crate::error::{CursorError, CursorResult};
use crate::log::Logger;
use crate::meta::ShapeMeta;

/// How raster images are rescaled to sizes the theme does not ship
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeAlgorithm {
    /// Never resample; only native sizes are served
    None = 0,
    #[default]
    Nearest = 1,
    Bilinear = 2,
}

impl ResizeAlgorithm {
    /// Map a metadata value. Unrecognized names fall back to bilinear.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "none" => ResizeAlgorithm::None,
            "nearest" => ResizeAlgorithm::Nearest,
            _ => ResizeAlgorithm::Bilinear,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResizeAlgorithm::None => "none",
            ResizeAlgorithm::Nearest => "nearest",
            ResizeAlgorithm::Bilinear => "bilinear",
        }
    }
}

/// Image kind of a shape, uniform across all its images
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Raster = 0,
    Vector = 1,
}

impl ShapeType {
    /// Infer from a file name. `None` for unknown extensions.
    pub fn from_filename(filename: &str) -> Option<Self> {
        if filename.ends_with(".svg") {
            Some(ShapeType::Vector)
        } else if filename.ends_with(".png") {
            Some(ShapeType::Raster)
        } else {
            None
        }
    }
}

/// One `define_size` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDecl {
    pub filename: String,
    /// Nominal side in pixels, 0 for vector images
    pub size: u32,
    pub delay_ms: u32,
}

/// Static description of a cursor shape
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Archive stem, unique within a theme
    pub name: String,
    /// Hotspot as a fraction of the image side (0-1)
    pub hotspot_x: f32,
    pub hotspot_y: f32,
    pub resize_algorithm: ResizeAlgorithm,
    pub shape_type: ShapeType,
    pub images: Vec<ImageDecl>,
    /// Alias names that resolve to this shape
    pub overrides: Vec<String>,
}

impl Shape {
    /// Build a shape from parsed metadata, enforcing a uniform image type
    pub fn from_meta(
        name: impl Into<String>,
        meta: ShapeMeta,
        logger: &Logger,
    ) -> CursorResult<Self> {
        let name = name.into();
        let mut shape_type = None;

        for decl in &meta.sizes {
            let kind = ShapeType::from_filename(&decl.filename).unwrap_or_else(|| {
                log!(
                    logger,
                    Warn,
                    "image {} of shape {} has no known extension, assuming png",
                    decl.filename,
                    name
                );
                ShapeType::Raster
            });

            match shape_type {
                None => shape_type = Some(kind),
                Some(established) if established != kind => {
                    return Err(CursorError::Parse(format!(
                        "meta invalid: shape {} mixes raster and vector images ({})",
                        name, decl.filename
                    )));
                }
                Some(_) => {}
            }
        }

        let shape_type = shape_type.ok_or_else(|| {
            CursorError::Parse(format!("meta invalid: no images for shape {}", name))
        })?;

        Ok(Self {
            name,
            hotspot_x: meta.hotspot_x,
            hotspot_y: meta.hotspot_y,
            resize_algorithm: meta.resize_algorithm,
            shape_type,
            images: meta.sizes,
            overrides: meta.overrides,
        })
    }

    /// Whether style loads synthesize images for this shape
    pub fn is_resampled(&self) -> bool {
        self.resize_algorithm != ResizeAlgorithm::None || self.shape_type == ShapeType::Vector
    }

    /// Whether `name` is one of this shape's override aliases
    pub fn is_alias(&self, name: &str) -> bool {
        self.overrides.iter().any(|o| o == name)
    }

    /// Pixel hotspot for an image of the given side
    pub fn hotspot_for(&self, side: u32) -> (i32, i32) {
        (
            (self.hotspot_x * side as f32).round() as i32,
            (self.hotspot_y * side as f32).round() as i32,
        )
    }
}

/// Runtime form of one image
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Raw bytes. Dropped after raster decode unless retained on request;
    /// always kept for vector images.
    pub data: Option<Vec<u8>>,
    /// Side in pixels, 0 for vector originals
    pub side: u32,
    pub delay_ms: u32,
    /// Synthesized by a style load rather than read from the archive
    pub artificial: bool,
    /// Decoded pixels, present for raster natives and every artificial image
    pub surface: Option<RgbaImage>,
    /// Index into [`Shape::images`] for native images
    pub decl: Option<usize>,
}

impl LoadedImage {
    pub fn native_raster(
        decl: usize,
        side: u32,
        delay_ms: u32,
        surface: RgbaImage,
        data: Option<Vec<u8>>,
    ) -> Self {
        Self {
            data,
            side,
            delay_ms,
            artificial: false,
            surface: Some(surface),
            decl: Some(decl),
        }
    }

    pub fn native_vector(decl: usize, delay_ms: u32, data: Vec<u8>) -> Self {
        Self {
            data: Some(data),
            side: 0,
            delay_ms,
            artificial: false,
            surface: None,
            decl: Some(decl),
        }
    }

    pub fn artificial(side: u32, delay_ms: u32, surface: RgbaImage) -> Self {
        Self {
            data: None,
            side,
            delay_ms,
            artificial: true,
            surface: Some(surface),
            decl: None,
        }
    }

    pub fn is_renderable(&self) -> bool {
        self.surface.is_some()
    }
}

/// A shape together with the images currently in memory
#[derive(Debug, Clone)]
pub struct LoadedShape {
    pub shape: Shape,
    pub images: Vec<LoadedImage>,
}

impl LoadedShape {
    pub fn new(shape: Shape, images: Vec<LoadedImage>) -> Self {
        Self { shape, images }
    }

    /// Number of artificial images currently held
    pub fn artificial_count(&self) -> usize {
        self.images.iter().filter(|i| i.artificial).count()
    }

    pub fn has_side(&self, side: u32) -> bool {
        self.images
            .iter()
            .any(|i| i.side == side && i.is_renderable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(filename: &str, size: u32) -> ImageDecl {
        ImageDecl {
            filename: filename.to_string(),
            size,
            delay_ms: 200,
        }
    }

    fn meta(sizes: Vec<ImageDecl>) -> ShapeMeta {
        ShapeMeta {
            sizes,
            ..ShapeMeta::default()
        }
    }

    #[test]
    fn test_resize_algorithm_mapping() {
        assert_eq!(ResizeAlgorithm::from_name("none"), ResizeAlgorithm::None);
        assert_eq!(ResizeAlgorithm::from_name("nearest"), ResizeAlgorithm::Nearest);
        assert_eq!(ResizeAlgorithm::from_name("bilinear"), ResizeAlgorithm::Bilinear);
        assert_eq!(ResizeAlgorithm::from_name("lanczos"), ResizeAlgorithm::Bilinear);
        assert_eq!(ResizeAlgorithm::default(), ResizeAlgorithm::Nearest);
    }

    #[test]
    fn test_shape_type_is_inferred() {
        let logger = Logger::default();
        let shape = Shape::from_meta("wait", meta(vec![decl("a.svg", 0)]), &logger).unwrap();
        assert_eq!(shape.shape_type, ShapeType::Vector);
        assert!(shape.is_resampled());

        let shape = Shape::from_meta("wait", meta(vec![decl("a.png", 24)]), &logger).unwrap();
        assert_eq!(shape.shape_type, ShapeType::Raster);
    }

    #[test]
    fn test_mixed_types_are_rejected() {
        let logger = Logger::default();
        let err = Shape::from_meta(
            "wait",
            meta(vec![decl("a.png", 24), decl("b.svg", 0)]),
            &logger,
        )
        .unwrap_err();
        assert!(matches!(err, CursorError::Parse(_)));
    }

    #[test]
    fn test_unknown_extension_is_raster() {
        let logger = Logger::default();
        let shape = Shape::from_meta(
            "wait",
            meta(vec![decl("a.bmp", 24), decl("b.png", 32)]),
            &logger,
        )
        .unwrap();
        assert_eq!(shape.shape_type, ShapeType::Raster);
    }

    #[test]
    fn test_shape_without_images_is_rejected() {
        let logger = Logger::default();
        let err = Shape::from_meta("empty", meta(Vec::new()), &logger).unwrap_err();
        assert!(err.to_string().contains("no images"));
    }

    #[test]
    fn test_hotspot_scaling() {
        let logger = Logger::default();
        let mut shape = Shape::from_meta("hand", meta(vec![decl("a.png", 24)]), &logger).unwrap();
        shape.hotspot_x = 0.5;
        shape.hotspot_y = 0.5;

        assert_eq!(shape.hotspot_for(48), (24, 24));
        assert_eq!(shape.hotspot_for(96), (48, 48));

        shape.hotspot_x = 0.3;
        assert_eq!(shape.hotspot_for(24).0, 7);
    }

    #[test]
    fn test_none_raster_is_not_resampled() {
        let logger = Logger::default();
        let mut shape = Shape::from_meta("hand", meta(vec![decl("a.png", 24)]), &logger).unwrap();
        shape.resize_algorithm = ResizeAlgorithm::None;
        assert!(!shape.is_resampled());
    }
}
