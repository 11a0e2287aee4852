//! Resampling cache
//!
//! Owns every shape of a loaded theme together with its images. Native
//! images live as long as the cache. Artificial images are synthesized by
//! [`ResamplingCache::load_style`] for one requested size and dropped again
//! by [`ResamplingCache::release_style`] with the same size.
//!
//! No record of loaded styles is kept. A failing `load_style` leaves the
//! shapes processed before the failure with their new images in place.

use image::RgbaImage;

use crate::archive::{LoadedTheme, ThemeInfo};
use crate::error::{CursorError, CursorResult};
use crate::log::Logger;
use crate::raster;
use crate::shape::{LoadedImage, LoadedShape, ResizeAlgorithm, ShapeType};

/// One frame returned by a shape query
#[derive(Debug, Clone, Copy)]
pub struct CursorImage<'a> {
    /// Borrowed until the style this frame belongs to is released
    pub surface: &'a RgbaImage,
    pub size: u32,
    pub delay_ms: u32,
    pub hotspot_x: i32,
    pub hotspot_y: i32,
}

/// Frames of one shape at one size, in animation order
#[derive(Debug, Clone, Default)]
pub struct ShapeData<'a> {
    pub images: Vec<CursorImage<'a>>,
}

impl<'a> ShapeData<'a> {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }
}

/// Metadata-level view of a shape, without rendering
#[derive(Debug, Clone, PartialEq)]
pub struct RawShapeData {
    /// Native images as declared. Empty when `overridden_by` is set.
    pub images: Vec<RawImage>,
    pub hotspot_x: f32,
    pub hotspot_y: f32,
    pub resize_algorithm: ResizeAlgorithm,
    pub shape_type: ShapeType,
    /// Set when the queried name is an alias of another shape
    pub overridden_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub filename: String,
    pub size: u32,
    pub delay_ms: u32,
    pub shape_type: ShapeType,
    /// Encoded bytes, if retained
    pub data: Option<Vec<u8>>,
}

/// Pick the native side to resample from: the smallest side not below
/// `size`, else the closest one.
pub fn select_leader(sides: impl IntoIterator<Item = u32>, size: u32) -> Option<u32> {
    let sides: Vec<u32> = sides.into_iter().collect();

    sides
        .iter()
        .copied()
        .filter(|&side| side >= size)
        .min()
        .or_else(|| nearest_side(sides.iter().copied(), size))
}

/// Side with the smallest distance to `size`. Ties go to the first side seen.
pub fn nearest_side(sides: impl IntoIterator<Item = u32>, size: u32) -> Option<u32> {
    let mut best: Option<(u32, u32)> = None;

    for side in sides {
        let distance = side.abs_diff(size);
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((side, distance)),
        }
    }

    best.map(|(side, _)| side)
}

/// Shape table of a loaded theme plus its size-keyed artificial images
#[derive(Debug)]
pub struct ResamplingCache {
    info: ThemeInfo,
    shapes: Vec<LoadedShape>,
}

impl ResamplingCache {
    pub fn new(theme: LoadedTheme) -> Self {
        Self {
            info: theme.info,
            shapes: theme.shapes,
        }
    }

    pub fn info(&self) -> &ThemeInfo {
        &self.info
    }

    pub fn shapes(&self) -> &[LoadedShape] {
        &self.shapes
    }

    /// Shape by identity, else the first shape listing `name` as an override
    pub fn resolve(&self, name: &str) -> Option<&LoadedShape> {
        self.shapes
            .iter()
            .find(|s| s.shape.name == name)
            .or_else(|| self.shapes.iter().find(|s| s.shape.is_alias(name)))
    }

    /// Synthesize images at `size` for every shape that supports resampling.
    ///
    /// Shapes that already hold an image of that size are left alone, so a
    /// repeated call is a no-op.
    pub fn load_style(&mut self, size: u32, logger: &Logger) -> CursorResult<()> {
        if size == 0 {
            log!(logger, Trace, "load_style called with size 0, nothing to do");
            return Ok(());
        }

        for loaded in self.shapes.iter_mut() {
            if !loaded.shape.is_resampled() || loaded.has_side(size) {
                continue;
            }

            let frames = match loaded.shape.shape_type {
                ShapeType::Raster => resample_raster(loaded, size, logger)?,
                ShapeType::Vector => render_vector(loaded, size)?,
            };
            loaded.images.extend(frames);
        }

        Ok(())
    }

    /// Query the frames of `name` at `size`.
    ///
    /// Unknown names give an empty result. Exact sizes are served as is;
    /// otherwise the nearest loaded size is used, except for raster shapes
    /// that do not resample, where a miss is an error.
    pub fn get_shape(&self, name: &str, size: u32, logger: &Logger) -> CursorResult<ShapeData<'_>> {
        let Some(loaded) = self.resolve(name) else {
            log!(logger, Trace, "no shape or override named {}", name);
            return Ok(ShapeData::default());
        };
        let shape = &loaded.shape;

        let renderable = || loaded.images.iter().filter(|i| i.is_renderable());

        let side = if renderable().any(|i| i.side == size) {
            size
        } else if shape.shape_type == ShapeType::Raster
            && shape.resize_algorithm == ResizeAlgorithm::None
        {
            return Err(CursorError::ContractViolation {
                shape: shape.name.clone(),
                size,
            });
        } else {
            let nearest = nearest_side(renderable().map(|i| i.side), size)
                .ok_or_else(|| CursorError::NoCandidate(shape.name.clone()))?;
            log!(
                logger,
                Trace,
                "shape {} has no {}px image, serving {}px",
                shape.name,
                size,
                nearest
            );
            nearest
        };

        let images = renderable()
            .filter(|i| i.side == side)
            .filter_map(|image| {
                let surface = image.surface.as_ref()?;
                let (hotspot_x, hotspot_y) = shape.hotspot_for(image.side);
                Some(CursorImage {
                    surface,
                    size: image.side,
                    delay_ms: image.delay_ms,
                    hotspot_x,
                    hotspot_y,
                })
            })
            .collect();

        Ok(ShapeData { images })
    }

    /// Drop the artificial images created for `size`.
    ///
    /// `size == 0` drops every artificial image. Raster shapes also lose any
    /// entry with a zero side.
    pub fn release_style(&mut self, size: u32, logger: &Logger) {
        for loaded in self.shapes.iter_mut().filter(|s| s.shape.is_resampled()) {
            let raster = loaded.shape.shape_type == ShapeType::Raster;
            let before = loaded.images.len();

            loaded.images.retain(|image| {
                let released = image.artificial && (size == 0 || image.side == size);
                let malformed = raster && image.side == 0;
                !(released || malformed)
            });

            let dropped = before - loaded.images.len();
            if dropped > 0 {
                log!(
                    logger,
                    Trace,
                    "released {} images of shape {}",
                    dropped,
                    loaded.shape.name
                );
            }
        }
    }

    /// Declared metadata of `name`, or a pointer to the shape it aliases
    pub fn raw_shape_data(&self, name: &str) -> Option<RawShapeData> {
        if let Some(loaded) = self.shapes.iter().find(|s| s.shape.name == name) {
            let shape = &loaded.shape;
            let images = loaded
                .images
                .iter()
                .filter(|image| !image.artificial)
                .filter_map(|image| {
                    let decl = shape.images.get(image.decl?)?;
                    Some(RawImage {
                        filename: decl.filename.clone(),
                        size: decl.size,
                        delay_ms: decl.delay_ms,
                        shape_type: shape.shape_type,
                        data: image.data.clone(),
                    })
                })
                .collect();

            return Some(RawShapeData {
                images,
                hotspot_x: shape.hotspot_x,
                hotspot_y: shape.hotspot_y,
                resize_algorithm: shape.resize_algorithm,
                shape_type: shape.shape_type,
                overridden_by: None,
            });
        }

        let target = self.shapes.iter().find(|s| s.shape.is_alias(name))?;
        Some(RawShapeData {
            images: Vec::new(),
            hotspot_x: target.shape.hotspot_x,
            hotspot_y: target.shape.hotspot_y,
            resize_algorithm: target.shape.resize_algorithm,
            shape_type: target.shape.shape_type,
            overridden_by: Some(target.shape.name.clone()),
        })
    }
}

/// Scale every native frame of the leader side to `size`
fn resample_raster(
    loaded: &LoadedShape,
    size: u32,
    logger: &Logger,
) -> CursorResult<Vec<LoadedImage>> {
    let natives = || {
        loaded
            .images
            .iter()
            .filter(|i| !i.artificial && i.side > 0)
            .filter_map(|i| i.surface.as_ref().map(|surface| (i, surface)))
    };

    let Some(leader) = select_leader(natives().map(|(i, _)| i.side), size) else {
        log!(
            logger,
            Warn,
            "shape {} has no native image to resample",
            loaded.shape.name
        );
        return Ok(Vec::new());
    };

    log!(
        logger,
        Trace,
        "resampling shape {} from {}px to {}px ({})",
        loaded.shape.name,
        leader,
        size,
        loaded.shape.resize_algorithm.as_str()
    );

    natives()
        .filter(|(image, _)| image.side == leader)
        .map(|(image, surface)| {
            let scaled = raster::resample(surface, leader, size, loaded.shape.resize_algorithm)
                .map_err(|e| {
                    CursorError::Decode(format!("shape {} at {}px: {}", loaded.shape.name, size, e))
                })?;
            Ok(LoadedImage::artificial(size, image.delay_ms, scaled))
        })
        .collect()
}

/// Render every native vector frame at exactly `size`
fn render_vector(loaded: &LoadedShape, size: u32) -> CursorResult<Vec<LoadedImage>> {
    loaded
        .images
        .iter()
        .filter(|i| !i.artificial)
        .filter_map(|i| i.data.as_deref().map(|data| (i, data)))
        .map(|(image, data)| {
            let surface = raster::render_svg(data, size).map_err(|e| {
                CursorError::Decode(format!("shape {} at {}px: {}", loaded.shape.name, size, e))
            })?;
            Ok(LoadedImage::artificial(size, image.delay_ms, surface))
        })
        .collect()
}
