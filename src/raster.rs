//! Rendering backends
//!
//! Raster decode goes through the `png` streaming decoder, scaling and
//! compositing through `image`, and vector shapes are rendered with `resvg`.
//! Every surface handed out by this module is 8-bit straight-alpha RGBA.

use std::io::{self, Read};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};

use crate::error::{CursorError, CursorResult};
use crate::shape::ResizeAlgorithm;

/// Forward-only byte source for the PNG decoder.
///
/// Owns the encoded buffer and releases it as soon as the read cursor
/// reaches the end, so decoded images do not keep their compressed form
/// alive.
#[derive(Debug)]
pub struct PngStream {
    data: Vec<u8>,
    position: usize,
}

impl PngStream {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl Read for PngStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.position >= self.data.len() {
            if self.data.capacity() > 0 {
                self.data = Vec::new();
                self.position = 0;
            }
            return Ok(0);
        }

        let n = buf.len().min(self.data.len() - self.position);
        buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
        self.position += n;
        Ok(n)
    }
}

/// Decode a PNG buffer into an RGBA surface
pub fn decode_png(data: Vec<u8>) -> CursorResult<RgbaImage> {
    let mut decoder = png::Decoder::new(PngStream::new(data));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

    let mut reader = decoder
        .read_info()
        .map_err(|e| CursorError::Decode(format!("png header: {}", e)))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| CursorError::Decode(format!("png frame: {}", e)))?;
    buf.truncate(info.buffer_size());

    let rgba = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], u8::MAX])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, u8::MAX]).collect(),
        png::ColorType::Indexed => {
            return Err(CursorError::Decode(
                "png palette was not expanded".to_string(),
            ))
        }
    };

    RgbaImage::from_raw(info.width, info.height, rgba).ok_or_else(|| {
        CursorError::Decode(format!(
            "png buffer does not match {}x{}",
            info.width, info.height
        ))
    })
}

/// Largest side a synthesized surface may have
pub const MAX_SURFACE_SIDE: u32 = 4096;

/// Transparent `size x size` surface, refusing sizes no cursor can have
fn blank_surface(size: u32) -> CursorResult<RgbaImage> {
    let fits = size <= MAX_SURFACE_SIDE
        && (size as usize)
            .checked_mul(size as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .is_some();

    if !fits {
        return Err(CursorError::Decode(format!(
            "cannot allocate {}x{} surface (limit {})",
            size, size, MAX_SURFACE_SIDE
        )));
    }

    Ok(RgbaImage::new(size, size))
}

/// Scale `source` by `size / leader_side` onto a transparent `size x size`
/// canvas anchored at the top-left corner
pub fn resample(
    source: &RgbaImage,
    leader_side: u32,
    size: u32,
    algorithm: ResizeAlgorithm,
) -> CursorResult<RgbaImage> {
    let mut canvas = blank_surface(size)?;
    if leader_side == 0 || size == 0 {
        return Ok(canvas);
    }

    let scale = size as f64 / leader_side as f64;
    let width = ((source.width() as f64 * scale).round() as u32).max(1);
    let height = ((source.height() as f64 * scale).round() as u32).max(1);

    let filter = match algorithm {
        ResizeAlgorithm::Bilinear => FilterType::Triangle,
        ResizeAlgorithm::Nearest | ResizeAlgorithm::None => FilterType::Nearest,
    };

    let scaled = imageops::resize(source, width, height, filter);
    imageops::replace(&mut canvas, &scaled, 0, 0);
    Ok(canvas)
}

/// Render an SVG document stretched over a `size x size` surface
pub fn render_svg(data: &[u8], size: u32) -> CursorResult<RgbaImage> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default())
        .map_err(|e| CursorError::Decode(format!("svg parse: {}", e)))?;

    let mut surface = blank_surface(size)?;
    let mut pixmap = tiny_skia::Pixmap::new(size, size).ok_or_else(|| {
        CursorError::Decode(format!("cannot allocate {}x{} pixmap", size, size))
    })?;

    let tree_size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        size as f32 / tree_size.width(),
        size as f32 / tree_size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    for (dst, src) in surface.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{solid_png, svg_rect, RED, BLUE};

    #[test]
    fn test_stream_releases_buffer_at_end() {
        let mut stream = PngStream::new(vec![1, 2, 3]);
        let mut buf = [0u8; 2];

        assert_eq!(stream.read(&mut buf).unwrap(), 2);
        assert_eq!(stream.remaining(), 1);
        assert_eq!(stream.read(&mut buf).unwrap(), 1);
        assert!(stream.is_exhausted());
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
        assert_eq!(stream.data.capacity(), 0);
    }

    #[test]
    fn test_decode_png() {
        let surface = decode_png(solid_png(16, RED)).unwrap();
        assert_eq!(surface.dimensions(), (16, 16));
        assert_eq!(surface.get_pixel(7, 7).0, RED);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode_png(b"definitely not a png".to_vec()).unwrap_err();
        assert!(matches!(err, CursorError::Decode(_)));
    }

    #[test]
    fn test_resample_scales_onto_canvas() {
        let source = decode_png(solid_png(32, BLUE)).unwrap();

        let up = resample(&source, 32, 48, ResizeAlgorithm::Nearest).unwrap();
        assert_eq!(up.dimensions(), (48, 48));
        assert_eq!(up.get_pixel(47, 47).0, BLUE);

        let down = resample(&source, 32, 16, ResizeAlgorithm::Bilinear).unwrap();
        assert_eq!(down.dimensions(), (16, 16));
        assert_eq!(down.get_pixel(8, 8).0, BLUE);
    }

    #[test]
    fn test_resample_keeps_non_square_frames_anchored() {
        let source = RgbaImage::from_pixel(16, 8, Rgba(RED));
        let out = resample(&source, 16, 32, ResizeAlgorithm::Nearest).unwrap();

        assert_eq!(out.get_pixel(0, 0).0, RED);
        assert_eq!(out.get_pixel(0, 31).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_oversized_surface_is_an_error() {
        let source = decode_png(solid_png(16, RED)).unwrap();
        assert!(matches!(
            resample(&source, 16, u32::MAX, ResizeAlgorithm::Nearest),
            Err(CursorError::Decode(_))
        ));
        assert!(resample(&source, 16, MAX_SURFACE_SIDE + 1, ResizeAlgorithm::Bilinear).is_err());
        assert!(render_svg(&svg_rect("red"), u32::MAX).is_err());
    }

    #[test]
    fn test_render_svg_fills_target() {
        let surface = render_svg(&svg_rect("#ff0000"), 40).unwrap();
        assert_eq!(surface.dimensions(), (40, 40));
        assert_eq!(surface.get_pixel(20, 20).0, RED);
    }

    #[test]
    fn test_render_invalid_svg_fails() {
        assert!(matches!(
            render_svg(b"<svg", 24),
            Err(CursorError::Decode(_))
        ));
    }
}
