//! Shape metadata reader (`meta.hl` / `meta.toml`)
//!
//! Directives are applied to a [`ShapeMeta`] one at a time. The two
//! repeatable directives go through [`parse_define_size`] and
//! [`parse_override`] regardless of the source syntax.

use crate::directive::{self, Directive, Schema, Syntax};
use crate::error::{CursorError, CursorResult};
use crate::shape::{ImageDecl, ResizeAlgorithm};

/// Base name of the metadata entry inside a shape archive
pub const META_STEM: &str = "meta";

/// Frame delay used when `define_size` omits one
pub const DEFAULT_DELAY_MS: u32 = 200;

const SCHEMA: Schema = Schema {
    values: &["hotspot_x", "hotspot_y", "resize_algorithm"],
    repeatable: &["define_size", "define_override"],
};

/// Parsed per-shape metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMeta {
    pub hotspot_x: f32,
    pub hotspot_y: f32,
    pub resize_algorithm: ResizeAlgorithm,
    pub sizes: Vec<ImageDecl>,
    pub overrides: Vec<String>,
}

impl Default for ShapeMeta {
    fn default() -> Self {
        Self {
            hotspot_x: 0.0,
            hotspot_y: 0.0,
            resize_algorithm: ResizeAlgorithm::Nearest,
            sizes: Vec::new(),
            overrides: Vec::new(),
        }
    }
}

impl ShapeMeta {
    /// Parse metadata source in the given syntax
    pub fn parse(source: &str, syntax: Syntax) -> CursorResult<Self> {
        let directives = directive::parse(source, syntax, &SCHEMA)?;

        directives
            .into_iter()
            .try_fold(Self::default(), |meta, directive| meta.apply(directive))
    }

    fn apply(mut self, directive: Directive) -> CursorResult<Self> {
        let value = directive.value.as_str();
        let fail = |message: String| {
            CursorError::Parse(format!("{}{}", message, directive.location()))
        };

        match directive.key.as_str() {
            "hotspot_x" => self.hotspot_x = parse_hotspot(value).map_err(fail)?,
            "hotspot_y" => self.hotspot_y = parse_hotspot(value).map_err(fail)?,
            "resize_algorithm" => self.resize_algorithm = ResizeAlgorithm::from_name(value),
            "define_size" => self.sizes.push(parse_define_size(value).map_err(fail)?),
            "define_override" => self.overrides.push(parse_override(value).map_err(fail)?),
            _ => {}
        }

        Ok(self)
    }
}

fn parse_hotspot(value: &str) -> Result<f32, String> {
    let parsed: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid hotspot value '{}'", value))?;

    if !parsed.is_finite() {
        return Err(format!("invalid hotspot value '{}'", value));
    }

    Ok(parsed.clamp(0.0, 1.0))
}

/// Handle one `define_size = <size>, <file>[, <delay>]` value.
///
/// The size may be omitted for `.svg` files, and is ignored for them.
pub fn parse_define_size(value: &str) -> Result<ImageDecl, String> {
    let fields: Vec<&str> = value.split(',').map(str::trim).collect();

    let (size_field, filename, delay_field) = match fields.as_slice() {
        [file] => (None, *file, None),
        [size, file] => (Some(*size), *file, None),
        [size, file, delay] => (Some(*size), *file, Some(*delay)),
        _ => return Err(format!("Invalid define_size '{}'", value)),
    };

    if !is_valid_filename(filename) {
        return Err(format!(
            "Invalid cursor file name '{}', characters must be within [A-Za-z0-9_.-] \
             (if this seems like a mistake, check for invisible characters)",
            filename
        ));
    }

    let delay_ms = match delay_field {
        Some(delay) => delay
            .parse::<u32>()
            .map_err(|_| format!("Invalid delay '{}' in define_size", delay))?,
        None => DEFAULT_DELAY_MS,
    };

    let size = if filename.ends_with(".svg") {
        0
    } else {
        let size = size_field
            .ok_or_else(|| format!("Invalid define_size '{}', missing size", value))?;
        size.parse::<u32>()
            .map_err(|_| format!("Invalid size '{}' in define_size", size))?
    };

    Ok(ImageDecl {
        filename: filename.to_string(),
        size,
        delay_ms,
    })
}

/// Handle one `define_override = <alias>` value
pub fn parse_override(value: &str) -> Result<String, String> {
    let alias = value.trim();
    if alias.is_empty() {
        return Err("Invalid define_override, alias is empty".to_string());
    }
    Ok(alias.to_string())
}

fn is_valid_filename(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
