//! hyprcursor - cursor theme loading library
//!
//! Resolves a cursor theme on disk, loads its shape archives and serves
//! cursor images at any requested size, resampling on demand.

#[macro_use]
extern crate lalrpop_util;

// Loaded first so the log! macro is visible to every other module
#[macro_use]
pub mod log;

pub mod error;
pub mod config;

// Metadata parsing
pub mod directive;
pub mod manifest;
pub mod meta;

pub mod shape;
pub mod resolver;
pub mod raster;
pub mod archive;
pub mod cache;
pub mod manager;

// C ABI
pub mod capi;

#[cfg(test)]
mod fixtures;

pub use archive::ThemeInfo;
pub use cache::{CursorImage, RawImage, RawShapeData, ShapeData};
pub use config::{ManagerOptions, ThemeSearchPaths};
pub use error::{CursorError, CursorResult};
pub use log::{LogFn, LogLevel};
pub use manager::{CursorManager, StyleInfo};
pub use manifest::Manifest;
pub use shape::{ResizeAlgorithm, ShapeType};
