//! Cursor manager
//!
//! Entry point for host applications. A manager resolves and loads one
//! theme when it is created. If anything goes wrong during that, it stays
//! invalid for good and every later call fails with
//! [`CursorError::InvalidManager`].

use std::path::Path;

use crate::archive::{load_theme, ThemeInfo};
use crate::cache::{RawShapeData, ResamplingCache, ShapeData};
use crate::config::{theme_name_from_env, ManagerOptions, ThemeSearchPaths};
use crate::error::{CursorError, CursorResult};
use crate::log::{LogFn, Logger};
use crate::resolver::ThemeResolver;

/// Requested cursor style. A size of 0 means unspecified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StyleInfo {
    pub size: u32,
}

impl StyleInfo {
    pub fn new(size: u32) -> Self {
        Self { size }
    }
}

/// Loaded cursor theme
#[derive(Debug)]
pub struct CursorManager {
    cache: Option<ResamplingCache>,
    logger: Logger,
}

impl CursorManager {
    /// Load `theme_name`, or the theme named by `HYPRCURSOR_THEME`, or the
    /// first theme found
    pub fn new(theme_name: Option<&str>) -> Self {
        Self::with_options(theme_name, ManagerOptions::default())
    }

    /// Same as [`CursorManager::new`] with a logging callback installed first
    pub fn with_logger(theme_name: Option<&str>, log_fn: LogFn) -> Self {
        Self::with_options(theme_name, ManagerOptions::default().with_logger(log_fn))
    }

    pub fn with_options(theme_name: Option<&str>, options: ManagerOptions) -> Self {
        let ManagerOptions {
            log_fn,
            allow_default_fallback,
            keep_raw_data,
            search_paths,
        } = options;

        let logger = Logger::new(log_fn);
        let paths = search_paths.unwrap_or_else(ThemeSearchPaths::from_env);
        let requested = theme_name.map(str::to_string).or_else(theme_name_from_env);

        let cache = ThemeResolver::new(paths)
            .resolve(requested.as_deref(), allow_default_fallback, &logger)
            .ok_or_else(|| {
                CursorError::ThemeNotFound(requested.as_deref().unwrap_or("any").to_string())
            })
            .and_then(|root| {
                log!(logger, Info, "found theme at {}", root.display());
                load_theme(&root, keep_raw_data, &logger)
            })
            .map(ResamplingCache::new);

        Self::finish(cache, logger)
    }

    /// Load the theme at `root` directly, skipping resolution
    pub fn from_theme_dir(root: &Path, options: ManagerOptions) -> Self {
        let logger = Logger::new(options.log_fn);
        let cache = load_theme(root, options.keep_raw_data, &logger).map(ResamplingCache::new);
        Self::finish(cache, logger)
    }

    fn finish(cache: CursorResult<ResamplingCache>, logger: Logger) -> Self {
        let cache = match cache {
            Ok(cache) => Some(cache),
            Err(e) => {
                log!(logger, Err, "failed to load cursor theme: {}", e);
                None
            }
        };

        Self { cache, logger }
    }

    /// Whether a theme was loaded. Every other call fails if this is false.
    pub fn valid(&self) -> bool {
        self.cache.is_some()
    }

    /// Location and manifest of the loaded theme
    pub fn theme(&self) -> Option<&ThemeInfo> {
        self.cache.as_ref().map(ResamplingCache::info)
    }

    /// Prepare images of `info.size` for every shape that can be resampled
    pub fn load_theme_style(&mut self, info: StyleInfo) -> CursorResult<()> {
        let cache = self.cache.as_mut().ok_or(CursorError::InvalidManager)?;

        cache.load_style(info.size, &self.logger).map_err(|e| {
            log!(self.logger, Err, "failed to load style {}: {}", info.size, e);
            e
        })
    }

    /// Frames of `shape` at `info.size`. Borrowed surfaces stay valid until
    /// [`CursorManager::style_done`] is called for that size.
    pub fn get_shape(&self, shape: &str, info: StyleInfo) -> CursorResult<ShapeData<'_>> {
        let cache = self.cache.as_ref().ok_or(CursorError::InvalidManager)?;

        cache.get_shape(shape, info.size, &self.logger).map_err(|e| {
            log!(self.logger, Err, "{}", e);
            e
        })
    }

    /// Release the images created for `info.size`
    pub fn style_done(&mut self, info: StyleInfo) {
        if let Some(cache) = self.cache.as_mut() {
            cache.release_style(info.size, &self.logger);
        }
    }

    /// Install, replace or clear (`None`) the logging callback
    pub fn register_logging_function(&mut self, log_fn: Option<LogFn>) {
        self.logger.set_sink(log_fn);
    }

    /// Declared metadata of `shape` without rendering anything
    pub fn raw_shape_data(&self, shape: &str) -> Option<RawShapeData> {
        self.cache.as_ref()?.raw_shape_data(shape)
    }

    pub(crate) fn logger(&self) -> &Logger {
        &self.logger
    }
}
