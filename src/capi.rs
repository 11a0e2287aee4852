//! C interface
//!
//! Thin layer over [`CursorManager`]. Managers are handed out as opaque
//! boxed pointers. Image arrays returned by
//! [`hyprcursor_get_cursor_image_data`] belong to the caller, who frees them
//! with [`hyprcursor_cursor_image_data_free`] before calling
//! [`hyprcursor_style_done`] for the same size. Surfaces point into the
//! manager's memory as tightly packed RGBA8 rows of `size * size` pixels.
//! Raw shape records from [`hyprcursor_get_raw_shape_data`] own copies of
//! everything they point to and are released with
//! [`hyprcursor_raw_shape_data_free`].

#![allow(non_camel_case_types)]

use std::ffi::{c_char, c_int, c_uint, CStr, CString};
use std::ptr;

use crate::cache::{RawShapeData, ShapeData};
use crate::log::{LogFn, LogLevel};
use crate::manager::{CursorManager, StyleInfo};
use crate::shape::{ResizeAlgorithm, ShapeType};

/// Opaque manager handle
pub type hyprcursor_manager_t = CursorManager;

/// Host logging callback. `message` is only valid during the call.
pub type PHYPRCURSORLOGFUNC =
    Option<unsafe extern "C" fn(level: LogLevel, message: *mut c_char)>;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct hyprcursor_cursor_style_info {
    /// 0 means unspecified
    pub size: c_uint,
}

impl From<hyprcursor_cursor_style_info> for StyleInfo {
    fn from(info: hyprcursor_cursor_style_info) -> Self {
        StyleInfo::new(info.size)
    }
}

#[repr(C)]
#[derive(Debug)]
pub struct hyprcursor_cursor_image_data {
    pub surface: *const u8,
    pub size: c_int,
    pub delay: c_int,
    pub hotspot_x: c_int,
    pub hotspot_y: c_int,
}

/// One declared image of a shape. `data` is null unless the manager was
/// created with raw data retention.
#[repr(C)]
#[derive(Debug)]
pub struct hyprcursor_cursor_raw_shape_image {
    pub data: *mut u8,
    pub len: usize,
    pub size: c_int,
    pub delay: c_int,
}

#[repr(C)]
#[derive(Debug)]
pub struct hyprcursor_cursor_raw_shape_data {
    pub images: *mut hyprcursor_cursor_raw_shape_image,
    pub len: usize,
    pub hotspot_x: f32,
    pub hotspot_y: f32,
    /// Shape this name aliases, or null
    pub overridden_by: *mut c_char,
    pub resize_algorithm: ResizeAlgorithm,
    pub shape_type: ShapeType,
}

unsafe fn owned_str(name: *const c_char) -> Option<String> {
    if name.is_null() {
        return None;
    }
    Some(CStr::from_ptr(name).to_string_lossy().into_owned())
}

fn wrap_log_fn(log_fn: PHYPRCURSORLOGFUNC) -> Option<LogFn> {
    let log_fn = log_fn?;
    Some(Box::new(move |level: LogLevel, message: &str| {
        let Ok(message) = CString::new(message) else {
            return;
        };
        let raw = message.into_raw();
        // SAFETY: `raw` comes from `CString::into_raw` and is reclaimed right
        // after the callback returns.
        unsafe {
            log_fn(level, raw);
            drop(CString::from_raw(raw));
        }
    }))
}

/// Move query results into a caller-owned array of boxed records
fn image_array(data: &ShapeData<'_>) -> (*mut *mut hyprcursor_cursor_image_data, usize) {
    if data.is_empty() {
        return (ptr::null_mut(), 0);
    }

    let records: Box<[*mut hyprcursor_cursor_image_data]> = data
        .images
        .iter()
        .map(|image| {
            Box::into_raw(Box::new(hyprcursor_cursor_image_data {
                surface: image.surface.as_raw().as_ptr(),
                size: image.size as c_int,
                delay: image.delay_ms as c_int,
                hotspot_x: image.hotspot_x,
                hotspot_y: image.hotspot_y,
            }))
        })
        .collect();

    let len = records.len();
    (Box::into_raw(records) as *mut *mut hyprcursor_cursor_image_data, len)
}

/// Copy raw shape data into a caller-owned record
fn raw_shape_record(raw: RawShapeData) -> *mut hyprcursor_cursor_raw_shape_data {
    let images: Box<[hyprcursor_cursor_raw_shape_image]> = raw
        .images
        .into_iter()
        .map(|image| {
            let (data, len) = match image.data {
                Some(bytes) => {
                    let bytes = bytes.into_boxed_slice();
                    let len = bytes.len();
                    (Box::into_raw(bytes) as *mut u8, len)
                }
                None => (ptr::null_mut(), 0),
            };
            hyprcursor_cursor_raw_shape_image {
                data,
                len,
                size: image.size as c_int,
                delay: image.delay_ms as c_int,
            }
        })
        .collect();

    let len = images.len();
    let images = if len == 0 {
        ptr::null_mut()
    } else {
        Box::into_raw(images) as *mut hyprcursor_cursor_raw_shape_image
    };

    let overridden_by = raw
        .overridden_by
        .and_then(|name| CString::new(name).ok())
        .map_or(ptr::null_mut(), CString::into_raw);

    Box::into_raw(Box::new(hyprcursor_cursor_raw_shape_data {
        images,
        len,
        hotspot_x: raw.hotspot_x,
        hotspot_y: raw.hotspot_y,
        overridden_by,
        resize_algorithm: raw.resize_algorithm,
        shape_type: raw.shape_type,
    }))
}

/// Create a manager for `theme_name`, or the default theme if null.
///
/// # Safety
/// `theme_name` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn hyprcursor_manager_create(
    theme_name: *const c_char,
) -> *mut hyprcursor_manager_t {
    let name = owned_str(theme_name);
    Box::into_raw(Box::new(CursorManager::new(name.as_deref())))
}

/// Same as [`hyprcursor_manager_create`] with a logger installed first.
///
/// # Safety
/// `theme_name` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn hyprcursor_manager_create_with_logger(
    theme_name: *const c_char,
    log_fn: PHYPRCURSORLOGFUNC,
) -> *mut hyprcursor_manager_t {
    let name = owned_str(theme_name);
    let manager = match wrap_log_fn(log_fn) {
        Some(log_fn) => CursorManager::with_logger(name.as_deref(), log_fn),
        None => CursorManager::new(name.as_deref()),
    };
    Box::into_raw(Box::new(manager))
}

/// # Safety
/// `manager` must be null or come from one of the create functions, and must
/// not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn hyprcursor_manager_free(manager: *mut hyprcursor_manager_t) {
    if !manager.is_null() {
        drop(Box::from_raw(manager));
    }
}

/// # Safety
/// `manager` must be null or a live manager.
#[no_mangle]
pub unsafe extern "C" fn hyprcursor_manager_valid(manager: *mut hyprcursor_manager_t) -> c_int {
    match manager.as_ref() {
        Some(manager) => manager.valid() as c_int,
        None => 0,
    }
}

/// Returns 1 on success.
///
/// # Safety
/// `manager` must be null or a live manager.
#[no_mangle]
pub unsafe extern "C" fn hyprcursor_load_theme_style(
    manager: *mut hyprcursor_manager_t,
    info: hyprcursor_cursor_style_info,
) -> c_int {
    match manager.as_mut() {
        Some(manager) => manager.load_theme_style(info.into()).is_ok() as c_int,
        None => 0,
    }
}

/// Frames of `shape`. Null with `*out_size == 0` when nothing matched.
///
/// # Safety
/// `manager` must be null or a live manager, `shape` null or a valid
/// NUL-terminated string, `out_size` null or writable.
#[no_mangle]
pub unsafe extern "C" fn hyprcursor_get_cursor_image_data(
    manager: *mut hyprcursor_manager_t,
    shape: *const c_char,
    info: hyprcursor_cursor_style_info,
    out_size: *mut c_int,
) -> *mut *mut hyprcursor_cursor_image_data {
    if let Some(out) = out_size.as_mut() {
        *out = 0;
    }

    let (Some(manager), false, false) = (manager.as_ref(), shape.is_null(), out_size.is_null())
    else {
        return ptr::null_mut();
    };

    let shape = CStr::from_ptr(shape).to_string_lossy();
    let Ok(data) = manager.get_shape(&shape, info.into()) else {
        return ptr::null_mut();
    };

    let (array, len) = image_array(&data);
    if len > 0 {
        log!(manager.logger(), Trace, "handing out {} images of {}", len, shape);
    }
    *out_size = len as c_int;
    array
}

/// Free an array returned by [`hyprcursor_get_cursor_image_data`].
///
/// # Safety
/// `data` must be null or an array returned by
/// [`hyprcursor_get_cursor_image_data`] together with its reported size.
#[no_mangle]
pub unsafe extern "C" fn hyprcursor_cursor_image_data_free(
    data: *mut *mut hyprcursor_cursor_image_data,
    size: c_int,
) {
    if data.is_null() || size <= 0 {
        return;
    }

    let records = Box::from_raw(ptr::slice_from_raw_parts_mut(data, size as usize));
    for &record in records.iter() {
        if !record.is_null() {
            drop(Box::from_raw(record));
        }
    }
}

/// Declared metadata of `shape`, or null if the theme has no such name.
///
/// # Safety
/// `manager` must be null or a live manager, `shape` null or a valid
/// NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn hyprcursor_get_raw_shape_data(
    manager: *mut hyprcursor_manager_t,
    shape: *const c_char,
) -> *mut hyprcursor_cursor_raw_shape_data {
    let (Some(manager), Some(shape)) = (manager.as_ref(), owned_str(shape)) else {
        return ptr::null_mut();
    };

    match manager.raw_shape_data(&shape) {
        Some(raw) => raw_shape_record(raw),
        None => ptr::null_mut(),
    }
}

/// Free a record returned by [`hyprcursor_get_raw_shape_data`].
///
/// # Safety
/// `data` must be null or a record returned by
/// [`hyprcursor_get_raw_shape_data`] that was not freed yet.
#[no_mangle]
pub unsafe extern "C" fn hyprcursor_raw_shape_data_free(
    data: *mut hyprcursor_cursor_raw_shape_data,
) {
    if data.is_null() {
        return;
    }

    let record = Box::from_raw(data);
    if !record.images.is_null() {
        let images = Box::from_raw(ptr::slice_from_raw_parts_mut(record.images, record.len));
        for image in images.iter().filter(|image| !image.data.is_null()) {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(image.data, image.len)));
        }
    }
    if !record.overridden_by.is_null() {
        drop(CString::from_raw(record.overridden_by));
    }
}

/// # Safety
/// `manager` must be null or a live manager.
#[no_mangle]
pub unsafe extern "C" fn hyprcursor_style_done(
    manager: *mut hyprcursor_manager_t,
    info: hyprcursor_cursor_style_info,
) {
    if let Some(manager) = manager.as_mut() {
        manager.style_done(info.into());
    }
}

/// Install or, with a null `log_fn`, remove the logging callback.
///
/// # Safety
/// `manager` must be null or a live manager.
#[no_mangle]
pub unsafe extern "C" fn hyprcursor_register_logging_function(
    manager: *mut hyprcursor_manager_t,
    log_fn: PHYPRCURSORLOGFUNC,
) {
    if let Some(manager) = manager.as_mut() {
        manager.register_logging_function(wrap_log_fn(log_fn));
    }
}
