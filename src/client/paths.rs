//! Storage node URL construction and upload file name sanitizing

use std::borrow::Cow;

use crate::models::{FileHandle, Location};

/// Name used for uploads without a usable file name
pub const DEFAULT_FILE_NAME: &str = "file";

/// Longest file name sent unchanged, in characters
pub const MAX_FILE_NAME_CHARS: usize = 256;

/// Length longer names are cut down to, in characters
pub const TRUNCATED_FILE_NAME_CHARS: usize = 255;

// == Base URL ==
/// Public address of a storage node with a scheme.
///
/// Only a plain substring test for `"http"` decides whether `http://` is
/// prepended, so `https://` addresses pass through as they are.
pub fn node_base_url(location: &Location) -> Cow<'_, str> {
    let public_url = location.public_url();
    if public_url.contains("http") {
        Cow::Borrowed(public_url)
    } else {
        Cow::Owned(format!("http://{}", public_url))
    }
}

/// `<base>/<fid>[_<version>]` on the given storage node.
pub fn file_url(location: &Location, file: &FileHandle) -> String {
    format!("{}/{}", node_base_url(location), file.storage_path())
}

/// `<base>/status` on the given storage node.
pub fn volume_status_url(location: &Location) -> String {
    format!("{}/status", node_base_url(location))
}

// == File Name ==
/// Name announced for an upload.
///
/// Blank names become [`DEFAULT_FILE_NAME`]; names longer than
/// [`MAX_FILE_NAME_CHARS`] keep their first [`TRUNCATED_FILE_NAME_CHARS`].
pub fn sanitize_file_name(name: Option<&str>) -> String {
    match name {
        None => DEFAULT_FILE_NAME.to_string(),
        Some(name) if name.trim().is_empty() => DEFAULT_FILE_NAME.to_string(),
        Some(name) if name.chars().count() > MAX_FILE_NAME_CHARS => {
            name.chars().take(TRUNCATED_FILE_NAME_CHARS).collect()
        }
        Some(name) => name.to_string(),
    }
}
