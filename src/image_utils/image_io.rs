use image::{self, ImageResult, RgbImage};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File types accepted for analysis.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "tiff"];

pub fn read_image_as_rgb8(filepath: &Path) -> ImageResult<RgbImage> {
    Ok(image::open(filepath)?.into_rgb8())
}

pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Lists the images to analyze under `root`.
///
/// A file is returned as is, whatever its extension, so the decoder gets to report what is
/// wrong with it. A directory is walked recursively and only supported image files are kept,
/// sorted by path.
pub fn collect_image_paths(root: &Path) -> walkdir::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && has_supported_extension(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}
