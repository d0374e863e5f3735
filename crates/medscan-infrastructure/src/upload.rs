//! Builds uploads from files on disk.

use medscan_core::image::UploadedFile;
use std::path::Path;

/// Creates an upload for `path`, guessing its MIME type from the extension.
///
/// Unknown extensions leave the type unset, which later fails validation.
pub fn upload_from_path(path: impl AsRef<Path>) -> UploadedFile {
    let path = path.as_ref();
    let mime_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());
    UploadedFile::from_path(path, mime_type)
}
