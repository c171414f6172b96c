use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crashlens_application::{ApplicationError, PhotoLoader};
use crashlens_domain::{is_image_mime, ImageBlob, PhotoKey};
use tracing::{debug, warn};
use walkdir::WalkDir;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Reads photos from disk. A folder is walked recursively in file-name order
/// and only `image/*` files are kept; a single file is returned as-is so the
/// collector can apply its own filter.
#[derive(Debug, Default)]
pub struct FsPhotoLoader;

impl PhotoLoader for FsPhotoLoader {
    fn load(&self, path: &Path) -> Result<Vec<ImageBlob>, ApplicationError> {
        if path.is_dir() {
            return load_folder(path);
        }
        if !path.is_file() {
            return Err(ApplicationError::InvalidInput(format!(
                "photo path does not exist: {}",
                path.display()
            )));
        }
        Ok(vec![load_file(path)?])
    }
}

/// Builds a photo from an in-memory drop. A missing MIME type is guessed
/// from the file extension.
pub fn photo_from_bytes(
    name: &str,
    mime_type: Option<&str>,
    modified_ms: i64,
    bytes: Vec<u8>,
) -> Result<ImageBlob, ApplicationError> {
    let mime_type = match mime_type.filter(|mime| !mime.is_empty()) {
        Some(mime) => mime.to_string(),
        None => guess_mime(Path::new(name)),
    };
    Ok(ImageBlob::new(PhotoKey::new(name, modified_ms), mime_type, bytes)?)
}

fn load_folder(folder: &Path) -> Result<Vec<ImageBlob>, ApplicationError> {
    let mut photos = Vec::new();
    let mut scanned = 0_usize;

    for entry in WalkDir::new(folder)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        scanned += 1;
        if !is_image_mime(&guess_mime(entry.path())) {
            continue;
        }
        match load_file(entry.path()) {
            Ok(photo) => photos.push(photo),
            Err(error) => {
                warn!(path = %entry.path().display(), error = %error, "skipping unreadable photo");
            }
        }
    }

    debug!(
        folder = %folder.display(),
        scanned,
        images = photos.len(),
        "folder scanned"
    );
    Ok(photos)
}

fn load_file(path: &Path) -> Result<ImageBlob, ApplicationError> {
    let bytes = fs::read(path)
        .map_err(|error| ApplicationError::Io(format!("{}: {error}", path.display())))?;
    let metadata = path
        .metadata()
        .map_err(|error| ApplicationError::Io(error.to_string()))?;
    let modified_ms = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|duration| i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(ImageBlob::new(
        PhotoKey::new(name, modified_ms),
        guess_mime(path),
        bytes,
    )?)
}

fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_MIME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, bytes: &[u8]) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, bytes).expect("write");
    }

    #[test]
    fn folder_keeps_images_in_name_order() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "b.png", &[1]);
        write(dir.path(), "a.jpg", &[2]);
        write(dir.path(), "notes.txt", b"hola");
        write(dir.path(), "sub/c.webp", &[3]);
        write(dir.path(), "empty.jpg", &[]);

        let photos = FsPhotoLoader.load(dir.path()).expect("load");
        let names: Vec<_> = photos.iter().map(|photo| photo.name().to_string()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.webp"]);
        assert_eq!(photos[0].mime_type(), "image/jpeg");
        assert_eq!(photos[2].mime_type(), "image/webp");
    }

    #[test]
    fn single_file_is_loaded_with_guessed_type_and_mtime() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "notes.txt", b"hola");

        let photos = FsPhotoLoader
            .load(&dir.path().join("notes.txt"))
            .expect("load");
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].mime_type(), "text/plain");
        assert!(photos[0].key().modified_ms > 0);
        assert_eq!(photos[0].bytes(), b"hola");
    }

    #[test]
    fn missing_path_is_invalid_input() {
        let dir = TempDir::new().expect("tempdir");
        assert!(matches!(
            FsPhotoLoader.load(&dir.path().join("nope.jpg")),
            Err(ApplicationError::InvalidInput(_))
        ));
    }

    #[test]
    fn dropped_bytes_guess_missing_type() {
        let guessed = photo_from_bytes("choque.JPG", None, 5, vec![1]).expect("photo");
        assert_eq!(guessed.mime_type(), "image/jpeg");
        let given = photo_from_bytes("blob", Some("image/png"), 5, vec![1]).expect("photo");
        assert_eq!(given.mime_type(), "image/png");
        let unknown = photo_from_bytes("blob", Some(""), 5, vec![1]).expect("photo");
        assert_eq!(unknown.mime_type(), FALLBACK_MIME);
    }
}
