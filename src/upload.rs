use crate::error::PredictError;
use crate::models::UploadedImage;
use actix_multipart::{Field, Multipart};
use actix_web::web;
use futures_util::StreamExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

const FIELD_NAME: &str = "image";
const FALLBACK_NAME: &str = "upload";

/// Reduces an untrusted client filename to a flat name safe to join onto the scratch
/// directory. Never returns an empty string.
pub fn sanitize_filename(name: &str) -> String {
    // decompose first so accented letters keep their base character
    let flattened: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '_' | '.' | '-'))
        .collect();
    let trimmed = cleaned.trim_matches(|c: char| c == '.' || c == '_');

    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Per-request name so concurrent uploads of the same file never overwrite each other.
pub fn stored_name(original: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitize_filename(original))
}

pub fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        log::info!("created upload directory {}", dir.display());
    }
    Ok(())
}

/// Pulls the `image` file part out of the form and streams it to `upload_dir`.
/// Other parts, including an `image` part without a filename, are drained and ignored.
pub async fn receive_image(
    mut payload: Multipart,
    upload_dir: &Path,
) -> Result<UploadedImage, PredictError> {
    let mut uploaded: Option<UploadedImage> = None;

    if let Err(err) = read_parts(&mut payload, upload_dir, &mut uploaded).await {
        if let Some(image) = uploaded {
            discard(image.path).await;
        }
        return Err(err);
    }

    uploaded.ok_or(PredictError::MissingFile)
}

async fn read_parts(
    payload: &mut Multipart,
    upload_dir: &Path,
    uploaded: &mut Option<UploadedImage>,
) -> Result<(), PredictError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| PredictError::Upload(e.to_string()))?;
        let disposition = field.content_disposition();
        let is_image_field = disposition.get_name() == Some(FIELD_NAME);
        let filename = disposition.get_filename().map(str::to_string);

        let original_name = match filename {
            Some(name) if is_image_field && uploaded.is_none() => name,
            _ => {
                drain(&mut field).await?;
                continue;
            }
        };
        let image = save_field(&mut field, original_name, upload_dir).await?;

        // an empty file input still posts the part, with no name and no bytes
        if image.original_name.is_empty() && image.size == 0 {
            discard(image.path).await;
            continue;
        }
        *uploaded = Some(image);
    }
    Ok(())
}

async fn save_field(
    field: &mut Field,
    original_name: String,
    upload_dir: &Path,
) -> Result<UploadedImage, PredictError> {
    let content_type = field.content_type().to_string();
    let stored_name = stored_name(&original_name);
    let path = upload_dir.join(&stored_name);

    let dir = upload_dir.to_path_buf();
    let target = path.clone();
    let f = web::block(move || -> std::io::Result<File> {
        ensure_dir(&dir)?;
        File::create(&target)
    })
    .await
    .map_err(|e| PredictError::Storage(blocking_io(e)))??;

    let size = match write_chunks(field, f).await {
        Ok(size) => size,
        Err(err) => {
            discard(path).await;
            return Err(err);
        }
    };

    log::debug!("stored {:?} as {} ({} bytes)", original_name, stored_name, size);

    Ok(UploadedImage {
        original_name,
        stored_name,
        path,
        content_type,
        size,
    })
}

async fn write_chunks(field: &mut Field, mut f: File) -> Result<u64, PredictError> {
    let mut size = 0u64;
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| PredictError::Upload(e.to_string()))?;
        size += data.len() as u64;
        f = web::block(move || f.write_all(&data).map(|_| f))
            .await
            .map_err(|e| PredictError::Storage(blocking_io(e)))??;
    }
    Ok(size)
}

/// Removes a scratch file nothing will reference. Failures are only logged.
pub async fn discard(path: PathBuf) {
    let target = path.clone();
    match web::block(move || fs::remove_file(target)).await {
        Ok(Ok(())) => log::debug!("removed {}", path.display()),
        Ok(Err(e)) => log::warn!("Failed to remove {}: {}", path.display(), e),
        Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
    }
}

async fn drain(field: &mut Field) -> Result<(), PredictError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| PredictError::Upload(e.to_string()))?;
    }
    Ok(())
}

fn blocking_io(err: actix_web::error::BlockingError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

/// Resolves a previously stored upload, refusing anything that is not a plain
/// sanitized name inside `upload_dir`.
pub fn resolve_stored(upload_dir: &Path, name: &str) -> Option<PathBuf> {
    if name.is_empty() || sanitize_filename(name) != name {
        return None;
    }
    Some(upload_dir.join(name))
}

pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_traversal_components() {
        assert_eq!(sanitize_filename("../../etc/passwd.png"), "etc_passwd.png");
        assert_eq!(sanitize_filename("..\\..\\win.ini"), "win.ini");
        assert_eq!(sanitize_filename("/abs/path/x.jpg"), "abs_path_x.jpg");
    }

    #[test]
    fn drops_unsafe_characters() {
        assert_eq!(sanitize_filename("my chest x-ray.jpeg"), "my_chest_x-ray.jpeg");
        assert_eq!(sanitize_filename("scan<1>;rm.png"), "scan1rm.png");
        assert_eq!(sanitize_filename("röntgen.png"), "rontgen.png");
        assert_eq!(sanitize_filename("ﬁlm✓.png"), "film.png");
    }

    #[test]
    fn never_empty() {
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("../.."), "upload");
        assert_eq!(sanitize_filename("___"), "upload");
    }

    #[test]
    fn stored_names_are_unique_per_call() {
        let a = stored_name("scan.png");
        let b = stored_name("scan.png");
        assert_ne!(a, b);
        assert!(a.ends_with("_scan.png"));
    }

    #[test]
    fn stored_name_stays_in_directory() {
        let dir = Path::new("/srv/uploads");
        let path = dir.join(stored_name("../../etc/passwd.png"));
        assert_eq!(path.parent(), Some(dir));
    }

    #[test]
    fn resolve_rejects_unsanitized_names() {
        let dir = Path::new("uploads");
        assert!(resolve_stored(dir, "../secret").is_none());
        assert!(resolve_stored(dir, "a/b.png").is_none());
        assert!(resolve_stored(dir, "").is_none());
        assert_eq!(
            resolve_stored(dir, "abc_scan.png"),
            Some(dir.join("abc_scan.png"))
        );
    }

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }

    #[actix_rt::test]
    async fn discard_removes_file_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orphan.png");
        fs::write(&path, b"x").unwrap();

        discard(path.clone()).await;
        assert!(!path.exists());
        discard(path).await;
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("x.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("x.jpg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("x")), "application/octet-stream");
    }
}
