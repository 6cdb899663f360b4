use thiserror::Error;

/// An image as received from a vendor, before it leaves the service.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageRejection {
    #[error("file type '{0}' is not an image")]
    NotAnImage(String),
    #[error("image is {size} bytes, the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },
    #[error("image file is empty")]
    Empty,
}

pub fn validate(file: &ImageFile, max_bytes: usize) -> Result<(), ImageRejection> {
    let mime = file
        .content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !mime.starts_with("image/") || mime.len() == "image/".len() {
        return Err(ImageRejection::NotAnImage(file.content_type.clone()));
    }
    if file.is_empty() {
        return Err(ImageRejection::Empty);
    }
    if file.len() > max_bytes {
        return Err(ImageRejection::TooLarge {
            size: file.len(),
            max: max_bytes,
        });
    }
    Ok(())
}

/// Replace anything outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// Stable remote identifier for an upload: `<millis>_<sanitized stem>`.
pub fn public_id_for(file_name: &str, timestamp_millis: i64) -> String {
    let safe = sanitize_file_name(file_name);
    let stem = match safe.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
        _ => safe,
    };
    format!("{timestamp_millis}_{stem}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str, size: usize) -> ImageFile {
        ImageFile {
            file_name: "photo.jpg".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn accepts_images_within_limit() {
        assert!(validate(&file("image/jpeg", 10), 10).is_ok());
        assert!(validate(&file("image/png; charset=binary", 1), 10).is_ok());
        assert!(validate(&file("IMAGE/WEBP", 1), 10).is_ok());
    }

    #[test]
    fn rejects_non_images() {
        assert_eq!(
            validate(&file("application/pdf", 1), 10),
            Err(ImageRejection::NotAnImage("application/pdf".to_string()))
        );
        assert!(validate(&file("image/", 1), 10).is_err());
        assert!(validate(&file("", 1), 10).is_err());
    }

    #[test]
    fn rejects_oversized_and_empty() {
        assert_eq!(
            validate(&file("image/jpeg", 11), 10),
            Err(ImageRejection::TooLarge { size: 11, max: 10 })
        );
        assert_eq!(validate(&file("image/jpeg", 0), 10), Err(ImageRejection::Empty));
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_file_name("my photo (1).JPG"), "my_photo__1_.JPG");
        assert_eq!(sanitize_file_name(""), "image");
        assert_eq!(public_id_for("fresh milk.png", 1700), "1700_fresh_milk");
        assert_eq!(public_id_for(".hidden", 5), "5_.hidden");
    }
}
