//! Image upload

use super::{field, require_success};
use crate::client::{FilePart, MultipartForm, RequestOptions, StorefrontClient};
use crate::error::Result;
use crate::validation::check_upload_size;
use std::path::Path;
use tracing::info;

/// Multipart field the upload endpoint reads
const UPLOAD_FIELD: &str = "image";

/// Content type from the file extension; unknown extensions are left to the server
fn image_mime(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

impl StorefrontClient {
    /// Upload one image and return its public URL.
    ///
    /// Oversized files are refused before any request is made.
    pub async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        check_upload_size(bytes.len())?;

        let size = bytes.len();
        let form = MultipartForm::new().file(FilePart {
            field: UPLOAD_FIELD.to_string(),
            file_name: file_name.to_string(),
            mime: image_mime(file_name).map(str::to_owned),
            bytes,
        });

        let options = RequestOptions::post().with_multipart(form);
        let mut body = require_success(self.send("/api/upload", options).await?)?;
        let url: String = field(&mut body, "imageUrl")?;
        info!(file = file_name, size, url = %url, "Image uploaded");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(image_mime("shoe.PNG"), Some("image/png"));
        assert_eq!(image_mime("a.b.jpeg"), Some("image/jpeg"));
        assert_eq!(image_mime("notes.txt"), None);
        assert_eq!(image_mime("noext"), None);
    }
}
