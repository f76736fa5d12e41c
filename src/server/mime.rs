//! Extension → `Content-Type` table for served assets.

use std::path::Path;

/// Fallback for unknown or missing extensions.
pub const DEFAULT_MIME: &str = "text/plain";

/// Content type for a file, derived from its extension (case-insensitive).
pub fn mime_type(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_MIME;
    };

    match ext.to_ascii_lowercase().as_str() {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        _ => DEFAULT_MIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_to_fixed_types() {
        let cases = [
            ("index.html", "text/html"),
            ("styles.css", "text/css"),
            ("app.js", "application/javascript"),
            ("data.json", "application/json"),
            ("logo.png", "image/png"),
            ("photo.jpg", "image/jpeg"),
            ("anim.gif", "image/gif"),
            ("icon.svg", "image/svg+xml"),
            ("favicon.ico", "image/x-icon"),
        ];
        for (file, expected) in cases {
            assert_eq!(mime_type(Path::new(file)), expected, "{file}");
        }
    }

    #[test]
    fn extension_match_ignores_case() {
        assert_eq!(mime_type(Path::new("INDEX.HTML")), "text/html");
        assert_eq!(mime_type(Path::new("a/b/Photo.JPG")), "image/jpeg");
    }

    #[test]
    fn unknown_or_missing_extension_is_plain_text() {
        assert_eq!(mime_type(Path::new("archive.tar.gz")), DEFAULT_MIME);
        assert_eq!(mime_type(Path::new("README")), DEFAULT_MIME);
        assert_eq!(mime_type(Path::new(".hidden")), DEFAULT_MIME);
    }
}
