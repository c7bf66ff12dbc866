//! Media type detection from file extensions.

/// Returned for files without a recognized extension.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Extension to media type. Extensions are lower case, without the leading
/// dot, and unique.
static MEDIA_TYPES: &[(&str, &str)] = &[
    // text
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("md", "text/markdown"),
    ("xml", "application/xml"),
    ("json", "application/json"),
    ("map", "application/json"),
    ("webmanifest", "application/manifest+json"),
    // script
    ("js", "application/javascript"),
    ("mjs", "application/javascript"),
    ("wasm", "application/wasm"),
    // image
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("avif", "image/avif"),
    ("bmp", "image/bmp"),
    ("ico", "image/x-icon"),
    // audio
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("flac", "audio/flac"),
    ("aac", "audio/aac"),
    ("m4a", "audio/mp4"),
    // video
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("webm", "video/webm"),
    ("ogv", "video/ogg"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("avi", "video/x-msvideo"),
    // font
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    ("eot", "application/vnd.ms-fontobject"),
    // archive
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tgz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("bz2", "application/x-bzip2"),
    ("xz", "application/x-xz"),
    ("7z", "application/x-7z-compressed"),
    ("rar", "application/vnd.rar"),
    // office
    ("pdf", "application/pdf"),
    ("rtf", "application/rtf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("ppt", "application/vnd.ms-powerpoint"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
    ("odp", "application/vnd.oasis.opendocument.presentation"),
];

/// Detect the media type of a file path from its extension.
///
/// The comparison is case-insensitive, and the longest matching extension
/// wins, so the result never depends on table order.
///
/// ```rust
/// use staticrouter::mime;
///
/// assert_eq!(mime::resolve("photo.JPG"), "image/jpeg");
/// assert_eq!(mime::resolve("js/app.js"), "application/javascript");
/// assert_eq!(mime::resolve("README"), "application/octet-stream");
/// ```
pub fn resolve(path: &str) -> &'static str {
    let path = path.to_ascii_lowercase();
    let name = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("");

    lookup(MEDIA_TYPES, name)
}

fn lookup(table: &[(&str, &'static str)], name: &str) -> &'static str {
    table
        .iter()
        .filter(|(ext, _)| has_extension(name, ext))
        .max_by_key(|(ext, _)| ext.len())
        .map_or(DEFAULT_MEDIA_TYPE, |&(_, media_type)| media_type)
}

fn has_extension(name: &str, ext: &str) -> bool {
    name.len() > ext.len()
        && name.ends_with(ext)
        && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
}
