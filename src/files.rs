//! Static file responses with revalidation headers.
//!
//! [`StaticFiles`] maps a request path onto a document root and answers with
//! the file, a `304 Not Modified`, or an empty `404`. Every `200` carries:
//!
//! ```ignore
//!  Content-Type     from the file extension, see `mime::resolve`
//!  Cache-Control    public, no-cache
//!  Last-Modified    the file's modification time as an HTTP-date
//!  ETag             W/"<mtime in nanoseconds>-<size in bytes>"
//! ```
//!
//! `no-cache` makes clients revalidate on every use, so the validators are
//! recomputed from the file's metadata on every request and never cached.
use std::fs::Metadata;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::{Body, Method, Request, Response, StatusCode};
use tokio_util::io::ReaderStream;

use crate::error::{Error, Result};
use crate::mime;
use crate::params::Params;
use crate::router::Handler;

/// The variable a static files template may declare to select the file.
pub const FILEPATH: &str = "filepath";

/// Value of the `Cache-Control` header on file responses.
pub const CACHE_CONTROL: &str = "public, no-cache";

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Modification time and size of a file, read at response time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadataSnapshot {
    modified: SystemTime,
    len: u64,
}

impl FileMetadataSnapshot {
    pub fn new(modified: SystemTime, len: u64) -> Self {
        Self { modified, len }
    }

    pub fn from_metadata(metadata: &Metadata) -> io::Result<Self> {
        Ok(Self::new(metadata.modified()?, metadata.len()))
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Weak validator derived from the modification time and the size.
    ///
    /// ```rust
    /// use staticrouter::FileMetadataSnapshot;
    /// use std::time::{Duration, UNIX_EPOCH};
    ///
    /// let snapshot = FileMetadataSnapshot::new(UNIX_EPOCH + Duration::from_secs(2), 512);
    /// assert_eq!(snapshot.etag(), r#"W/"2000000000-512""#);
    /// ```
    pub fn etag(&self) -> String {
        let nanos = self
            .modified
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        format!("W/\"{}-{}\"", nanos, self.len)
    }

    /// The modification time as an HTTP-date.
    ///
    /// ```rust
    /// use staticrouter::FileMetadataSnapshot;
    /// use std::time::{Duration, UNIX_EPOCH};
    ///
    /// let snapshot = FileMetadataSnapshot::new(UNIX_EPOCH + Duration::from_secs(784111777), 0);
    /// assert_eq!(snapshot.last_modified(), "Sun, 06 Nov 1994 08:49:37 GMT");
    /// ```
    pub fn last_modified(&self) -> String {
        DateTime::<Utc>::from(self.modified)
            .format(HTTP_DATE)
            .to_string()
    }

    fn modified_secs(&self) -> i64 {
        self.modified
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() as i64)
    }

    /// Whether the conditional headers of a request show the client's copy
    /// is current.
    ///
    /// `If-None-Match` takes precedence; `If-Modified-Since` is only
    /// consulted without it.
    pub fn is_not_modified(&self, headers: &HeaderMap) -> bool {
        if let Some(value) = headers.get(header::IF_NONE_MATCH) {
            return value
                .to_str()
                .map_or(false, |tags| etag_matches(tags, &self.etag()));
        }

        headers
            .get(header::IF_MODIFIED_SINCE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| DateTime::parse_from_rfc2822(value).ok())
            .map_or(false, |since| self.modified_secs() <= since.timestamp())
    }
}

// weak comparison: `W/` prefixes are ignored on both sides
fn etag_matches(tags: &str, etag: &str) -> bool {
    let ours = strip_weak(etag);
    tags.split(',')
        .map(str::trim)
        .any(|tag| tag == "*" || strip_weak(tag) == ours)
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

// NotADirectory: a regular file used as a directory, as in `/index.html/`
fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// A file found under the document root.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub snapshot: FileMetadataSnapshot,
    pub media_type: &'static str,
}

/// The outcome of looking up a request path.
#[derive(Debug, Clone)]
pub enum Resolved {
    Found(ResolvedFile),
    /// Nothing there, or a directory.
    NotFound,
    PermissionDenied,
}

/// Serves files from a document root.
///
/// As a [`Handler`](crate::Handler), the file is taken from the `filepath`
/// parameter when the matched template declares one, and from the request
/// path otherwise. A request for the root (`""` or `/`) is served the index
/// document.
///
/// ```rust
/// use staticrouter::{Router, StaticFiles};
///
/// let router = Router::default()
///     .serve_files("/", StaticFiles::new("public"))
///     .unwrap()
///     .serve_files("/js/<path:filepath>", StaticFiles::new("public/js"))
///     .unwrap();
/// assert_eq!(router.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    index: String,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: "index.html".to_owned(),
        }
    }

    /// Sets the document served for the root path. Defaults to `index.html`.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Looks up `request_path` under the document root.
    ///
    /// Only `""` and `/` name the index document. Any other path that cleans
    /// down to the root, such as `..` or `a/..`, is a directory.
    pub async fn resolve(&self, request_path: &str) -> Result<Resolved> {
        // no file name can hold a NUL byte
        if request_path.contains('\0') {
            return Ok(Resolved::NotFound);
        }

        let cleaned = crate::path::clean(request_path);
        let relative = if request_path.is_empty() || request_path == "/" {
            self.index.as_str()
        } else if cleaned == "/" {
            return Ok(Resolved::NotFound);
        } else {
            cleaned.trim_start_matches('/')
        };
        let path = self.root.join(relative);

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(err) if is_missing(&err) => return Ok(Resolved::NotFound),
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                return Ok(Resolved::PermissionDenied)
            }
            Err(err) => return Err(err.into()),
        };

        if !metadata.is_file() {
            return Ok(Resolved::NotFound);
        }

        let media_type = mime::resolve(relative);
        Ok(Resolved::Found(ResolvedFile {
            snapshot: FileMetadataSnapshot::from_metadata(&metadata)?,
            path,
            media_type,
        }))
    }

    /// Resolves `request_path` and builds the response for it.
    pub async fn respond(
        &self,
        request_path: &str,
        method: &Method,
        headers: &HeaderMap,
    ) -> Result<Response<Body>> {
        match self.resolve(request_path).await? {
            Resolved::Found(file) => file_response(&file, method, headers).await,
            Resolved::NotFound => {
                tracing::debug!(path = request_path, "file not found");
                Ok(empty(StatusCode::NOT_FOUND))
            }
            Resolved::PermissionDenied => {
                tracing::debug!(path = request_path, "permission denied");
                Ok(empty(StatusCode::FORBIDDEN))
            }
        }
    }

    /// Answers a request routed to this handler.
    pub async fn serve(&self, req: Request<Body>) -> Response<Body> {
        if req.method() != Method::GET && req.method() != Method::HEAD {
            let mut res = empty(StatusCode::METHOD_NOT_ALLOWED);
            res.headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
            return res;
        }

        let path = match req.extensions().get::<Params>().and_then(|p| p.get(FILEPATH)) {
            Some(filepath) => filepath.to_owned(),
            None => {
                let raw = req.uri().path();
                urlencoding::decode(raw).map_or_else(|_| raw.to_owned(), |p| p.into_owned())
            }
        };

        match self.respond(&path, req.method(), req.headers()).await {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(path = %path, error = %err, "failed to serve file");
                empty(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl Handler for StaticFiles {
    fn handle(
        &self,
        req: Request<Body>,
    ) -> Pin<Box<dyn Future<Output = hyper::Result<Response<Body>>> + Send>> {
        let files = self.clone();
        Box::pin(async move { Ok(files.serve(req).await) })
    }
}

/// Builds the response for a resolved file: `304` when the request's
/// validators are fresh, otherwise `200` with the body streamed from disk
/// (or no body for `HEAD`).
pub async fn file_response(
    file: &ResolvedFile,
    method: &Method,
    headers: &HeaderMap,
) -> Result<Response<Body>> {
    let snapshot = &file.snapshot;
    let builder = Response::builder()
        .header(header::CACHE_CONTROL, CACHE_CONTROL)
        .header(header::LAST_MODIFIED, snapshot.last_modified())
        .header(header::ETAG, snapshot.etag());

    if snapshot.is_not_modified(headers) {
        return Ok(builder.status(StatusCode::NOT_MODIFIED).body(Body::empty())?);
    }

    let builder = builder
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.media_type)
        .header(header::CONTENT_LENGTH, snapshot.len().to_string());

    if method == Method::HEAD {
        return Ok(builder.body(Body::empty())?);
    }

    let body = match tokio::fs::File::open(&file.path).await {
        Ok(f) => Body::wrap_stream(ReaderStream::new(f)),
        // removed between the lookup and the open
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(empty(StatusCode::NOT_FOUND))
        }
        Err(err) => return Err(Error::Io(err)),
    };

    Ok(builder.body(body)?)
}

fn empty(status: StatusCode) -> Response<Body> {
    let mut res = Response::new(Body::empty());
    *res.status_mut() = status;
    res
}
