//! # StaticRouter
//!
//! StaticRouter is a first-match HTTP request router with typed path templates and a static file
//! responder that always revalidates.
//!
//! Templates are compiled once, when they are registered, into matchers anchored at both ends of
//! the path. Incoming paths are tried against them strictly in registration order, and the first
//! template that consumes the whole path dispatches to its handler with the captured parameters
//! bound by name.
//!
//! ## Features
//!
//! **Typed placeholders:** A template segment such as `<int:id>` only matches digits, `<uuid:id>`
//! only a canonical UUID, and `<any(red,green,blue):color>` only one of the listed words. A bare
//! `<name>` matches a single path segment and `<path:name>` the rest of the path, slashes included.
//!
//! **Predictable precedence:** There are no specificity rules to learn. The first registered route
//! that matches wins, so register specific templates before catch-alls.
//!
//! **Errors at startup, not at request time:** A malformed template, or a handler that expects a
//! parameter its template does not declare, fails registration. A running router's table is always
//! well formed.
//!
//! **Static files with validators:** [`StaticFiles`] serves a document root with `Content-Type`,
//! `Cache-Control: public, no-cache`, `Last-Modified` and a weak `ETag`, and answers conditional
//! requests with `304 Not Modified`.
//!
//! ## Usage
//!
//! Here is a simple example:
//!
//! ```rust,no_run
//! use staticrouter::{Params, Router, StaticFiles};
//! use hyper::{Body, Request, Response};
//!
//! async fn item(req: Request<Body>) -> hyper::Result<Response<Body>> {
//!     let params = req.extensions().get::<Params>().unwrap();
//!     Ok(Response::new(format!("item #{}", params.get("id").unwrap()).into()))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let router = Router::default()
//!         .register_expecting("/item/<int:id>", &["id"], item)?
//!         .serve_files("/", StaticFiles::new("public"))?
//!         .serve_files("/<path:filepath>", StaticFiles::new("public"))?;
//!
//!     hyper::Server::bind(&([127, 0, 0, 1], 3000).into())
//!         .serve(router.into_service())
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ### Converters
//!
//! ```ignore
//!  Pattern: /item/<int:id>
//!
//!  /item/42                  match: id="42"
//!  /item/4x2                 no match
//!
//!  Pattern: /js/<path:requested_path>
//!
//!  /js/app.js                match: requested_path="app.js"
//!  /js/lib/vendor.js         match: requested_path="lib/vendor.js"
//! ```
//!
//! An unknown converter name, such as a misspelt `<strnig:name>`, is matched like `string`. It is
//! logged as a warning when the route is registered, but it is not an error.
//!
//! ### Not Found Handler
//!
//! Paths no template matches are answered with an empty `404`, or passed to the
//! [`Router::not_found`] handler when one is set:
//!
//! ```rust
//! use staticrouter::Router;
//! use hyper::{Request, Response, Body};
//!
//! let router = Router::default().not_found(|_: Request<Body>| async {
//!     Ok::<_, hyper::Error>(Response::new(Body::from("404: Not Found")))
//! });
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod converter;
pub mod error;
pub mod files;
pub mod mime;
pub mod path;
pub mod route;

mod params;

#[doc(hidden)]
pub mod router;

#[doc(inline)]
pub use router::{Handler, Match, Router};

pub use converter::Converter;
pub use error::{Error, Result, RouteError, TemplateError};
pub use files::{FileMetadataSnapshot, Resolved, ResolvedFile, StaticFiles};
pub use params::{Param, Params};
pub use route::{compile, CompiledRoute, Segment, Template};

// test the code examples in README.md
#[cfg(doctest)]
mod test_readme {
    macro_rules! doc_comment {
        ($x:expr) => {
            #[doc = $x]
            extern "C" {}
        };
    }

    doc_comment!(include_str!("../README.md"));
}
