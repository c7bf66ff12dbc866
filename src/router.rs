//! [`Router`](crate::Router) dispatches request paths to handlers through an
//! ordered table of compiled route templates.
//!
//! Routes are tried strictly in the order they were registered, and the
//! first template that consumes the whole path wins:
//!
//! ```rust,no_run
//! use staticrouter::{Params, Router};
//! use hyper::{Body, Request, Response};
//!
//! async fn index(_: Request<Body>) -> hyper::Result<Response<Body>> {
//!     Ok(Response::new("Hello, World!".into()))
//! }
//!
//! async fn item(req: Request<Body>) -> hyper::Result<Response<Body>> {
//!     let params = req.extensions().get::<Params>().unwrap();
//!     Ok(Response::new(format!("item {}", params.get("id").unwrap()).into()))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let router = Router::default()
//!         .register("/", index)?
//!         .register_expecting("/item/<int:id>", &["id"], item)?;
//!
//!     hyper::Server::bind(&([127, 0, 0, 1], 3000).into())
//!         .serve(router.into_service())
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! Since the first match wins, a catch-all registered early shadows every
//! template registered after it. Register specific templates first:
//! ```ignore
//!  1. /index.html
//!  2. /<path:filepath>
//!
//!  /index.html          route 1
//!  /css/site.css        route 2: filepath="css/site.css"
//! ```
//!
//! The captured values are saved as a [`Params`], in the order the template
//! declares them. There are two ways to retrieve the value of a parameter:
//!  1) by the name of the parameter
//! ```ignore
//!  let user = params.get("user") // defined by <user> or <string:user>
//! ```
//!  2) by the index of the parameter. This way you can also get the name (key)
//! ```rust,no_run
//!  # use staticrouter::Params;
//!  # let params = Params::default();
//!  let third_key = &params[2].key;   // the name of the 3rd parameter
//!  let third_value = &params[2].value; // the value of the 3rd parameter
//! ```
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::{future, ready};
use hyper::service::Service;
use hyper::{Body, Request, Response, StatusCode};

use crate::error::RouteError;
use crate::files::{StaticFiles, FILEPATH};
use crate::params::Params;
use crate::route::CompiledRoute;

struct Route {
    compiled: CompiledRoute,
    handler: Box<dyn Handler>,
}

/// Router dispatches requests to different handlers via an ordered table of
/// route templates.
///
/// The table is built once, before serving, and only read afterwards.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    not_found: Option<Box<dyn Handler>>,
}

/// A successful dispatch: the matched route's handler and the parameters
/// captured from the path.
pub struct Match<'r> {
    route: &'r CompiledRoute,
    handler: &'r dyn Handler,
    params: Params,
}

impl<'r> Match<'r> {
    /// The template of the route that matched.
    pub fn template(&self) -> &'r str {
        self.route.template()
    }

    pub fn handler(&self) -> &'r dyn Handler {
        self.handler
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn into_parts(self) -> (&'r dyn Handler, Params) {
        (self.handler, self.params)
    }
}

impl Router {
    /// Compiles `template` and appends it to the routing table.
    ///
    /// A malformed template is returned as an error and nothing is added.
    /// ```rust
    /// use staticrouter::Router;
    /// use hyper::{Body, Request, Response};
    ///
    /// async fn teapot(_: Request<Body>) -> hyper::Result<Response<Body>> {
    ///     Ok(Response::new(Body::from("I am a teapot!")))
    /// }
    ///
    /// let router = Router::default().register("/teapot", teapot).unwrap();
    /// assert!(router.dispatch("/teapot").is_some());
    ///
    /// assert!(Router::default().register("/teapot/<name", teapot).is_err());
    /// ```
    pub fn register(
        self,
        template: &str,
        handler: impl Handler + 'static,
    ) -> Result<Self, RouteError> {
        let compiled = CompiledRoute::compile(template)?;
        Ok(self.push(compiled, Box::new(handler)))
    }

    /// Like [`register`](Router::register), for a handler that reads exactly
    /// the variables named in `expected`.
    ///
    /// A template declaring a different set of variables is rejected here,
    /// rather than leaving the handler without a value at request time.
    /// ```rust
    /// use staticrouter::{Router, RouteError};
    /// use hyper::{Body, Request, Response};
    ///
    /// async fn user(_: Request<Body>) -> hyper::Result<Response<Body>> {
    ///     Ok(Response::new(Body::empty()))
    /// }
    ///
    /// assert!(Router::default()
    ///     .register_expecting("/user/<name>", &["name"], user)
    ///     .is_ok());
    /// assert!(matches!(
    ///     Router::default().register_expecting("/user/<id>", &["name"], user),
    ///     Err(RouteError::ParamMismatch { .. })
    /// ));
    /// ```
    pub fn register_expecting(
        self,
        template: &str,
        expected: &[&str],
        handler: impl Handler + 'static,
    ) -> Result<Self, RouteError> {
        let compiled = CompiledRoute::compile(template)?;
        check_params(&compiled, expected)?;
        Ok(self.push(compiled, Box::new(handler)))
    }

    /// Serves files from a [`StaticFiles`] root under `template`.
    ///
    /// The template must declare either no variables, in which case the
    /// request path selects the file, or exactly one named `filepath`:
    /// ```ignore
    ///  /                      "/" is served the index document
    ///  /js/<path:filepath>    "/js/lib/x.js" is served <root>/lib/x.js
    /// ```
    pub fn serve_files(self, template: &str, files: StaticFiles) -> Result<Self, RouteError> {
        let compiled = CompiledRoute::compile(template)?;
        if !compiled.variables().is_empty() {
            check_params(&compiled, &[FILEPATH])?;
        }
        Ok(self.push(compiled, Box::new(files)))
    }

    /// Configurable handler which is called when no matching route is
    /// found. Without one, an empty `404 Not Found` is returned.
    pub fn not_found(mut self, handler: impl Handler + 'static) -> Self {
        self.not_found = Some(Box::new(handler));
        self
    }

    fn push(mut self, compiled: CompiledRoute, handler: Box<dyn Handler>) -> Self {
        tracing::debug!(template = compiled.template(), "registered route");
        self.routes.push(Route { compiled, handler });
        self
    }

    /// Finds the first registered route whose template consumes the whole
    /// of `path`, which is expected to be percent-decoded already.
    ///
    /// `None` is the ordinary "no route" outcome.
    /// ```rust
    /// use staticrouter::Router;
    /// use hyper::{Body, Request, Response};
    ///
    /// async fn file(_: Request<Body>) -> hyper::Result<Response<Body>> {
    ///     Ok(Response::new(Body::empty()))
    /// }
    ///
    /// let router = Router::default()
    ///     .register("/js/<path:p>", file)
    ///     .unwrap();
    ///
    /// let found = router.dispatch("/js/a/b/c.js").unwrap();
    /// assert_eq!(found.template(), "/js/<path:p>");
    /// assert_eq!(found.params().get("p"), Some("a/b/c.js"));
    /// assert!(router.dispatch("/css/site.css").is_none());
    /// ```
    pub fn dispatch(&self, path: &str) -> Option<Match<'_>> {
        self.routes.iter().find_map(|route| {
            route.compiled.matches(path).map(|params| Match {
                route: &route.compiled,
                handler: route.handler.as_ref(),
                params,
            })
        })
    }

    /// Registered templates, in registration order.
    pub fn templates(&self) -> impl Iterator<Item = &str> + '_ {
        self.routes.iter().map(|route| route.compiled.template())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn check_params(compiled: &CompiledRoute, expected: &[&str]) -> Result<(), RouteError> {
    let declared = compiled.variables();
    let missing = expected.iter().any(|name| !declared.iter().any(|d| d == name));
    let extra = declared.iter().any(|d| !expected.contains(&d.as_str()));

    if missing || extra {
        return Err(RouteError::ParamMismatch {
            template: compiled.template().to_owned(),
            expected: expected.iter().map(|name| (*name).to_owned()).collect(),
            declared: declared.to_vec(),
        });
    }
    Ok(())
}

/// Whatever a route dispatches to.
///
/// Any `async fn(Request<Body>) -> hyper::Result<Response<Body>>` is a
/// handler, and so is [`StaticFiles`]. Parameters captured by the route are
/// in the request extensions as [`Params`].
/// ```rust
/// # use staticrouter::Handler;
/// # use hyper::{Request, Response, Body};
/// async fn hello(_: Request<Body>) -> Result<Response<Body>, hyper::Error> {
///     Ok(Response::new(Body::empty()))
/// }
///
/// let handler: Box<dyn Handler> = Box::new(hello);
/// ```
pub trait Handler: Send + Sync {
    fn handle(
        &self,
        req: Request<Body>,
    ) -> Pin<Box<dyn Future<Output = hyper::Result<Response<Body>>> + Send>>;
}

impl<F, R> Handler for F
where
    F: Fn(Request<Body>) -> R + Send + Sync,
    R: Future<Output = Result<Response<Body>, hyper::Error>> + Send + 'static,
{
    fn handle(
        &self,
        req: Request<Body>,
    ) -> Pin<Box<dyn Future<Output = hyper::Result<Response<Body>>> + Send>> {
        Box::pin(self(req))
    }
}

#[doc(hidden)]
pub struct MakeRouterService(RouterService);

impl<T> Service<T> for MakeRouterService {
    type Response = RouterService;
    type Error = hyper::Error;
    type Future = future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _: T) -> Self::Future {
        let service = self.0.clone();
        future::ok(service)
    }
}

#[doc(hidden)]
#[derive(Clone)]
pub struct RouterService(Arc<Router>);

impl RouterService {
    fn new(router: Router) -> Self {
        RouterService(Arc::new(router))
    }
}

impl Service<Request<Body>> for RouterService {
    type Response = Response<Body>;
    type Error = hyper::Error;
    type Future = ResponseFut;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        self.0.serve(req)
    }
}

impl Router {
    /// Converts the `Router` into a `Service` which you can serve directly with `Hyper`.
    /// If you have an existing `Service` that you want to incorporate a `Router` into, see
    /// [`Router::serve`](crate::Router::serve).
    /// ```rust,no_run
    /// # use staticrouter::Router;
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// // Our router...
    /// let router = Router::default();
    ///
    /// // Convert it into a service...
    /// let service = router.into_service();
    ///
    /// // Serve with hyper
    /// hyper::Server::bind(&([127, 0, 0, 1], 3030).into())
    ///     .serve(service)
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn into_service(self) -> MakeRouterService {
        MakeRouterService(RouterService::new(self))
    }

    /// An asynchronous function from a `Request` to a `Response`. You will generally not need to use
    /// this function directly, and instead use
    /// [`Router::into_service`](crate::Router::into_service). However, it may be useful when
    /// incorporating the router into a larger service.
    ///
    /// The request path is percent-decoded before dispatch; a path that does
    /// not decode to UTF-8 is answered with `400 Bad Request`. The matched
    /// [`Params`] are inserted into the request extensions.
    pub fn serve(&self, mut req: Request<Body>) -> ResponseFut {
        let path = match urlencoding::decode(req.uri().path()) {
            Ok(path) => path.into_owned(),
            Err(_) => {
                tracing::debug!(uri = %req.uri(), "path is not valid UTF-8");
                return ResponseFutKind::BadRequest.into();
            }
        };

        if let Some(found) = self.dispatch(&path) {
            tracing::debug!(path = %path, route = found.template(), "dispatching");
            let (handler, params) = found.into_parts();
            req.extensions_mut().insert(params);
            return ResponseFutKind::Boxed(handler.handle(req)).into();
        }

        tracing::debug!(path = %path, "no route");
        match self.not_found {
            Some(ref handler) => ResponseFutKind::Boxed(handler.handle(req)).into(),
            None => ResponseFutKind::NotFound.into(),
        }
    }
}

pub struct ResponseFut {
    kind: ResponseFutKind,
}

impl From<ResponseFutKind> for ResponseFut {
    fn from(kind: ResponseFutKind) -> Self {
        Self { kind }
    }
}

enum ResponseFutKind {
    Boxed(Pin<Box<dyn Future<Output = hyper::Result<Response<Body>>> + Send>>),
    BadRequest,
    NotFound,
}

impl Future for ResponseFut {
    type Output = hyper::Result<Response<Body>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let ready = match self.kind {
            ResponseFutKind::Boxed(ref mut fut) => ready!(fut.as_mut().poll(cx)),
            ResponseFutKind::BadRequest => Ok(empty(StatusCode::BAD_REQUEST)),
            ResponseFutKind::NotFound => Ok(empty(StatusCode::NOT_FOUND)),
        };

        Poll::Ready(ready)
    }
}

fn empty(status: StatusCode) -> Response<Body> {
    let mut res = Response::new(Body::empty());
    *res.status_mut() = status;
    res
}
