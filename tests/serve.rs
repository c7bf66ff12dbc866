use hyper::header::{self, HeaderValue};
use hyper::{Body, Method, Request, Response, StatusCode};
use staticrouter::config::{MountConfig, ServerConfig};
use staticrouter::{Params, Router, StaticFiles};
use tempfile::TempDir;

fn site() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
    std::fs::create_dir_all(dir.path().join("js").join("lib")).unwrap();
    std::fs::write(dir.path().join("js").join("lib").join("x.js"), "let x = 1;").unwrap();
    std::fs::write(dir.path().join("NOTES.TXT"), "notes").unwrap();
    std::fs::write(dir.path().join("data.bin"), [1u8, 2, 3]).unwrap();
    dir
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body(res: Response<Body>) -> String {
    let bytes = hyper::body::to_bytes(res.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn content_type(res: &Response<Body>) -> &str {
    res.headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
}

fn router_for(dir: &TempDir) -> Router {
    ServerConfig {
        document_root: dir.path().to_path_buf(),
        mounts: vec![
            MountConfig {
                template: "/js/<path:filepath>".to_string(),
                root: Some("js".into()),
            },
            MountConfig::new("/"),
            MountConfig::new("/<path:filepath>"),
        ],
        ..Default::default()
    }
    .router()
    .unwrap()
}

#[tokio::test]
async fn serves_index_for_root() {
    let dir = site();
    let router = router_for(&dir);

    let res = router.serve(get("/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(content_type(&res), "text/html");
    assert_eq!(
        res.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, no-cache"
    );
    assert_eq!(body(res).await, "<h1>home</h1>");
}

#[tokio::test]
async fn serves_nested_files_through_rest_of_path() {
    let dir = site();
    let router = router_for(&dir);

    let res = router.serve(get("/js/lib/x.js")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(content_type(&res), "application/javascript");
    assert_eq!(body(res).await, "let x = 1;");
}

#[tokio::test]
async fn media_types_are_case_insensitive_with_fallback() {
    let dir = site();
    let router = router_for(&dir);

    let res = router.serve(get("/NOTES.TXT")).await.unwrap();
    assert_eq!(content_type(&res), "text/plain");

    let res = router.serve(get("/data.bin")).await.unwrap();
    assert_eq!(content_type(&res), "application/octet-stream");
}

#[tokio::test]
async fn missing_file_is_an_empty_404() {
    let dir = site();
    let router = router_for(&dir);

    for uri in &["/missing.html", "/js/missing.js", "/js/lib/", "/../index.html/x"] {
        let res = router.serve(get(uri)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert!(res.headers().is_empty(), "{}", uri);
        assert_eq!(body(res).await, "", "{}", uri);
    }
}

#[tokio::test]
async fn nul_byte_in_path_is_an_empty_404() {
    let dir = site();
    let router = Router::default()
        .serve_files("/<path:filepath>", StaticFiles::new(dir.path()))
        .unwrap();

    for uri in &["/a%00b.txt", "/index.html%00", "/%00"] {
        let res = router.serve(get(uri)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert!(res.headers().is_empty(), "{}", uri);
        assert_eq!(body(res).await, "", "{}", uri);
    }
}

#[tokio::test]
async fn dot_segments_do_not_reach_the_index() {
    let dir = site();
    std::fs::write(dir.path().join("js").join("index.html"), "js index").unwrap();
    let router = router_for(&dir);

    for uri in &["/js/..", "/js/.", "/js/./", "/js/lib/..", "/.."] {
        let res = router.serve(get(uri)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body(res).await, "", "{}", uri);
    }

    let res = router.serve(get("/")).await.unwrap();
    assert_eq!(body(res).await, "<h1>home</h1>");
}

#[tokio::test]
async fn revalidation_round_trip() {
    let dir = site();
    let router = router_for(&dir);

    let first = router.serve(get("/index.html")).await.unwrap();
    let etag = first.headers().get(header::ETAG).unwrap().clone();
    let last_modified = first.headers().get(header::LAST_MODIFIED).unwrap().clone();
    assert!(etag.to_str().unwrap().starts_with("W/\""));

    let req = Request::builder()
        .uri("/index.html")
        .header(header::IF_NONE_MATCH, etag.clone())
        .body(Body::empty())
        .unwrap();
    let res = router.serve(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(res.headers().get(header::ETAG), Some(&etag));
    assert_eq!(body(res).await, "");

    let req = Request::builder()
        .uri("/index.html")
        .header(header::IF_MODIFIED_SINCE, last_modified)
        .body(Body::empty())
        .unwrap();
    let res = router.serve(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_MODIFIED);

    // a changed file no longer matches the old validator
    std::fs::write(dir.path().join("index.html"), "<h1>home, again</h1>").unwrap();
    let req = Request::builder()
        .uri("/index.html")
        .header(header::IF_NONE_MATCH, etag.clone())
        .body(Body::empty())
        .unwrap();
    let res = router.serve(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_ne!(res.headers().get(header::ETAG), Some(&etag));
    assert_eq!(body(res).await, "<h1>home, again</h1>");
}

#[tokio::test]
async fn head_and_other_methods() {
    let dir = site();
    let router = router_for(&dir);

    let req = Request::builder()
        .method(Method::HEAD)
        .uri("/index.html")
        .body(Body::empty())
        .unwrap();
    let res = router.serve(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(header::CONTENT_LENGTH),
        Some(&HeaderValue::from_static("13"))
    );
    assert_eq!(body(res).await, "");

    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/index.html")
        .body(Body::empty())
        .unwrap();
    let res = router.serve(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn percent_encoded_file_names() {
    let dir = site();
    std::fs::write(dir.path().join("two words.txt"), "spaced").unwrap();
    let router = router_for(&dir);

    let res = router.serve(get("/two%20words.txt")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body(res).await, "spaced");
}

#[tokio::test]
async fn handlers_and_files_share_one_table() {
    async fn item(req: Request<Body>) -> hyper::Result<Response<Body>> {
        let params = req.extensions().get::<Params>().unwrap();
        Ok(Response::new(Body::from(format!("item {}", params.get("id").unwrap()))))
    }

    let dir = site();
    let router = Router::default()
        .register_expecting("/item/<int:id>", &["id"], item)
        .unwrap()
        .serve_files("/<path:filepath>", StaticFiles::new(dir.path()))
        .unwrap();

    let res = router.serve(get("/item/42")).await.unwrap();
    assert_eq!(body(res).await, "item 42");

    // not an int, so it falls through to the files, which have no such file
    let res = router.serve(get("/item/4x2")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catch_all_registered_first_wins() {
    async fn fixed(_: Request<Body>) -> hyper::Result<Response<Body>> {
        Ok(Response::new(Body::from("fixed")))
    }

    let dir = site();
    let shadowed = Router::default()
        .serve_files("/<path:filepath>", StaticFiles::new(dir.path()))
        .unwrap()
        .register("/index.html", fixed)
        .unwrap();
    let res = shadowed.serve(get("/index.html")).await.unwrap();
    assert_eq!(body(res).await, "<h1>home</h1>");

    let specific = Router::default()
        .register("/index.html", fixed)
        .unwrap()
        .serve_files("/<path:filepath>", StaticFiles::new(dir.path()))
        .unwrap();
    let res = specific.serve(get("/index.html")).await.unwrap();
    assert_eq!(body(res).await, "fixed");
}
