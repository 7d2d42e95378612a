//! Access-gate integration tests.
//!
//! Drives the full router in-process via `tower::ServiceExt::oneshot`, with
//! no listener and no real network. Covers the cookie contract end to end: login
//! round-trip, gate redirects, public-path bypass, and traversal rejection.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use foyer::auth::Authenticator;
use foyer::server::{AppState, build_router};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tower::util::ServiceExt;

const PASSWORD: &str = "hunter2";

/// A minimal gallery site plus the token a valid session carries. The site
/// root is a subdirectory of the tempdir so traversal tests have somewhere
/// real to escape to.
fn setup_site() -> (TempDir, String) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("site");
    fs::create_dir_all(root.join("assets")).unwrap();
    fs::write(root.join("index.html"), "<h1>gallery</h1>").unwrap();
    fs::write(root.join("styles.css"), "body{}").unwrap();
    fs::write(root.join("gallery.generated.json"), "{}").unwrap();
    fs::write(root.join("assets/beach.jpg"), b"\xFF\xD8fake").unwrap();
    fs::write(tmp.path().join("outside.txt"), "secret").unwrap();

    let token = Authenticator::new(PASSWORD, None)
        .expected_token()
        .to_string();
    (tmp, token)
}

fn site_root(tmp: &TempDir) -> std::path::PathBuf {
    tmp.path().join("site")
}

fn app(root: &Path) -> axum::Router {
    let state = AppState::new(Authenticator::new(PASSWORD, None), root.to_path_buf());
    build_router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("foyer_session={token}"))
        .body(Body::empty())
        .unwrap()
}

fn login_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn location(response: &axum::http::Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("expected a Location header")
        .to_str()
        .unwrap()
}

async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

// =============================================================================
// Gate behavior
// =============================================================================

#[tokio::test]
async fn gallery_without_cookie_redirects_to_login() {
    let (site, _) = setup_site();
    let response = app(&site_root(&site)).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn gallery_with_valid_cookie_is_served() {
    let (site, token) = setup_site();
    let response = app(&site_root(&site))
        .oneshot(get_with_cookie("/", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("gallery"));
}

#[tokio::test]
async fn gallery_with_wrong_cookie_redirects_to_login() {
    let (site, _) = setup_site();
    let response = app(&site_root(&site))
        .oneshot(get_with_cookie("/", "forged-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn static_assets_require_the_session() {
    let (site, token) = setup_site();

    let denied = app(&site_root(&site))
        .oneshot(get("/assets/beach.jpg"))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::SEE_OTHER);

    let allowed = app(&site_root(&site))
        .oneshot(get_with_cookie("/assets/beach.jpg", &token))
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
    assert_eq!(
        allowed.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpeg"
    );
}

#[tokio::test]
async fn manifest_is_served_behind_the_gate() {
    let (site, token) = setup_site();
    let response = app(&site_root(&site))
        .oneshot(get_with_cookie("/gallery.generated.json", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
}

// =============================================================================
// Public paths
// =============================================================================

#[tokio::test]
async fn login_page_is_public() {
    let (site, _) = setup_site();
    let response = app(&site_root(&site)).oneshot(get("/login")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("type=\"password\""));
}

#[tokio::test]
async fn stylesheet_and_health_are_public() {
    let (site, _) = setup_site();

    let css = app(&site_root(&site)).oneshot(get("/styles.css")).await.unwrap();
    assert_eq!(css.status(), StatusCode::OK);

    let health = app(&site_root(&site)).oneshot(get("/health")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert!(body_string(health).await.contains("ok"));
}

// =============================================================================
// Login round-trip
// =============================================================================

#[tokio::test]
async fn correct_password_sets_cookie_and_redirects_home() {
    let (site, token) = setup_site();
    let response = app(&site_root(&site))
        .oneshot(login_post("password=hunter2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set the session cookie")
        .to_str()
        .unwrap();
    assert!(cookie.contains(&token));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Max-Age=28800"));
}

#[tokio::test]
async fn wrong_password_redirects_with_error_flag() {
    let (site, _) = setup_site();
    let response = app(&site_root(&site))
        .oneshot(login_post("password=letmein"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?error=1");
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn empty_password_re_renders_login_with_message() {
    let (site, _) = setup_site();
    let response = app(&site_root(&site))
        .oneshot(login_post("password="))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("Password is required."));
}

#[tokio::test]
async fn login_error_flag_shows_message() {
    let (site, _) = setup_site();
    let response = app(&site_root(&site))
        .oneshot(get("/login?error=1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Incorrect password."));
}

#[tokio::test]
async fn logout_clears_cookie_and_redirects_to_login() {
    let (site, _) = setup_site();
    let response = app(&site_root(&site)).oneshot(get("/logout")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.contains("Max-Age=0"));
}

// =============================================================================
// Traversal
// =============================================================================

#[tokio::test]
async fn encoded_traversal_fails_closed() {
    let (site, token) = setup_site();
    // setup_site planted outside.txt one level above the site root.
    let response = app(&site_root(&site))
        .oneshot(get_with_cookie("/assets/%2e%2e/%2e%2e/outside.txt", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, "Not found");
}

#[tokio::test]
async fn missing_file_is_a_generic_404() {
    let (site, token) = setup_site();
    let response = app(&site_root(&site))
        .oneshot(get_with_cookie("/assets/nope.jpg", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, "Not found");
}
