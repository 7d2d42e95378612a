//! HTTP server: access gate, login flow, and gated static file serving.
//!
//! The gallery itself is a static client-side application; this server's
//! only jobs are to check the session cookie on every request and to hand
//! out files from the site root once a request is authorized.
//!
//! ## Router shape
//!
//! Two sub-routers, merged:
//!
//! - **Public**: the login page and its form handler, logout, the
//!   stylesheet and favicon (the login page needs them before any session
//!   exists), and `/health`.
//! - **Protected**: everything else, meaning the gallery index and all static
//!   assets. The session gate runs as middleware on this router only; an
//!   unauthorized request is answered with `303 See Other` to `/login`.
//!   The original destination is not preserved; after login the user
//!   always lands on the gallery root.
//!
//! Static paths are resolved strictly under the site root: any `..`
//! component, absolute component, or symlink escaping the root fails closed
//! as a generic 404, never a listing or an echo of the path.

use crate::auth::{self, Authenticator};
use axum::{
    Router,
    extract::{Path as UrlPath, Query, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use maud::{DOCTYPE, Markup, html};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared state for all handlers. The authenticator is computed once at
/// startup and immutable afterwards, so no locking is involved.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Authenticator>,
    pub site_root: Arc<PathBuf>,
}

impl AppState {
    pub fn new(auth: Authenticator, site_root: PathBuf) -> Self {
        Self {
            auth: Arc::new(auth),
            site_root: Arc::new(site_root),
        }
    }
}

/// Build the application router: protected gallery routes behind the
/// session gate, public login/support routes beside them.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/", get(serve_index))
        .route("/*path", get(serve_static))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let public = Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
        .route("/styles.css", get(serve_stylesheet))
        .route("/favicon.ico", get(serve_favicon))
        .route("/health", get(health));

    Router::new().merge(protected).merge(public).with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("foyer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}

// ---------------------------------------------------------------------------
// Session gate
// ---------------------------------------------------------------------------

/// Middleware on the protected router: pass through requests whose session
/// cookie carries the expected token, redirect everything else to login.
async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(auth::session_cookie_value)
        .is_some_and(|token| state.auth.token_matches(token));

    if authorized {
        next.run(request).await
    } else {
        debug!(path = %request.uri().path(), "unauthorized, redirecting to login");
        Redirect::to("/login").into_response()
    }
}

// ---------------------------------------------------------------------------
// Login flow
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LoginQuery {
    error: Option<String>,
}

#[derive(Deserialize)]
struct LoginForm {
    #[serde(default)]
    password: String,
}

async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    let message = query.error.map(|_| "Incorrect password.");
    Html(login_markup(message).into_string())
}

async fn login_submit(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<LoginForm>,
) -> Response {
    match state.auth.login(&form.password) {
        Ok(token) => {
            info!("login accepted");
            (
                [(header::SET_COOKIE, auth::session_cookie(token))],
                Redirect::to("/"),
            )
                .into_response()
        }
        Err(auth::AuthError::EmptyPassword) => (
            StatusCode::BAD_REQUEST,
            Html(login_markup(Some("Password is required.")).into_string()),
        )
            .into_response(),
        Err(auth::AuthError::Mismatch) => {
            debug!("login rejected");
            Redirect::to("/login?error=1").into_response()
        }
    }
}

async fn logout() -> Response {
    (
        [(header::SET_COOKIE, auth::clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

fn login_markup(message: Option<&str>) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Gallery · Sign in" }
                link rel="stylesheet" href="/styles.css";
            }
            body.login {
                main.login-card {
                    h1 { "Private gallery" }
                    @if let Some(message) = message {
                        p.login-error role="alert" { (message) }
                    }
                    form method="post" action="/login" {
                        label for="password" { "Password" }
                        input type="password"
                            id="password"
                            name="password"
                            autocomplete="current-password"
                            autofocus;
                        button type="submit" { "Enter" }
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Static files
// ---------------------------------------------------------------------------

async fn health() -> Response {
    ([(header::CONTENT_TYPE, "application/json")], r#"{"status":"ok"}"#).into_response()
}

async fn serve_index(State(state): State<AppState>) -> Response {
    serve_file(state.site_root.join("index.html")).await
}

async fn serve_stylesheet(State(state): State<AppState>) -> Response {
    serve_file(state.site_root.join("styles.css")).await
}

async fn serve_favicon(State(state): State<AppState>) -> Response {
    serve_file(state.site_root.join("favicon.ico")).await
}

async fn serve_static(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
) -> Response {
    match resolve_under_root(&state.site_root, &path) {
        Some(resolved) => serve_file(resolved).await,
        None => {
            debug!(%path, "rejected static path");
            not_found()
        }
    }
}

async fn serve_file(path: PathBuf) -> Response {
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, content_type_for(&path))],
            bytes,
        )
            .into_response(),
        Err(_) => not_found(),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// Resolve a request path strictly under the site root.
///
/// Only plain name components are accepted; `..`, `.` and absolute
/// components are refused outright. The canonical form is then required to
/// stay under the root, which also catches symlinks pointing elsewhere.
/// Returns `None` (served as a generic 404) for anything that doesn't
/// resolve to a real file inside the root.
fn resolve_under_root(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(request_path).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            _ => return None,
        }
    }

    let canonical = resolved.canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;
    canonical.starts_with(&root_canonical).then_some(canonical)
}

/// Content types for the file kinds a gallery ships.
fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
