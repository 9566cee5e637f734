//! GitHub OAuth bridge for the CMS.
//!
//! `GET /api/auth` sends the browser to GitHub with a random `state` value
//! that is also pinned in a short-lived cookie. `GET /api/auth/callback`
//! checks that value, trades the code for a token, and answers with a page
//! that stores the token where the CMS looks for it before moving on to the
//! admin UI.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::env::{GITHUB_CLIENT_ID, GITHUB_CLIENT_SECRET};
use crate::error::ApiError;
use crate::server::SharedState;

/// The only supported provider.
pub const PROVIDER: &str = "github";

const SCOPE: &str = "repo,user";
const STATE_COOKIE: &str = "kpack_oauth_state";
const STATE_COOKIE_PATH: &str = "/api/auth";
const STATE_LEN: usize = 32;

/// Delay before the success page moves on to the admin UI.
const REDIRECT_DELAY_MS: u64 = 2000;

/// Storage keys the CMS reads the session from.
const STORAGE_KEYS: [&str; 2] = ["netlify-cms-user", "decap-cms-user"];

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    provider: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<String>,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

fn callback_url(site_base: &str) -> String {
    format!("{}/api/auth/callback", site_base)
}

/// Build the provider authorization URL.
pub fn authorization_url(
    authorize_url: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        authorize_url,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", SCOPE),
            ("state", state),
        ],
    )
}

/// `GET /api/auth?provider=github`
pub async fn authorize(
    State(state): State<SharedState>,
    Query(query): Query<AuthQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if query.provider.as_deref() != Some(PROVIDER) {
        return Err(ApiError::bad_request("Only GitHub provider is supported"));
    }

    let client_id = state
        .env
        .get(GITHUB_CLIENT_ID)
        .ok_or_else(|| ApiError::internal("GITHUB_CLIENT_ID is not set"))?;

    let nonce = random_state();
    let url = authorization_url(
        &state.config.authorize_url,
        &client_id,
        &callback_url(state.config.site_base()),
        &nonce,
    )
    .map_err(|e| ApiError::internal(format!("bad authorize URL: {}", e)))?;

    let cookie = Cookie::build((STATE_COOKIE, nonce))
        .path(STATE_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    tracing::debug!("Redirecting to OAuth provider");

    Ok((
        StatusCode::FOUND,
        jar.add(cookie),
        [(header::LOCATION, url.to_string())],
    ))
}

/// `GET /api/auth/callback?code=...&state=...`
pub async fn callback(
    State(state): State<SharedState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("No authorization code provided"))?;

    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    match (expected, query.state) {
        (Some(expected), Some(returned)) if !expected.is_empty() && expected == returned => {}
        _ => return Err(ApiError::bad_request("Invalid OAuth state")),
    }

    let token = exchange_code(&state, &code).await?;
    tracing::info!("OAuth token exchange succeeded");

    let admin_url = format!(
        "{}{}#/collections/docs",
        state.config.site_base(),
        crate::cms::ADMIN_INDEX
    );

    let jar = jar.remove(Cookie::build(STATE_COOKIE).path(STATE_COOKIE_PATH));

    Ok((
        jar,
        [(header::CACHE_CONTROL, "no-store")],
        Html(success_page(&token, &admin_url)),
    ))
}

/// Trade an authorization code for an access token.
async fn exchange_code(state: &SharedState, code: &str) -> Result<String, ApiError> {
    let request = TokenRequest {
        client_id: state.env.get(GITHUB_CLIENT_ID),
        client_secret: state.env.get(GITHUB_CLIENT_SECRET),
        code,
    };

    let response = state
        .http
        .post(&state.config.token_url)
        .header(reqwest::header::ACCEPT, "application/json")
        .json(&request)
        .send()
        .await
        .map_err(|e| ApiError::internal(format!("token exchange failed: {}", e)))?;

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| ApiError::internal(format!("unreadable token response: {}", e)))?;

    if let Some(error) = body.error {
        return Err(ApiError::BadRequest(body.error_description.unwrap_or(error)));
    }

    body.access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::internal("token response had no access_token"))
}

/// Encode a value as a JS string literal that cannot close the surrounding
/// `<script>` element.
fn script_literal(value: &str) -> String {
    serde_json::Value::from(value)
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn success_page(token: &str, admin_url: &str) -> String {
    let token = script_literal(token);
    let admin_url = script_literal(admin_url);
    let keys = STORAGE_KEYS
        .iter()
        .map(|k| script_literal(k))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>GitHub Authentication Successful</title>
  <style>
    body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); margin: 0; display: flex; justify-content: center; align-items: center; min-height: 100vh; color: white; }}
    .card {{ text-align: center; background: rgba(255,255,255,0.1); padding: 3rem; border-radius: 15px; }}
    .spinner {{ border: 3px solid rgba(255,255,255,0.3); border-top: 3px solid white; border-radius: 50%; width: 30px; height: 30px; animation: spin 1s linear infinite; margin: 2rem auto 0; }}
    @keyframes spin {{ to {{ transform: rotate(360deg); }} }}
  </style>
</head>
<body>
  <div class="card">
    <h1>GitHub Authentication Successful!</h1>
    <p>You have successfully logged in with GitHub.</p>
    <p>Redirecting you to the CMS dashboard...</p>
    <div class="spinner"></div>
  </div>
  <script>
    (function() {{
      var user = JSON.stringify({{ login: 'authenticated', token: {token}, backendName: 'github' }});
      [{keys}].forEach(function(key) {{
        localStorage.setItem(key, user);
      }});
      setTimeout(function() {{
        window.location.href = {admin_url};
      }}, {delay});
    }})();
  </script>
</body>
</html>"#,
        token = token,
        keys = keys,
        admin_url = admin_url,
        delay = REDIRECT_DELAY_MS,
    )
}
