// AC Infinity cloud HTTP client
//
// Wraps `reqwest::Client` with the vendor's header set, form-encoded POST
// bodies, and `{ code, msg, data }` envelope unwrapping. Endpoint methods
// live in `auth`, `devices` and `settings` as inherent impls so this
// module stays focused on transport mechanics.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use secrecy::SecretString;
use tracing::{debug, info};
use url::Url;

use crate::error::Error;
use crate::models::{ApiResponse, JsonObject, encode_form};
use crate::transport::TransportConfig;

pub(crate) const API_URL_LOGIN: &str = "/api/user/appUserLogin";
pub(crate) const API_URL_GET_DEVICE_INFO_LIST_ALL: &str = "/api/user/devInfoListAll";
pub(crate) const API_URL_GET_DEV_MODE_SETTING: &str = "/api/dev/getdevModeSettingList";
pub(crate) const API_URL_ADD_DEV_MODE: &str = "/api/dev/addDevMode";
pub(crate) const API_URL_GET_DEV_SETTING: &str = "/api/dev/getDevSetting";
pub(crate) const API_URL_UPDATE_ADV_SETTING: &str = "/api/dev/updateAdvSetting";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Async client for the AC Infinity cloud.
///
/// Holds the account credentials and, after [`login`](Self::login), the
/// user id the cloud hands back. That id doubles as the `token` header on
/// every subsequent call. The session lives in an `ArcSwapOption` so a
/// shared client can be re-authenticated without `&mut`.
pub struct AcInfinityClient {
    http: reqwest::Client,
    base_url: Url,
    email: String,
    password: SecretString,
    user_id: ArcSwapOption<String>,
}

impl AcInfinityClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(
        base_url: Url,
        email: String,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, email, password))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        email: String,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            email,
            password,
            user_id: ArcSwapOption::empty(),
        }
    }

    /// The API host.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The account e-mail.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn password(&self) -> &SecretString {
        &self.password
    }

    /// True once `login()` has stored a user id.
    pub fn is_logged_in(&self) -> bool {
        self.user_id.load().is_some()
    }

    /// The user id of the current session.
    pub fn user_id(&self) -> Option<Arc<String>> {
        self.user_id.load_full()
    }

    pub(crate) fn set_user_id(&self, user_id: Option<String>) {
        self.user_id.store(user_id.map(Arc::new));
    }

    pub(crate) fn require_login(&self) -> Result<Arc<String>, Error> {
        self.user_id().ok_or(Error::NotLoggedIn)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// POST a form payload and unwrap the envelope.
    ///
    /// `authenticated` adds the `token` header; calls that need it check
    /// [`require_login`](Self::require_login) before getting here.
    pub(crate) async fn post(
        &self,
        path: &str,
        payload: &JsonObject,
        authenticated: bool,
    ) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let mut request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
            .body(encode_form(payload));

        if authenticated {
            if let Some(token) = self.user_id() {
                request = request.header("token", token.as_str());
            }
        }

        let resp = request.send().await.map_err(Error::Transport)?;
        self.parse_envelope(path, resp).await
    }

    /// Check the HTTP status, then the envelope `code`.
    ///
    /// Login rejections surface as [`Error::InvalidAuth`]; every other
    /// endpoint reports [`Error::RequestFailed`] with the raw body.
    async fn parse_envelope(
        &self,
        path: &str,
        resp: reqwest::Response,
    ) -> Result<ApiResponse, Error> {
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::CannotConnect {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        let envelope: ApiResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if path == API_URL_UPDATE_ADV_SETTING {
            info!(code = envelope.code, msg = ?envelope.msg, "advanced settings update response");
        }

        if envelope.is_success() {
            return Ok(envelope);
        }

        let message = envelope
            .msg
            .clone()
            .unwrap_or_else(|| format!("code={}", envelope.code));

        if path == API_URL_LOGIN {
            Err(Error::InvalidAuth { message })
        } else {
            Err(Error::RequestFailed {
                path: path.to_owned(),
                code: envelope.code,
                message,
                body,
            })
        }
    }
}

impl std::fmt::Debug for AcInfinityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcInfinityClient")
            .field("base_url", &self.base_url.as_str())
            .field("email", &self.email)
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}
