// Account authentication
//
// The cloud has no session cookie: login returns the account's user id,
// which is then sent back as the `token` header on every data call.

use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::debug;

use crate::client::{API_URL_LOGIN, AcInfinityClient};
use crate::error::Error;
use crate::models::{JsonObject, id_string};

/// The cloud rejects passwords longer than this; the mobile apps
/// silently truncate, so we do the same.
pub const MAX_PASSWORD_LEN: usize = 25;

impl AcInfinityClient {
    /// Log in with the configured e-mail and password.
    ///
    /// `POST /api/user/appUserLogin` with `appEmail` and `appPasswordl`.
    /// On success the returned `appId` becomes the session token.
    pub async fn login(&self) -> Result<(), Error> {
        debug!(email = %self.email(), "logging in");

        let password: String = self
            .password()
            .expose_secret()
            .chars()
            .take(MAX_PASSWORD_LEN)
            .collect();

        let mut payload = JsonObject::new();
        payload.insert("appEmail".into(), Value::String(self.email().to_owned()));
        payload.insert("appPasswordl".into(), Value::String(password));

        let envelope = self.post(API_URL_LOGIN, &payload, false).await?;

        let user_id = envelope
            .data
            .get("appId")
            .and_then(id_string)
            .ok_or_else(|| Error::Deserialization {
                message: "login response carried no appId".into(),
                body: envelope.data.to_string(),
            })?;

        self.set_user_id(Some(user_id));
        debug!("login successful");
        Ok(())
    }

    /// Forget the current session.
    ///
    /// The cloud has no logout endpoint; the next data call will fail with
    /// [`Error::NotLoggedIn`] until [`login`](Self::login) runs again.
    pub fn logout(&self) {
        self.set_user_id(None);
        debug!("session cleared");
    }
}
