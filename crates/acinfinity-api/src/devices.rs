// Read endpoints
//
// Controller inventory (with live sensor readings), per-port mode
// controls, and per-controller/per-port advanced settings.

use serde_json::Value;
use tracing::debug;

use crate::client::{
    API_URL_GET_DEV_MODE_SETTING, API_URL_GET_DEV_SETTING, API_URL_GET_DEVICE_INFO_LIST_ALL,
    AcInfinityClient,
};
use crate::error::Error;
use crate::models::JsonObject;

impl AcInfinityClient {
    /// List every controller on the account, including live readings.
    ///
    /// `POST /api/user/devInfoListAll` with `userId`. Settings are not part
    /// of this payload.
    pub async fn devices_list_all(&self) -> Result<Vec<JsonObject>, Error> {
        let user_id = self.require_login()?;
        debug!("listing controllers");

        let mut payload = JsonObject::new();
        payload.insert("userId".into(), Value::String(user_id.as_str().to_owned()));

        let envelope = self
            .post(API_URL_GET_DEVICE_INFO_LIST_ALL, &payload, true)
            .await?;

        match envelope.data {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(obj) => Some(obj),
                    _ => None,
                })
                .collect()),
            Value::Null => Ok(Vec::new()),
            other => Err(Error::Deserialization {
                message: "devInfoListAll data is not an array".into(),
                body: other.to_string(),
            }),
        }
    }

    /// Fetch the mode controls of one port: speeds, triggers, timers and
    /// schedules.
    ///
    /// `POST /api/dev/getdevModeSettingList` with `devId` and `port`.
    pub async fn device_mode_settings(
        &self,
        device_id: &str,
        port: u32,
    ) -> Result<JsonObject, Error> {
        self.require_login()?;
        debug!(device_id, port, "fetching port controls");
        self.fetch_object(API_URL_GET_DEV_MODE_SETTING, device_id, port)
            .await
    }

    /// Fetch advanced settings for a controller (`port` 0) or one port.
    ///
    /// `POST /api/dev/getDevSetting` with `devId` and `port`.
    pub async fn device_settings(&self, device_id: &str, port: u32) -> Result<JsonObject, Error> {
        self.require_login()?;
        debug!(device_id, port, "fetching advanced settings");
        self.fetch_object(API_URL_GET_DEV_SETTING, device_id, port)
            .await
    }

    async fn fetch_object(
        &self,
        path: &str,
        device_id: &str,
        port: u32,
    ) -> Result<JsonObject, Error> {
        let mut payload = JsonObject::new();
        payload.insert("devId".into(), Value::String(device_id.to_owned()));
        payload.insert("port".into(), Value::from(port));

        let envelope = self.post(path, &payload, true).await?;
        match envelope.data {
            Value::Object(obj) => Ok(obj),
            other => Err(Error::Deserialization {
                message: format!("{path} data is not an object"),
                body: other.to_string(),
            }),
        }
    }
}
