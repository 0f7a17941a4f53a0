// Write endpoints
//
// Both update calls are read-modify-write: the current values are fetched,
// reshaped into what the update endpoint accepts, patched with the caller's
// key/values, and posted back whole. The reshaping rules mirror what the
// mobile app sends; the endpoints answer 400 or silently rename the
// controller when they are not followed.

use serde_json::Value;
use tracing::debug;

use crate::client::{API_URL_ADD_DEV_MODE, API_URL_UPDATE_ADV_SETTING, AcInfinityClient};
use crate::error::Error;
use crate::keys::{control, setting};
use crate::models::{JsonObject, integer_id};

/// Fields of a port-controls fetch that the update call rejects.
const MODE_SETTINGS_DROPPED: [&str; 3] = [
    control::DEVICE_MAC_ADDR,
    control::IPC_SETTING,
    control::DEV_SETTING,
];

/// Fields the app always sends to `addDevMode` even if the fetch lacks them.
const MODE_SETTINGS_DEFAULTED: [&str; 2] = [control::VPD_STATUS, control::VPD_NUMS];

const ADVANCED_SETTINGS_DROPPED: [&str; 10] = [
    setting::SET_ID,
    setting::DEV_MAC_ADDR,
    setting::PORT_RESISTANCE,
    setting::DEV_TIME_ZONE,
    setting::SENSOR_SETTING,
    setting::SENSOR_TRANS_BUFF,
    setting::SUB_DEVICE_VERSION,
    setting::SEC_FUC_REPORT_TIME,
    setting::UPDATE_ALL_PORT,
    setting::CALIBRATION_TIME,
];

/// String fields that must be present, with `null` sent as "".
const ADVANCED_SETTINGS_EMPTY_STRINGS: [&str; 4] = [
    setting::SENSOR_TRANS_BUFF_STR,
    setting::SENSOR_SETTING_STR,
    setting::PORT_PARAM_DATA,
    setting::PARAM_SENSORS,
];

const ADVANCED_SETTINGS_DEFAULTED: [&str; 5] = [
    setting::SENSOR_ONE_TYPE,
    setting::IS_SHARE,
    setting::TARGET_VPD_SWITCH,
    setting::SENSOR_TWO_TYPE,
    setting::ZONE_SENSOR_TYPE,
];

// ── Payload shaping ─────────────────────────────────────────────────

fn coerce_id(payload: &mut JsonObject, key: &str) -> Result<(), Error> {
    let value = payload.get(key).ok_or_else(|| Error::MalformedPayload {
        field: key.into(),
        reason: "is missing".into(),
    })?;
    let id = integer_id(value).ok_or_else(|| Error::MalformedPayload {
        field: key.into(),
        reason: format!("is not an integer id: {value}"),
    })?;
    payload.insert(key.into(), id);
    Ok(())
}

fn zero_nulls(payload: &mut JsonObject) {
    for value in payload.values_mut() {
        if value.is_null() {
            *value = Value::from(0);
        }
    }
}

fn apply_key_values(payload: &mut JsonObject, key_values: &[(&str, i64)]) {
    for (key, value) in key_values {
        payload.insert((*key).to_owned(), Value::from(*value));
    }
}

/// Turn a `getdevModeSettingList` result into an `addDevMode` body.
pub fn prepare_mode_settings_payload(
    mut controls: JsonObject,
    key_values: &[(&str, i64)],
) -> Result<JsonObject, Error> {
    for key in MODE_SETTINGS_DROPPED {
        controls.remove(key);
    }
    for key in MODE_SETTINGS_DEFAULTED {
        controls.entry(key).or_insert(Value::from(0));
    }

    coerce_id(&mut controls, control::DEV_ID)?;
    coerce_id(&mut controls, control::MODE_SET_ID)?;

    apply_key_values(&mut controls, key_values);
    zero_nulls(&mut controls);
    Ok(controls)
}

/// Turn a `getDevSetting` result into an `updateAdvSetting` body.
///
/// The fetch does not include the device name, and posting without one
/// renames the controller or port to "None", so `device_name` is required.
pub fn prepare_advanced_settings_payload(
    mut settings: JsonObject,
    device_name: &str,
    key_values: &[(&str, i64)],
) -> Result<JsonObject, Error> {
    settings.insert(setting::DEV_NAME.into(), Value::String(device_name.to_owned()));

    for key in ADVANCED_SETTINGS_DROPPED {
        settings.remove(key);
    }
    for key in ADVANCED_SETTINGS_EMPTY_STRINGS {
        let entry = settings.entry(key).or_insert(Value::Null);
        if entry.is_null() {
            *entry = Value::String(String::new());
        }
    }
    for key in ADVANCED_SETTINGS_DEFAULTED {
        settings.entry(key).or_insert(Value::from(0));
    }

    coerce_id(&mut settings, setting::DEV_ID)?;
    zero_nulls(&mut settings);
    apply_key_values(&mut settings, key_values);
    Ok(settings)
}

// ── Endpoints ───────────────────────────────────────────────────────

impl AcInfinityClient {
    /// Change mode controls of one port.
    ///
    /// `POST /api/dev/addDevMode` with the full, reshaped controls payload.
    pub async fn set_device_mode_settings(
        &self,
        device_id: &str,
        port: u32,
        key_values: &[(&str, i64)],
    ) -> Result<(), Error> {
        let current = self.device_mode_settings(device_id, port).await?;
        let payload = prepare_mode_settings_payload(current, key_values)?;

        debug!(device_id, port, ?key_values, "updating port controls");
        self.post(API_URL_ADD_DEV_MODE, &payload, true).await?;
        Ok(())
    }

    /// Change advanced settings of a controller (`port` 0) or one port.
    ///
    /// `POST /api/dev/updateAdvSetting`. `device_name` must be the current
    /// controller name (port 0) or port name, as last seen in a refresh.
    pub async fn update_advanced_settings(
        &self,
        device_id: &str,
        port: u32,
        device_name: &str,
        key_values: &[(&str, i64)],
    ) -> Result<(), Error> {
        let current = self.device_settings(device_id, port).await?;
        let payload = prepare_advanced_settings_payload(current, device_name, key_values)?;

        debug!(device_id, port, ?key_values, "updating advanced settings");
        self.post(API_URL_UPDATE_ADV_SETTING, &payload, true).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(obj) => obj,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn mode_settings_payload_is_reshaped() {
        let controls = object(json!({
            "devId": "1424979258063355749",
            "modeSetid": "1678871847944916993",
            "devMacAddr": null,
            "ipcSetting": {"a": 1},
            "devSetting": {"devCt": 0},
            "onSpead": 5,
            "surplus": null,
        }));

        let payload = prepare_mode_settings_payload(controls, &[("onSpead", 7)]).unwrap();

        assert_eq!(
            Value::Object(payload),
            json!({
                "devId": 1_424_979_258_063_355_749_i64,
                "modeSetid": 1_678_871_847_944_916_993_i64,
                "onSpead": 7,
                "surplus": 0,
                "vpdnums": 0,
                "vpdstatus": 0,
            })
        );
    }

    #[test]
    fn mode_settings_payload_keeps_existing_vpd_fields() {
        let controls = object(json!({"devId": 1, "modeSetid": 2, "vpdnums": 83}));
        let payload = prepare_mode_settings_payload(controls, &[]).unwrap();
        assert_eq!(payload["vpdnums"], json!(83));
    }

    #[test]
    fn mode_settings_payload_requires_mode_set_id() {
        let controls = object(json!({"devId": 1}));
        let err = prepare_mode_settings_payload(controls, &[]).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { ref field, .. } if field == "modeSetid"));
    }

    #[test]
    fn advanced_settings_payload_is_reshaped() {
        let settings = object(json!({
            "devId": "1424979258063355749",
            "setId": null,
            "devMacAddr": "2B120D62DC00",
            "portResistance": 3300,
            "devTimeZone": "GMT-05:00",
            "sensorSettingStr": null,
            "isShare": 1,
            "devCt": null,
            "devCh": 2,
        }));

        let payload =
            prepare_advanced_settings_payload(settings, "Grow Tent", &[("devCh", 4)]).unwrap();

        assert_eq!(
            Value::Object(payload),
            json!({
                "devId": 1_424_979_258_063_355_749_i64,
                "devName": "Grow Tent",
                "devCt": 0,
                "devCh": 4,
                "isShare": 1,
                "sensorTransBuffStr": "",
                "sensorSettingStr": "",
                "portParamData": "",
                "paramSensors": "",
                "sensorOneType": 0,
                "targetVpdSwitch": 0,
                "sensorTwoType": 0,
                "zoneSensorType": 0,
            })
        );
    }
}
