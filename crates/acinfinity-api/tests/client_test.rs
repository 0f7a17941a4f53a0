#![allow(clippy::unwrap_used)]
// Integration tests for `AcInfinityClient` using wiremock.

use std::collections::HashMap;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use acinfinity_api::transport::APP_USER_AGENT;
use acinfinity_api::{AcInfinityClient, Error, TransportConfig};

const EMAIL: &str = "myemail@unittest.com";
const USER_ID: &str = "11763238626156107487";
const DEVICE_ID: &str = "1424979258063355749";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup_with_password(password: &str) -> (MockServer, AcInfinityClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = AcInfinityClient::new(
        base_url,
        EMAIL.into(),
        SecretString::from(password.to_owned()),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

async fn setup() -> (MockServer, AcInfinityClient) {
    setup_with_password("hunter2").await
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/user/appUserLogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "msg": "Success",
            "code": 200,
            "data": { "appId": USER_ID, "nickName": EMAIL }
        })))
        .mount(server)
        .await;
}

async fn logged_in() -> (MockServer, AcInfinityClient) {
    let (server, client) = setup().await;
    mount_login(&server).await;
    client.login().await.unwrap();
    (server, client)
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "msg": "操作成功", "code": 200, "data": data }))
}

/// Decode the form body of the last request sent to `endpoint`.
async fn last_form(server: &MockServer, endpoint: &str) -> HashMap<String, String> {
    let requests = server.received_requests().await.unwrap();
    let request = requests
        .iter()
        .rev()
        .find(|r| r.url.path() == endpoint)
        .unwrap();
    url::form_urlencoded::parse(&request.body)
        .into_owned()
        .collect()
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/user/appUserLogin"))
        .and(header("user-agent", APP_USER_AGENT))
        .and(header(
            "content-type",
            "application/x-www-form-urlencoded; charset=utf-8",
        ))
        .and(body_string_contains("appEmail=myemail%40unittest.com"))
        .and(body_string_contains("appPasswordl=hunter2"))
        .respond_with(ok(json!({ "appId": USER_ID })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.is_logged_in());
    client.login().await.unwrap();
    assert!(client.is_logged_in());
    assert_eq!(client.user_id().unwrap().as_str(), USER_ID);
}

#[tokio::test]
async fn test_login_truncates_long_passwords() {
    let (server, client) = setup_with_password("abcdefghijklmnopqrstuvwxyz0123456789").await;
    mount_login(&server).await;

    client.login().await.unwrap();

    let form = last_form(&server, "/api/user/appUserLogin").await;
    assert_eq!(form["appPasswordl"], "abcdefghijklmnopqrstuvwxy");
}

#[tokio::test]
async fn test_login_rejected_is_invalid_auth() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/user/appUserLogin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "msg": "Password error", "code": 10001 })),
        )
        .mount(&server)
        .await;

    let result = client.login().await;
    assert!(
        matches!(result, Err(Error::InvalidAuth { .. })),
        "expected InvalidAuth, got: {result:?}"
    );
    assert!(!client.is_logged_in());
}

#[tokio::test]
async fn test_non_200_status_is_cannot_connect() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/user/appUserLogin"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client.login().await;
    assert!(
        matches!(result, Err(Error::CannotConnect { status: 503 })),
        "expected CannotConnect, got: {result:?}"
    );
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (_server, client) = logged_in().await;
    client.logout();
    assert!(!client.is_logged_in());
}

// ── Read endpoints ──────────────────────────────────────────────────

#[tokio::test]
async fn test_data_calls_require_login() {
    let (server, client) = setup().await;

    assert!(matches!(
        client.devices_list_all().await,
        Err(Error::NotLoggedIn)
    ));
    assert!(matches!(
        client.device_mode_settings(DEVICE_ID, 1).await,
        Err(Error::NotLoggedIn)
    ));
    assert!(matches!(
        client.device_settings(DEVICE_ID, 0).await,
        Err(Error::NotLoggedIn)
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_devices_list_all_sends_token() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/user/devInfoListAll"))
        .and(header("token", USER_ID))
        .and(body_string_contains(format!("userId={USER_ID}")))
        .respond_with(ok(json!([
            { "devId": DEVICE_ID, "devName": "Grow Tent", "devType": 11 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let devices = client.devices_list_all().await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["devName"], "Grow Tent");
}

#[tokio::test]
async fn test_failed_envelope_is_request_failed() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/dev/getDevSetting"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "msg": "Data error", "code": 500 })),
        )
        .mount(&server)
        .await;

    let err = client.device_settings(DEVICE_ID, 0).await.unwrap_err();
    assert!(matches!(
        err,
        Error::RequestFailed { code: 500, ref message, .. } if message == "Data error"
    ));
    assert!(!err.is_auth_failure());
}

#[tokio::test]
async fn test_device_settings_sends_device_and_port() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/dev/getDevSetting"))
        .and(body_string_contains(format!("devId={DEVICE_ID}")))
        .and(body_string_contains("port=2"))
        .respond_with(ok(json!({ "devId": DEVICE_ID, "loadType": 6 })))
        .mount(&server)
        .await;

    let settings = client.device_settings(DEVICE_ID, 2).await.unwrap();
    assert_eq!(settings["loadType"], 6);
}

// ── Write endpoints ─────────────────────────────────────────────────

#[tokio::test]
async fn test_set_device_mode_settings_posts_reshaped_controls() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/dev/getdevModeSettingList"))
        .respond_with(ok(json!({
            "devId": DEVICE_ID,
            "modeSetid": "1678871847944916993",
            "onSpead": 5,
            "offSpead": 0,
            "surplus": null,
            "devMacAddr": null,
            "devSetting": { "devCt": 0 }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/dev/addDevMode"))
        .and(header("token", USER_ID))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "msg": "操作成功", "code": 200 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_device_mode_settings(DEVICE_ID, 1, &[("onSpead", 8)])
        .await
        .unwrap();

    let form = last_form(&server, "/api/dev/addDevMode").await;
    assert_eq!(form["onSpead"], "8");
    assert_eq!(form["offSpead"], "0");
    assert_eq!(form["surplus"], "0");
    assert_eq!(form["vpdstatus"], "0");
    assert_eq!(form["devId"], DEVICE_ID);
    assert!(!form.contains_key("devMacAddr"));
    assert!(!form.contains_key("devSetting"));
}

#[tokio::test]
async fn test_update_advanced_settings_keeps_device_name() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/dev/getDevSetting"))
        .respond_with(ok(json!({
            "devId": DEVICE_ID,
            "setId": null,
            "devCt": 0,
            "devCh": 0,
            "devTimeZone": "GMT-05:00",
            "calibrationTime": 12
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/dev/updateAdvSetting"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "msg": "操作成功", "code": 200 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client
        .update_advanced_settings(DEVICE_ID, 0, "Grow Tent", &[("devCh", 3)])
        .await
        .unwrap();

    let form = last_form(&server, "/api/dev/updateAdvSetting").await;
    assert_eq!(form["devName"], "Grow Tent");
    assert_eq!(form["devCh"], "3");
    assert_eq!(form["sensorSettingStr"], "");
    assert!(!form.contains_key("setId"));
    assert!(!form.contains_key("devTimeZone"));
    assert!(!form.contains_key("calibrationTime"));
}

#[tokio::test]
async fn test_rejected_write_surfaces_request_failed() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/dev/getdevModeSettingList"))
        .respond_with(ok(json!({ "devId": DEVICE_ID, "modeSetid": "1" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/dev/addDevMode"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "msg": "bad", "code": 400 })),
        )
        .mount(&server)
        .await;

    let result = client.set_device_mode_settings(DEVICE_ID, 1, &[]).await;
    assert!(
        matches!(result, Err(Error::RequestFailed { code: 400, .. })),
        "expected RequestFailed, got: {result:?}"
    );
}
