use serde::Serialize;

/// Device-registry entry an entity is grouped under.
///
/// `identifier` is the second half of the `(ac_infinity, <id>)` pair;
/// `via_device` names the parent controller for ports and sensors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifier: String,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hw_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via_device: Option<String>,
}
