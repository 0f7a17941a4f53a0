// Enumerations decoded from numeric wire fields.

use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};

// ── ControllerType ───────────────────────────────────────────────

/// Controller hardware generation (`devType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ControllerType {
    Uis69Pro,
    Uis69ProPlus,
    Uis89AiPlus,
    Other(i64),
}

impl ControllerType {
    pub fn code(self) -> i64 {
        match self {
            Self::Uis69Pro => 11,
            Self::Uis69ProPlus => 18,
            Self::Uis89AiPlus => 20,
            Self::Other(code) => code,
        }
    }

    pub fn model(self) -> String {
        match self {
            Self::Uis69Pro => "UIS Controller 69 Pro (CTR69P)".into(),
            Self::Uis69ProPlus => "UIS Controller 69 Pro+ (CTR69Q)".into(),
            Self::Uis89AiPlus => "UIS Controller AI+ (CTR89Q)".into(),
            Self::Other(code) => format!("UIS Controller Type {code}"),
        }
    }

    /// AI+ controllers only expose readings; no controls or settings.
    pub fn is_ai(self) -> bool {
        self == Self::Uis89AiPlus
    }
}

impl From<i64> for ControllerType {
    fn from(code: i64) -> Self {
        match code {
            11 => Self::Uis69Pro,
            18 => Self::Uis69ProPlus,
            20 => Self::Uis89AiPlus,
            other => Self::Other(other),
        }
    }
}

// ── SensorType ───────────────────────────────────────────────────

/// Kind of a sensor reported in `deviceInfo.sensors` (`sensorType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SensorType {
    ProbeTemperatureF,
    ProbeTemperatureC,
    ProbeHumidity,
    ProbeVpd,
    ControllerTemperatureF,
    ControllerTemperatureC,
    ControllerHumidity,
    ControllerVpd,
    Soil,
    Co2,
    Light,
    Water,
    Other(i64),
}

impl SensorType {
    pub fn code(self) -> i64 {
        match self {
            Self::ProbeTemperatureF => 0,
            Self::ProbeTemperatureC => 1,
            Self::ProbeHumidity => 2,
            Self::ProbeVpd => 3,
            Self::ControllerTemperatureF => 4,
            Self::ControllerTemperatureC => 5,
            Self::ControllerHumidity => 6,
            Self::ControllerVpd => 7,
            Self::Soil => 10,
            Self::Co2 => 11,
            Self::Light => 12,
            Self::Water => 20,
            Self::Other(code) => code,
        }
    }

    pub fn is_probe(self) -> bool {
        matches!(
            self,
            Self::ProbeTemperatureF | Self::ProbeTemperatureC | Self::ProbeHumidity | Self::ProbeVpd
        )
    }

    /// Sensors built into the controller body rather than a plug-in.
    pub fn is_builtin(self) -> bool {
        matches!(
            self,
            Self::ControllerTemperatureF
                | Self::ControllerTemperatureC
                | Self::ControllerHumidity
                | Self::ControllerVpd
        )
    }

    pub fn is_fahrenheit(self) -> bool {
        matches!(self, Self::ProbeTemperatureF | Self::ControllerTemperatureF)
    }
}

impl From<i64> for SensorType {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::ProbeTemperatureF,
            1 => Self::ProbeTemperatureC,
            2 => Self::ProbeHumidity,
            3 => Self::ProbeVpd,
            4 => Self::ControllerTemperatureF,
            5 => Self::ControllerTemperatureC,
            6 => Self::ControllerHumidity,
            7 => Self::ControllerVpd,
            10 => Self::Soil,
            11 => Self::Co2,
            12 => Self::Light,
            20 => Self::Water,
            other => Self::Other(other),
        }
    }
}

// ── PortMode ─────────────────────────────────────────────────────

/// Operating mode of a port (`atType`, 1-based on the wire).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter, IntoStaticStr,
)]
pub enum PortMode {
    Off,
    On,
    Auto,
    #[strum(serialize = "Timer to On")]
    TimerToOn,
    #[strum(serialize = "Timer to Off")]
    TimerToOff,
    Cycle,
    Schedule,
    #[strum(serialize = "VPD")]
    Vpd,
}

impl PortMode {
    /// Display labels in wire order.
    pub const LABELS: [&'static str; 8] = [
        "Off",
        "On",
        "Auto",
        "Timer to On",
        "Timer to Off",
        "Cycle",
        "Schedule",
        "VPD",
    ];

    pub fn from_at_type(at_type: i64) -> Option<Self> {
        Some(match at_type {
            1 => Self::Off,
            2 => Self::On,
            3 => Self::Auto,
            4 => Self::TimerToOn,
            5 => Self::TimerToOff,
            6 => Self::Cycle,
            7 => Self::Schedule,
            8 => Self::Vpd,
            _ => return None,
        })
    }

    pub fn at_type(self) -> i64 {
        match self {
            Self::Off => 1,
            Self::On => 2,
            Self::Auto => 3,
            Self::TimerToOn => 4,
            Self::TimerToOff => 5,
            Self::Cycle => 6,
            Self::Schedule => 7,
            Self::Vpd => 8,
        }
    }
}

// ── TemperatureUnit ──────────────────────────────────────────────

/// Display unit chosen on the controller (`devCompany` > 0 is Celsius).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum TemperatureUnit {
    #[strum(serialize = "°C")]
    Celsius,
    #[strum(serialize = "°F")]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn from_dev_company(value: i64) -> Self {
        if value > 0 {
            Self::Celsius
        } else {
            Self::Fahrenheit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn controller_models() {
        assert_eq!(ControllerType::from(11).model(), "UIS Controller 69 Pro (CTR69P)");
        assert_eq!(ControllerType::from(20).model(), "UIS Controller AI+ (CTR89Q)");
        assert_eq!(ControllerType::from(3).model(), "UIS Controller Type 3");
        assert!(ControllerType::from(20).is_ai());
    }

    #[test]
    fn sensor_codes_round_trip_through_from() {
        for code in [0, 3, 7, 10, 11, 12, 20, 99] {
            assert_eq!(SensorType::from(code).code(), code);
        }
    }

    #[test]
    fn port_mode_labels_follow_wire_order() {
        for (idx, mode) in PortMode::iter().enumerate() {
            assert_eq!(PortMode::LABELS[idx], mode.to_string());
            assert_eq!(PortMode::from_at_type(mode.at_type()), Some(mode));
        }
        assert_eq!(PortMode::from_at_type(0), None);
        assert_eq!(PortMode::from_at_type(9), None);
    }

    #[test]
    fn positive_dev_company_is_celsius() {
        assert_eq!(TemperatureUnit::from_dev_company(1), TemperatureUnit::Celsius);
        assert_eq!(TemperatureUnit::from_dev_company(0), TemperatureUnit::Fahrenheit);
    }
}
