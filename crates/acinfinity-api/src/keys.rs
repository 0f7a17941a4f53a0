//! Wire field names used by the AC Infinity cloud.
//!
//! The API spells several fields unusually (`onSpead`, `acitveTimerOn`,
//! `schedEndtTime`, `appPasswordl`); those spellings are the protocol and
//! must be sent exactly as written here.

/// Fields of a `devInfoListAll` controller entry.
pub mod controller {
    pub const DEVICE_ID: &str = "devId";
    pub const DEVICE_NAME: &str = "devName";
    pub const MAC_ADDR: &str = "devMacAddr";
    pub const DEVICE_INFO: &str = "deviceInfo";
    pub const PORTS: &str = "ports";
    pub const HW_VERSION: &str = "hardwareVersion";
    pub const SW_VERSION: &str = "firmwareVersion";
    pub const DEVICE_TYPE: &str = "devType";
    pub const TEMPERATURE: &str = "temperature";
    pub const HUMIDITY: &str = "humidity";
    pub const VPD: &str = "vpdnums";
    pub const ONLINE: &str = "online";
    pub const TIME_ZONE: &str = "zoneId";
    pub const SENSORS: &str = "sensors";
}

/// Fields of an entry in `deviceInfo.sensors`.
pub mod sensor {
    pub const ACCESS_PORT: &str = "accessPort";
    pub const SENSOR_TYPE: &str = "sensorType";
    pub const SENSOR_UNIT: &str = "sensorUnit";
    pub const SENSOR_PRECISION: &str = "sensorPrecision";
    pub const SENSOR_DATA: &str = "sensorData";
}

/// Fields of an entry in `deviceInfo.ports`.
pub mod port {
    pub const PORT: &str = "port";
    pub const NAME: &str = "portName";
    pub const SPEAK: &str = "speak";
    pub const ONLINE: &str = "online";
    pub const STATE: &str = "loadState";
    pub const REMAINING_TIME: &str = "remainTime";
}

/// Fields read by `getDevSetting` and written by `updateAdvSetting`.
pub mod setting {
    pub const DEV_ID: &str = "devId";
    pub const DEV_NAME: &str = "devName";

    // controller
    pub const TEMP_UNIT: &str = "devCompany";
    pub const CALIBRATE_TEMP: &str = "devCt";
    pub const CALIBRATE_TEMP_F: &str = "devCth";
    pub const CALIBRATE_HUMIDITY: &str = "devCh";
    pub const VPD_LEAF_TEMP_OFFSET: &str = "vpdCt";
    pub const VPD_LEAF_TEMP_OFFSET_F: &str = "vpdCth";
    pub const OUTSIDE_TEMP_COMPARE: &str = "tempCompare";
    pub const OUTSIDE_HUMIDITY_COMPARE: &str = "humiCompare";

    // port
    pub const DEVICE_LOAD_TYPE: &str = "loadType";
    pub const DYNAMIC_RESPONSE_TYPE: &str = "isFlag";
    pub const DYNAMIC_TRANSITION_TEMP: &str = "devTt";
    pub const DYNAMIC_TRANSITION_TEMP_F: &str = "devTth";
    pub const DYNAMIC_TRANSITION_HUMIDITY: &str = "devTh";
    pub const DYNAMIC_TRANSITION_VPD: &str = "vpdTransition";
    pub const DYNAMIC_BUFFER_TEMP: &str = "devBt";
    pub const DYNAMIC_BUFFER_TEMP_F: &str = "devBth";
    pub const DYNAMIC_BUFFER_HUMIDITY: &str = "devBh";
    pub const DYNAMIC_BUFFER_VPD: &str = "devBvpd";
    pub const SUNRISE_TIMER_ENABLED: &str = "onTimeSwitch";
    pub const SUNRISE_TIMER_DURATION: &str = "onTime";

    // payload hygiene for updateAdvSetting
    pub const CALIBRATION_TIME: &str = "calibrationTime";
    pub const SENSOR_SETTING: &str = "sensorSetting";
    pub const SENSOR_TRANS_BUFF: &str = "sensorTransBuff";
    pub const SET_ID: &str = "setId";
    pub const DEV_MAC_ADDR: &str = "devMacAddr";
    pub const PORT_RESISTANCE: &str = "portResistance";
    pub const DEV_TIME_ZONE: &str = "devTimeZone";
    pub const PORT_PARAM_DATA: &str = "portParamData";
    pub const SUB_DEVICE_VERSION: &str = "subDeviceVersion";
    pub const SEC_FUC_REPORT_TIME: &str = "secFucReportTime";
    pub const UPDATE_ALL_PORT: &str = "updateAllPort";
    pub const SENSOR_TRANS_BUFF_STR: &str = "sensorTransBuffStr";
    pub const SENSOR_SETTING_STR: &str = "sensorSettingStr";
    pub const SENSOR_ONE_TYPE: &str = "sensorOneType";
    pub const IS_SHARE: &str = "isShare";
    pub const TARGET_VPD_SWITCH: &str = "targetVpdSwitch";
    pub const SENSOR_TWO_TYPE: &str = "sensorTwoType";
    pub const PARAM_SENSORS: &str = "paramSensors";
    pub const ZONE_SENSOR_TYPE: &str = "zoneSensorType";
}

/// Fields read by `getdevModeSettingList` and written by `addDevMode`.
pub mod control {
    pub const DEV_ID: &str = "devId";
    pub const MODE_SET_ID: &str = "modeSetid";
    pub const SURPLUS: &str = "surplus";
    pub const ON_SPEED: &str = "onSpead";
    pub const OFF_SPEED: &str = "offSpead";
    pub const AT_TYPE: &str = "atType";
    pub const SCHEDULED_START_TIME: &str = "schedStartTime";
    pub const SCHEDULED_END_TIME: &str = "schedEndtTime";
    pub const TIMER_DURATION_TO_ON: &str = "acitveTimerOn";
    pub const TIMER_DURATION_TO_OFF: &str = "acitveTimerOff";
    pub const CYCLE_DURATION_ON: &str = "activeCycleOn";
    pub const CYCLE_DURATION_OFF: &str = "activeCycleOff";
    pub const VPD_SETTINGS_MODE: &str = "vpdSettingMode";
    pub const VPD_HIGH_ENABLED: &str = "activeHtVpd";
    pub const VPD_HIGH_TRIGGER: &str = "activeHtVpdNums";
    pub const VPD_LOW_ENABLED: &str = "activeLtVpd";
    pub const VPD_LOW_TRIGGER: &str = "activeLtVpdNums";
    pub const VPD_TARGET_ENABLED: &str = "targetVpdSwitch";
    pub const VPD_TARGET: &str = "targetVpd";
    pub const AUTO_SETTINGS_MODE: &str = "settingMode";
    pub const AUTO_TEMP_HIGH_TRIGGER: &str = "devHt";
    pub const AUTO_TEMP_HIGH_TRIGGER_F: &str = "devHtf";
    pub const AUTO_TEMP_HIGH_ENABLED: &str = "activeHt";
    pub const AUTO_HUMIDITY_HIGH_TRIGGER: &str = "devHh";
    pub const AUTO_HUMIDITY_HIGH_ENABLED: &str = "activeHh";
    pub const AUTO_TEMP_LOW_TRIGGER: &str = "devLt";
    pub const AUTO_TEMP_LOW_TRIGGER_F: &str = "devLtf";
    pub const AUTO_TEMP_LOW_ENABLED: &str = "activeLt";
    pub const AUTO_HUMIDITY_LOW_TRIGGER: &str = "devLh";
    pub const AUTO_HUMIDITY_LOW_ENABLED: &str = "activeLh";
    pub const AUTO_TARGET_TEMP_ENABLED: &str = "targetTSwitch";
    pub const AUTO_TARGET_TEMP: &str = "targetTemp";
    pub const AUTO_TARGET_TEMP_F: &str = "targetTempF";
    pub const AUTO_TARGET_HUMIDITY_ENABLED: &str = "targetHumiSwitch";
    pub const AUTO_TARGET_HUMIDITY: &str = "targetHumi";
    pub const VPD_STATUS: &str = "vpdstatus";
    pub const VPD_NUMS: &str = "vpdnums";
    pub const DEVICE_MAC_ADDR: &str = "devMacAddr";
    pub const DEV_SETTING: &str = "devSetting";
    pub const IPC_SETTING: &str = "ipcSetting";
}

/// Schedules are disabled by storing this sentinel instead of a minute.
pub const SCHEDULE_DISABLED_VALUE: i64 = 65535;
/// 12:00 AM, the start time written when a schedule is switched on.
pub const SCHEDULE_MIDNIGHT_VALUE: i64 = 0;
/// 11:59 PM, the end time written when a schedule is switched on.
pub const SCHEDULE_EOD_VALUE: i64 = 1439;
