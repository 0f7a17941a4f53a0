// On/off readings.

use acinfinity_api::keys::{controller, port, sensor};

use super::{Description, EntityContext, EntityKind, EntityValue, Source};
use crate::model::SensorType;
use crate::store::is_truthy;

pub(super) static DESCRIPTIONS: &[Description] = &[
    Description::new(
        EntityKind::BinarySensor,
        Source::ControllerProperty,
        controller::ONLINE,
        "Status",
        truthy,
    )
    .device_class("connectivity"),
    Description::new(
        EntityKind::BinarySensor,
        Source::SensorProperty,
        "waterSensor",
        "Water",
        water_detected,
    )
    .device_class("moisture")
    .sensor_types(&[SensorType::Water])
    .suitable(sensor_reading_exists),
    Description::new(
        EntityKind::BinarySensor,
        Source::PortProperty,
        port::ONLINE,
        "Status",
        truthy,
    )
    .device_class("connectivity"),
    Description::new(
        EntityKind::BinarySensor,
        Source::PortProperty,
        port::STATE,
        "State",
        truthy,
    )
    .device_class("power"),
];

fn truthy(ctx: &EntityContext<'_>) -> EntityValue {
    EntityValue::Bool(ctx.lookup(ctx.key()).is_some_and(is_truthy))
}

fn sensor_reading_exists(ctx: &EntityContext<'_>) -> bool {
    ctx.exists(sensor::SENSOR_PRECISION) && ctx.exists(sensor::SENSOR_DATA)
}

fn water_detected(ctx: &EntityContext<'_>) -> EntityValue {
    EntityValue::Bool(ctx.lookup(sensor::SENSOR_DATA).is_some_and(is_truthy))
}
