use rust_decimal::Decimal;

use crate::device::{DeviceEntity, ParsedDevice};

/// Builds an unsaved `DeviceEntity` from a parsed catalog entry.
pub fn build_entity(device: &ParsedDevice, price: Decimal) -> DeviceEntity {
    DeviceEntity {
        id: None,
        name: device.name.clone(),
        color: device.color.clone(),
        capacity: device.capacity.clone(),
        price,
    }
}

/// Builds one entity per parsed device, in order.
pub fn build_entities(devices: &[ParsedDevice], price: Decimal) -> Vec<DeviceEntity> {
    devices.iter().map(|d| build_entity(d, price)).collect()
}
