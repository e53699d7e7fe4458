use std::fmt;

use rust_decimal::Decimal;

/// Store-assigned identifier for a persisted device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(i64);

impl DeviceId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog entry after parsing and field normalization.
/// Only produced for entries with a non-blank name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDevice {
    pub name: String,
    pub color: Option<String>,
    pub capacity: Option<String>,
}

/// A device record as persisted by a `DeviceGateway`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntity {
    /// `None` until the store has created the record.
    pub id: Option<DeviceId>,
    pub name: String,
    pub color: Option<String>,
    pub capacity: Option<String>,
    pub price: Decimal,
}

impl DeviceEntity {
    /// Returns a copy carrying the identifier assigned by the store.
    pub fn with_id(&self, id: DeviceId) -> Self {
        Self {
            id: Some(id),
            ..self.clone()
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl fmt::Display for DeviceEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(color) = &self.color {
            write!(f, " [{color}]")?;
        }
        if let Some(capacity) = &self.capacity {
            write!(f, " {capacity}")?;
        }
        write!(f, " @ {}", self.price)
    }
}
