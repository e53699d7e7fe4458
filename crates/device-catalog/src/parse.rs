use serde_json::{Map, Value};

use crate::device::ParsedDevice;
use crate::normalize;
use crate::sync::SyncError;

/// One catalog entry exactly as received from the API.
///
/// Only `name` and `data` feed the device; `id` is logged when an entry is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RawApiRecord {
    fields: Map<String, Value>,
}

impl RawApiRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn id(&self) -> Option<&Value> {
        self.fields.get("id")
    }

    /// The `name` field, if present and textual.
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// The nested `data` map. Absent, null and non-object values all read as `None`.
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.fields.get("data").and_then(Value::as_object)
    }
}

/// Decode a payload that must be a JSON array of objects.
///
/// Any other shape fails the whole payload; there is no partial recovery.
pub fn decode(payload: &str) -> Result<Vec<RawApiRecord>, SyncError> {
    let entries: Vec<Map<String, Value>> =
        serde_json::from_str(payload).map_err(|e| SyncError::Parse(e.to_string()))?;

    Ok(entries.into_iter().map(RawApiRecord::new).collect())
}

/// Turn a raw record into a `ParsedDevice`, or `None` when its name is blank.
pub fn normalize_record(record: &RawApiRecord) -> Option<ParsedDevice> {
    let Some(name) = record.name().filter(|n| !n.trim().is_empty()) else {
        tracing::debug!(id = ?record.id(), "dropping catalog entry without a usable name");
        return None;
    };

    let (color, capacity) = match record.data() {
        Some(data) => (normalize::color(data), normalize::capacity(data)),
        None => (None, None),
    };

    Some(ParsedDevice {
        name: name.to_owned(),
        color,
        capacity,
    })
}

/// Normalize every record, dropping blank-named ones. Input order is kept.
pub fn normalize_records(records: &[RawApiRecord]) -> Vec<ParsedDevice> {
    records.iter().filter_map(normalize_record).collect()
}

/// Decode and normalize a catalog payload in one step.
pub fn parse_devices(payload: &str) -> Result<Vec<ParsedDevice>, SyncError> {
    Ok(normalize_records(&decode(payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_dropped() {
        let devices = parse_devices(r#"[{"name":""},{"name":"X"}]"#).unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "X");
    }

    #[test]
    fn whitespace_and_missing_names_are_dropped() {
        let devices =
            parse_devices(r#"[{"name":"   "},{"id":"2"},{"name":null},{"name":42},{"name":"Y"}]"#)
                .unwrap();
        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Y"]);
    }

    #[test]
    fn null_data_leaves_attributes_unset() {
        let devices =
            parse_devices(r#"[{"id":"1","name":"Apple iPhone 12 Mini","data":null}]"#).unwrap();
        assert_eq!(devices[0].color, None);
        assert_eq!(devices[0].capacity, None);
    }

    #[test]
    fn non_object_data_is_treated_as_null() {
        let devices = parse_devices(r#"[{"name":"Odd","data":"unexpected"}]"#).unwrap();
        assert_eq!(devices[0].color, None);
        assert_eq!(devices[0].capacity, None);
    }

    #[test]
    fn data_is_normalized() {
        let devices = parse_devices(
            r#"[{"id":"3","name":"Apple iPhone 12 Pro Max","data":{"Color":"Cloudy White","capacity GB":512}}]"#,
        )
        .unwrap();
        assert_eq!(devices[0].color.as_deref(), Some("Cloudy White"));
        assert_eq!(devices[0].capacity.as_deref(), Some("512 GB"));
    }

    #[test]
    fn names_are_kept_as_received() {
        let devices = parse_devices(r#"[{"name":"  Padded  "}]"#).unwrap();
        assert_eq!(devices[0].name, "  Padded  ");
    }

    #[test]
    fn order_is_preserved() {
        let devices =
            parse_devices(r#"[{"name":"c"},{"name":""},{"name":"a"},{"name":"b"}]"#).unwrap();
        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = parse_devices("invalid json");
        assert!(matches!(result, Err(SyncError::Parse(_))));
    }

    #[test]
    fn top_level_object_is_a_parse_error() {
        let result = parse_devices(r#"{"name":"not an array"}"#);
        assert!(matches!(result, Err(SyncError::Parse(_))));
    }

    #[test]
    fn non_object_element_fails_whole_payload() {
        let result = parse_devices(r#"[{"name":"ok"}, "stray"]"#);
        assert!(matches!(result, Err(SyncError::Parse(_))));
    }

    #[test]
    fn empty_array_is_empty() {
        assert!(parse_devices("[]").unwrap().is_empty());
    }

    #[test]
    fn raw_record_exposes_id() {
        let records = decode(r#"[{"id":"7","name":"Watch"}]"#).unwrap();
        assert_eq!(records[0].id().and_then(Value::as_str), Some("7"));
        assert_eq!(records[0].name(), Some("Watch"));
        assert!(records[0].data().is_none());
    }
}
