use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    CatalogProvider, DeviceEntity, DeviceFilter, DeviceGateway, DeviceId, GatewayError,
    RawResponse, TransportError, WriteOutcome,
};

/// Seven-entry catalog covering null data, a numeric capacity, an alternate
/// color key and one `"64 GB"` capacity.
pub const SAMPLE_CATALOG: &str = include_str!("../tests/fixtures/sample_catalog.json");

#[derive(Default)]
struct State {
    devices: Vec<DeviceEntity>,
    next_id: i64,
    failing_names: HashSet<String>,
    create_calls: usize,
    update_calls: usize,
}

/// In-memory gateway for testing. Rows whose name was registered with
/// `fail_on` are rejected individually by both create and update.
#[derive(Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a device directly, bypassing call counters and failure rules.
    pub fn seed(&self, device: DeviceEntity) -> DeviceId {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = DeviceId::new(state.next_id);
        state.devices.push(device.with_id(id));
        id
    }

    pub fn fail_on(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_names
            .insert(name.to_owned());
    }

    /// Snapshot of stored devices in insertion order.
    pub fn devices(&self) -> Vec<DeviceEntity> {
        self.state.lock().unwrap().devices.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn update_calls(&self) -> usize {
        self.state.lock().unwrap().update_calls
    }
}

#[async_trait::async_trait]
impl DeviceGateway for InMemoryGateway {
    async fn existing_names(&self) -> Result<HashSet<String>, GatewayError> {
        let state = self.state.lock().unwrap();
        Ok(state.devices.iter().map(|d| d.name.clone()).collect())
    }

    async fn find(&self, filter: &DeviceFilter) -> Result<Vec<DeviceEntity>, GatewayError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .devices
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }

    async fn create_many(&self, devices: &[DeviceEntity]) -> Result<Vec<WriteOutcome>, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;

        let mut outcomes = Vec::with_capacity(devices.len());
        for device in devices {
            if state.failing_names.contains(&device.name) {
                outcomes.push(WriteOutcome::Failure(format!(
                    "rejected by test gateway: {}",
                    device.name
                )));
                continue;
            }
            state.next_id += 1;
            let id = DeviceId::new(state.next_id);
            state.devices.push(device.with_id(id));
            outcomes.push(WriteOutcome::Success(id));
        }
        Ok(outcomes)
    }

    async fn update_many(&self, devices: &[DeviceEntity]) -> Result<Vec<WriteOutcome>, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.update_calls += 1;

        let mut outcomes = Vec::with_capacity(devices.len());
        for device in devices {
            if state.failing_names.contains(&device.name) {
                outcomes.push(WriteOutcome::Failure(format!(
                    "rejected by test gateway: {}",
                    device.name
                )));
                continue;
            }
            let Some(id) = device.id else {
                outcomes.push(WriteOutcome::Failure("device has no id".to_owned()));
                continue;
            };
            match state.devices.iter_mut().find(|d| d.id == Some(id)) {
                Some(stored) => {
                    stored.capacity = device.capacity.clone();
                    outcomes.push(WriteOutcome::Success(id));
                }
                None => outcomes.push(WriteOutcome::Failure(format!("no device with id {id}"))),
            }
        }
        Ok(outcomes)
    }
}

/// Provider that returns a canned response (or transport error) and counts fetches.
pub struct StaticProvider {
    response: Result<RawResponse, String>,
    fetches: AtomicUsize,
}

impl StaticProvider {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            response: Ok(RawResponse {
                status,
                body: body.into(),
            }),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for StaticProvider {
    fn label(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> Result<RawResponse, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.response.clone().map_err(TransportError)
    }
}
