use crate::device::DeviceEntity;
use crate::feedback::Feedback;
use crate::gateway::{DeviceFilter, DeviceGateway, GatewayError, WriteOutcome};

/// Capacity value substitution applied to the whole store after each sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityRewrite {
    pub from: String,
    pub to: String,
}

impl Default for CapacityRewrite {
    fn default() -> Self {
        Self {
            from: "64 GB".to_owned(),
            to: "46GB".to_owned(),
        }
    }
}

/// Devices the store accepted, with their assigned ids.
#[derive(Debug, Clone, Default)]
pub struct Created {
    pub devices: Vec<DeviceEntity>,
    pub failed: usize,
    pub feedback: Vec<Feedback>,
}

/// Outcome of a capacity rewrite sweep.
#[derive(Debug, Clone, Default)]
pub struct Rewritten {
    pub updated: usize,
    pub failed: usize,
    pub feedback: Vec<Feedback>,
}

fn check_outcome_count(expected: usize, outcomes: &[WriteOutcome]) -> Result<(), GatewayError> {
    if outcomes.len() != expected {
        return Err(GatewayError::ResultCountMismatch {
            expected,
            actual: outcomes.len(),
        });
    }
    Ok(())
}

/// Create `devices` in one bulk call and return the ones that succeeded.
///
/// Rejected rows become warnings; they never fail the call. An empty input
/// does not touch the gateway.
pub async fn create_devices(
    gateway: &dyn DeviceGateway,
    devices: &[DeviceEntity],
) -> Result<Created, GatewayError> {
    let mut created = Created::default();
    if devices.is_empty() {
        return Ok(created);
    }

    let outcomes = gateway.create_many(devices).await?;
    check_outcome_count(devices.len(), &outcomes)?;

    for (device, outcome) in devices.iter().zip(outcomes) {
        match outcome {
            WriteOutcome::Success(id) => created.devices.push(device.with_id(id)),
            WriteOutcome::Failure(message) => {
                tracing::warn!(name = %device.name, error = %message, "device create rejected");
                created.failed += 1;
                created.feedback.push(Feedback::warning(format!(
                    "could not create {}: {message}",
                    device.name
                )));
            }
        }
    }

    Ok(created)
}

/// Replace `rewrite.from` with `rewrite.to` on every persisted device whose
/// capacity matches exactly. The sweep covers the whole store, not just the
/// devices created by the current run.
pub async fn rewrite_capacity(
    gateway: &dyn DeviceGateway,
    rewrite: &CapacityRewrite,
) -> Result<Rewritten, GatewayError> {
    let mut rewritten = Rewritten::default();

    let matching = gateway
        .find(&DeviceFilter::CapacityEquals(rewrite.from.clone()))
        .await?;
    if matching.is_empty() {
        return Ok(rewritten);
    }

    let updated: Vec<DeviceEntity> = matching
        .into_iter()
        .map(|mut device| {
            device.capacity = Some(rewrite.to.clone());
            device
        })
        .collect();

    let outcomes = gateway.update_many(&updated).await?;
    check_outcome_count(updated.len(), &outcomes)?;

    for (device, outcome) in updated.iter().zip(outcomes) {
        match outcome {
            WriteOutcome::Success(_) => rewritten.updated += 1,
            WriteOutcome::Failure(message) => {
                tracing::warn!(name = %device.name, error = %message, "capacity rewrite rejected");
                rewritten.failed += 1;
                rewritten.feedback.push(Feedback::warning(format!(
                    "could not rewrite capacity of {}: {message}",
                    device.name
                )));
            }
        }
    }

    tracing::debug!(
        updated = rewritten.updated,
        failed = rewritten.failed,
        from = %rewrite.from,
        to = %rewrite.to,
        "capacity rewrite finished"
    );

    Ok(rewritten)
}
