use std::collections::HashSet;

use crate::device::DeviceEntity;
use crate::gateway::{DeviceGateway, GatewayError};

/// Candidates that survived deduplication, plus how many were dropped.
#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
    pub unique: Vec<DeviceEntity>,
    pub dropped: usize,
}

/// Keep candidates whose name is neither in `existing` nor taken earlier in
/// the batch. The first occurrence of a name wins.
pub fn retain_unique(candidates: Vec<DeviceEntity>, existing: &HashSet<String>) -> Deduplicated {
    let total = candidates.len();
    let mut seen: HashSet<String> = HashSet::new();

    let unique: Vec<DeviceEntity> = candidates
        .into_iter()
        .filter(|c| !existing.contains(&c.name) && seen.insert(c.name.clone()))
        .collect();

    Deduplicated {
        dropped: total - unique.len(),
        unique,
    }
}

/// Deduplicate against a single snapshot of the names already in the store.
pub async fn deduplicate(
    gateway: &dyn DeviceGateway,
    candidates: Vec<DeviceEntity>,
) -> Result<Deduplicated, GatewayError> {
    let existing = gateway.existing_names().await?;
    let result = retain_unique(candidates, &existing);

    if result.dropped > 0 {
        tracing::debug!(
            dropped = result.dropped,
            kept = result.unique.len(),
            "dropped duplicate device names"
        );
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::test_support::InMemoryGateway;

    fn candidate(name: &str, color: &str) -> DeviceEntity {
        DeviceEntity {
            id: None,
            name: name.to_owned(),
            color: Some(color.to_owned()),
            capacity: None,
            price: Decimal::ONE,
        }
    }

    fn names(devices: &[DeviceEntity]) -> Vec<&str> {
        devices.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn first_in_batch_duplicate_wins() {
        let result = retain_unique(
            vec![
                candidate("Pixel", "first"),
                candidate("iPhone", "only"),
                candidate("Pixel", "second"),
            ],
            &HashSet::new(),
        );

        assert_eq!(names(&result.unique), vec!["Pixel", "iPhone"]);
        assert_eq!(result.unique[0].color.as_deref(), Some("first"));
        assert_eq!(result.dropped, 1);
    }

    #[test]
    fn existing_names_are_dropped() {
        let existing = HashSet::from(["iPhone".to_owned()]);
        let result = retain_unique(
            vec![candidate("Pixel", "a"), candidate("iPhone", "b")],
            &existing,
        );

        assert_eq!(names(&result.unique), vec!["Pixel"]);
        assert_eq!(result.dropped, 1);
    }

    #[test]
    fn name_comparison_is_exact() {
        let existing = HashSet::from(["pixel".to_owned()]);
        let result = retain_unique(vec![candidate("Pixel", "a")], &existing);
        assert_eq!(names(&result.unique), vec!["Pixel"]);
    }

    #[tokio::test]
    async fn deduplicate_reads_store_snapshot() {
        let gateway = InMemoryGateway::new();
        gateway.seed(candidate("Galaxy Fold", "Brown"));

        let result = deduplicate(
            &gateway,
            vec![candidate("Galaxy Fold", "Black"), candidate("AirPods", "White")],
        )
        .await
        .unwrap();

        assert_eq!(names(&result.unique), vec!["AirPods"]);
        assert_eq!(gateway.create_calls(), 0);
    }
}
