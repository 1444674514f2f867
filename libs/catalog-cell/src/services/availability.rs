// libs/catalog-cell/src/services/availability.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{CatalogError, RawSlot, SlotCandidate, SlotPeriod};
use crate::provider::{RestSlotProvider, SlotProvider};

/// Enumerates candidate appointment slots for a doctor over a period,
/// grouped by day. The output is a plain Vec, so callers can re-iterate
/// it as often as they like.
pub struct SlotSelector {
    provider: Arc<dyn SlotProvider>,
}

impl SlotSelector {
    pub fn new(provider: Arc<dyn SlotProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(RestSlotProvider::new(config)))
    }

    pub async fn list_slots(
        &self,
        doctor_id: Uuid,
        period: SlotPeriod,
    ) -> Result<Vec<SlotCandidate>, CatalogError> {
        debug!(
            "Listing slots for doctor {} between {} and {}",
            doctor_id, period.from, period.to
        );

        let raw = self.provider.list_slots(doctor_id, period).await?;
        let grouped = group_by_day(raw);

        debug!("Found {} days with candidate slots", grouped.len());
        Ok(grouped)
    }
}

/// Group raw slots by date. Dates ascend, each day's times ascend, and
/// duplicate (date, time) pairs collapse to one candidate.
fn group_by_day(raw: Vec<RawSlot>) -> Vec<SlotCandidate> {
    let mut by_day: BTreeMap<chrono::NaiveDate, Vec<chrono::NaiveTime>> = BTreeMap::new();

    for slot in raw {
        by_day.entry(slot.date).or_default().push(slot.time);
    }

    by_day
        .into_iter()
        .map(|(date, mut times)| {
            times.sort();
            times.dedup();
            SlotCandidate { date, times }
        })
        .collect()
}
