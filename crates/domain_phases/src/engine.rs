//! Phase lifecycle engine
//!
//! Applies the phase-event configuration to a protocol when a business event
//! occurs, and answers the phase query surface.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use core_kernel::{BusinessDateSource, PortError, Protocol};

use crate::error::PhaseError;
use crate::phase::ClaimPhase;
use crate::ports::{PhaseAccess, PhaseStore, RelationshipSource};
use crate::relationship::{PhaseEventRelationship, PhaseTransition};

/// What one `update_phases` run did, by phase code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseUpdateSummary {
    pub opened: Vec<u32>,
    pub closed: Vec<u32>,
    /// Opens skipped because an open instance already existed
    pub duplicates_skipped: Vec<u32>,
    /// Closes skipped because no open instance existed
    pub unmatched_closes: Vec<u32>,
}

impl PhaseUpdateSummary {
    pub fn is_empty(&self) -> bool {
        self.opened.is_empty()
            && self.closed.is_empty()
            && self.duplicates_skipped.is_empty()
            && self.unmatched_closes.is_empty()
    }
}

/// Aggregate statistics over all phases of a protocol
#[derive(Debug, Clone, Serialize)]
pub struct PhaseStatistics {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    /// Average duration of closed phases in whole days, rounded to 2 decimals
    pub average_closed_duration_days: f64,
    /// Days the longest-open phase has been open
    pub longest_open_phase_days: Option<i64>,
    /// Display name of the longest-open phase
    pub longest_open_phase_name: Option<String>,
}

/// Drives phase transitions from business events
pub struct PhaseLifecycleEngine {
    store: Arc<dyn PhaseStore>,
    relationships: Arc<dyn RelationshipSource>,
    dates: Arc<dyn BusinessDateSource>,
}

impl PhaseLifecycleEngine {
    pub fn new(
        store: Arc<dyn PhaseStore>,
        relationships: Arc<dyn RelationshipSource>,
        dates: Arc<dyn BusinessDateSource>,
    ) -> Self {
        Self {
            store,
            relationships,
            dates,
        }
    }

    /// Applies the event's configured transitions directly against the store
    pub async fn update_phases(
        &self,
        protocol: Protocol,
        event_code: u32,
        event_date: NaiveDate,
        operator_id: &str,
    ) -> Result<PhaseUpdateSummary, PhaseError> {
        self.update_phases_in(self.store.as_access(), protocol, event_code, event_date, operator_id)
            .await
    }

    /// Applies the event's configured transitions through the given view
    ///
    /// The authorization pipeline passes its transaction here so the phase
    /// writes commit or roll back together with the claim writes.
    pub async fn update_phases_in(
        &self,
        access: &dyn PhaseAccess,
        protocol: Protocol,
        event_code: u32,
        event_date: NaiveDate,
        operator_id: &str,
    ) -> Result<PhaseUpdateSummary, PhaseError> {
        let candidates = self.relationships.relationships_for_event(event_code).await?;
        let in_force: Vec<&PhaseEventRelationship> = candidates
            .iter()
            .filter(|rel| rel.is_in_force(event_date))
            .collect();

        let mut summary = PhaseUpdateSummary::default();
        if in_force.is_empty() {
            debug!(
                %protocol,
                event_code,
                %event_date,
                "no phase-event relationships in force for event"
            );
            return Ok(summary);
        }

        for rel in in_force {
            match rel.transition {
                PhaseTransition::Opens => {
                    self.open_phase(access, protocol, rel, event_date, operator_id, &mut summary)
                        .await?;
                }
                PhaseTransition::Closes => {
                    self.close_phase(access, protocol, rel, event_date, operator_id, &mut summary)
                        .await?;
                }
            }
        }

        info!(
            %protocol,
            event_code,
            opened = summary.opened.len(),
            closed = summary.closed.len(),
            skipped = summary.duplicates_skipped.len(),
            "phase updates applied"
        );
        Ok(summary)
    }

    async fn open_phase(
        &self,
        access: &dyn PhaseAccess,
        protocol: Protocol,
        rel: &PhaseEventRelationship,
        event_date: NaiveDate,
        operator_id: &str,
        summary: &mut PhaseUpdateSummary,
    ) -> Result<(), PortError> {
        if access
            .find_open(protocol, rel.phase_code, rel.event_code)
            .await?
            .is_some()
        {
            info!(
                %protocol,
                phase_code = rel.phase_code,
                event_code = rel.event_code,
                "phase already open, skipping duplicate open"
            );
            summary.duplicates_skipped.push(rel.phase_code);
            return Ok(());
        }

        let phase = ClaimPhase::open(
            protocol,
            rel.phase_code,
            rel.event_code,
            0,
            rel.effective_start,
            event_date,
            rel.phase_name.clone(),
            operator_id,
        );
        access.insert_phase(phase).await?;
        info!(%protocol, phase_code = rel.phase_code, %event_date, "phase opened");
        summary.opened.push(rel.phase_code);
        Ok(())
    }

    async fn close_phase(
        &self,
        access: &dyn PhaseAccess,
        protocol: Protocol,
        rel: &PhaseEventRelationship,
        event_date: NaiveDate,
        operator_id: &str,
        summary: &mut PhaseUpdateSummary,
    ) -> Result<(), PortError> {
        match access
            .find_open(protocol, rel.phase_code, rel.event_code)
            .await?
        {
            Some(open) => {
                access
                    .close_phase(&open.key(), event_date, operator_id)
                    .await?;
                info!(%protocol, phase_code = rel.phase_code, %event_date, "phase closed");
                summary.closed.push(rel.phase_code);
            }
            None => {
                // Includes re-closing an already-closed phase: treated as a no-op
                info!(
                    %protocol,
                    phase_code = rel.phase_code,
                    "no open phase to close, skipping"
                );
                summary.unmatched_closes.push(rel.phase_code);
            }
        }
        Ok(())
    }

    /// All phases of a protocol, newest opening first
    pub async fn all_phases(&self, protocol: Protocol) -> Result<Vec<ClaimPhase>, PhaseError> {
        Ok(self.store.all_phases(protocol).await?)
    }

    /// Open phases of a protocol, oldest opening first
    pub async fn active_phases(&self, protocol: Protocol) -> Result<Vec<ClaimPhase>, PhaseError> {
        Ok(self.store.active_phases(protocol).await?)
    }

    /// Whether an open instance already exists for (protocol, phase, event)
    pub async fn has_open_phase(
        &self,
        protocol: Protocol,
        phase_code: u32,
        event_code: u32,
    ) -> Result<bool, PhaseError> {
        Ok(self
            .store
            .find_open(protocol, phase_code, event_code)
            .await?
            .is_some())
    }

    /// Aggregate statistics over all phases of the protocol
    pub async fn statistics(&self, protocol: Protocol) -> Result<PhaseStatistics, PhaseError> {
        let phases = self.store.all_phases(protocol).await?;
        let as_of = self.dates.business_date().await?;

        let (open, closed): (Vec<&ClaimPhase>, Vec<&ClaimPhase>) =
            phases.iter().partition(|p| p.is_open());

        let average_closed_duration_days = if closed.is_empty() {
            0.0
        } else {
            let total: i64 = closed.iter().filter_map(|p| p.duration_days()).sum();
            let average = total as f64 / closed.len() as f64;
            (average * 100.0).round() / 100.0
        };

        let longest_open = open.iter().max_by_key(|p| p.days_open(as_of));

        Ok(PhaseStatistics {
            total: phases.len(),
            open: open.len(),
            closed: closed.len(),
            average_closed_duration_days,
            longest_open_phase_days: longest_open.map(|p| p.days_open(as_of)),
            longest_open_phase_name: longest_open.map(|p| p.display_name()),
        })
    }
}
