//! Integration tests for the phase lifecycle engine

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{BusinessDateSource, DomainPort, PortError, Protocol};
use domain_phases::{
    open_phase_sentinel, ClaimPhase, PhaseAccess, PhaseEventRelationship, PhaseKey,
    PhaseLifecycleEngine, PhaseStore, RelationshipSource,
};

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Default)]
struct TestPhaseStore {
    phases: Mutex<Vec<ClaimPhase>>,
}

#[async_trait]
impl PhaseAccess for TestPhaseStore {
    async fn find_open(
        &self,
        protocol: Protocol,
        phase_code: u32,
        event_code: u32,
    ) -> Result<Option<ClaimPhase>, PortError> {
        Ok(self
            .phases
            .lock()
            .unwrap()
            .iter()
            .find(|p| {
                p.protocol == protocol
                    && p.phase_code == phase_code
                    && p.event_code == event_code
                    && p.is_open()
            })
            .cloned())
    }

    async fn insert_phase(&self, phase: ClaimPhase) -> Result<(), PortError> {
        self.phases.lock().unwrap().push(phase);
        Ok(())
    }

    async fn close_phase(
        &self,
        key: &PhaseKey,
        closed_on: NaiveDate,
        closed_by: &str,
    ) -> Result<(), PortError> {
        let mut phases = self.phases.lock().unwrap();
        let phase = phases
            .iter_mut()
            .find(|p| p.key() == *key)
            .ok_or_else(|| PortError::not_found("ClaimPhase", key.phase_code))?;
        phase.close(closed_on, closed_by);
        Ok(())
    }
}

impl DomainPort for TestPhaseStore {}

#[async_trait]
impl PhaseStore for TestPhaseStore {
    async fn all_phases(&self, protocol: Protocol) -> Result<Vec<ClaimPhase>, PortError> {
        let mut phases: Vec<ClaimPhase> = self
            .phases
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.protocol == protocol)
            .cloned()
            .collect();
        phases.sort_by(|a, b| b.opened_on.cmp(&a.opened_on));
        Ok(phases)
    }

    async fn active_phases(&self, protocol: Protocol) -> Result<Vec<ClaimPhase>, PortError> {
        let mut phases: Vec<ClaimPhase> = self
            .phases
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.protocol == protocol && p.is_open())
            .cloned()
            .collect();
        phases.sort_by(|a, b| a.opened_on.cmp(&b.opened_on));
        Ok(phases)
    }

    fn as_access(&self) -> &dyn PhaseAccess {
        self
    }
}

struct TestRelationships(Vec<PhaseEventRelationship>);

impl DomainPort for TestRelationships {}

#[async_trait]
impl RelationshipSource for TestRelationships {
    async fn relationships_for_event(
        &self,
        event_code: u32,
    ) -> Result<Vec<PhaseEventRelationship>, PortError> {
        Ok(self
            .0
            .iter()
            .filter(|r| r.event_code == event_code)
            .cloned()
            .collect())
    }
}

struct FixedDates(NaiveDate);

impl DomainPort for FixedDates {}

#[async_trait]
impl BusinessDateSource for FixedDates {
    async fn business_date(&self) -> Result<NaiveDate, PortError> {
        Ok(self.0)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn protocol() -> Protocol {
    Protocol::new(1, 4231, 7)
}

fn engine(
    relationships: Vec<PhaseEventRelationship>,
    today: NaiveDate,
) -> (PhaseLifecycleEngine, Arc<TestPhaseStore>) {
    let store = Arc::new(TestPhaseStore::default());
    let engine = PhaseLifecycleEngine::new(
        store.clone(),
        Arc::new(TestRelationships(relationships)),
        Arc::new(FixedDates(today)),
    );
    (engine, store)
}

// ============================================================================
// Lifecycle tests
// ============================================================================

#[tokio::test]
async fn opening_event_creates_phase_with_sentinel() {
    let rels = vec![
        PhaseEventRelationship::opens(20, 1098, date(2020, 1, 1)).with_phase_name("Settlement"),
    ];
    let (engine, _store) = engine(rels, date(2024, 6, 14));

    let summary = engine
        .update_phases(protocol(), 1098, date(2024, 6, 14), "OP1234")
        .await
        .unwrap();

    assert_eq!(summary.opened, vec![20]);
    let phases = engine.all_phases(protocol()).await.unwrap();
    assert_eq!(phases.len(), 1);
    assert_eq!(phases[0].opened_on, date(2024, 6, 14));
    assert_eq!(phases[0].closed_on, open_phase_sentinel());
    assert!(phases[0].is_open());
}

#[tokio::test]
async fn duplicate_open_is_an_idempotent_no_op() {
    let rels = vec![PhaseEventRelationship::opens(20, 1098, date(2020, 1, 1))];
    let (engine, _store) = engine(rels, date(2024, 6, 14));

    engine
        .update_phases(protocol(), 1098, date(2024, 6, 14), "OP1234")
        .await
        .unwrap();
    let second = engine
        .update_phases(protocol(), 1098, date(2024, 6, 14), "OP1234")
        .await
        .unwrap();

    assert!(second.opened.is_empty());
    assert_eq!(second.duplicates_skipped, vec![20]);
    assert_eq!(engine.all_phases(protocol()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn closing_event_closes_the_open_instance() {
    let rels = vec![
        PhaseEventRelationship::opens(20, 1098, date(2020, 1, 1)),
        PhaseEventRelationship::closes(20, 2001, date(2020, 1, 1)),
    ];
    let (engine, _store) = engine(rels, date(2024, 7, 1));

    engine
        .update_phases(protocol(), 1098, date(2024, 6, 1), "OP1234")
        .await
        .unwrap();
    let summary = engine
        .update_phases(protocol(), 2001, date(2024, 6, 15), "OP5678")
        .await
        .unwrap();

    assert_eq!(summary.closed, vec![20]);
    let phases = engine.all_phases(protocol()).await.unwrap();
    assert!(!phases[0].is_open());
    assert_eq!(phases[0].duration_days(), Some(14));
    assert_eq!(phases[0].closed_by.as_deref(), Some("OP5678"));
    assert!(!engine.has_open_phase(protocol(), 20, 1098).await.unwrap());
}

#[tokio::test]
async fn closing_without_an_open_phase_is_a_no_op() {
    let rels = vec![PhaseEventRelationship::closes(20, 2001, date(2020, 1, 1))];
    let (engine, _store) = engine(rels, date(2024, 7, 1));

    let summary = engine
        .update_phases(protocol(), 2001, date(2024, 6, 15), "OP1234")
        .await
        .unwrap();

    assert!(summary.closed.is_empty());
    assert_eq!(summary.unmatched_closes, vec![20]);
    assert!(engine.all_phases(protocol()).await.unwrap().is_empty());
}

#[tokio::test]
async fn event_before_effective_start_produces_no_match() {
    let rels = vec![PhaseEventRelationship::opens(20, 1098, date(2024, 6, 1))];
    let (engine, _store) = engine(rels, date(2024, 7, 1));

    let summary = engine
        .update_phases(protocol(), 1098, date(2024, 5, 31), "OP1234")
        .await
        .unwrap();

    assert!(summary.is_empty());
    assert!(engine.all_phases(protocol()).await.unwrap().is_empty());
}

#[tokio::test]
async fn inactive_relationship_is_ignored() {
    let rels = vec![PhaseEventRelationship::opens(20, 1098, date(2020, 1, 1)).inactive()];
    let (engine, _store) = engine(rels, date(2024, 7, 1));

    let summary = engine
        .update_phases(protocol(), 1098, date(2024, 6, 14), "OP1234")
        .await
        .unwrap();

    assert!(summary.is_empty());
}

#[tokio::test]
async fn reopening_after_close_creates_a_new_instance() {
    let rels = vec![
        PhaseEventRelationship::opens(20, 1098, date(2020, 1, 1)),
        PhaseEventRelationship::closes(20, 2001, date(2020, 1, 1)),
    ];
    let (engine, _store) = engine(rels, date(2024, 7, 1));

    engine
        .update_phases(protocol(), 1098, date(2024, 6, 1), "OP1234")
        .await
        .unwrap();
    engine
        .update_phases(protocol(), 2001, date(2024, 6, 10), "OP1234")
        .await
        .unwrap();
    engine
        .update_phases(protocol(), 1098, date(2024, 6, 20), "OP1234")
        .await
        .unwrap();

    let phases = engine.all_phases(protocol()).await.unwrap();
    assert_eq!(phases.len(), 2);
    // Newest opening first
    assert_eq!(phases[0].opened_on, date(2024, 6, 20));
    assert!(phases[0].is_open());
    assert!(!phases[1].is_open());
}

// ============================================================================
// Query and statistics tests
// ============================================================================

#[tokio::test]
async fn active_phases_are_ordered_by_opening_ascending() {
    let rels = vec![
        PhaseEventRelationship::opens(20, 1098, date(2020, 1, 1)),
        PhaseEventRelationship::opens(30, 1098, date(2020, 1, 1)),
    ];
    let (engine, store) = engine(rels, date(2024, 7, 1));

    engine
        .update_phases(protocol(), 1098, date(2024, 6, 14), "OP1234")
        .await
        .unwrap();
    // Backdate one phase to check ordering
    {
        let mut phases = store.phases.lock().unwrap();
        phases
            .iter_mut()
            .find(|p| p.phase_code == 30)
            .unwrap()
            .opened_on = date(2024, 6, 1);
    }

    let active = engine.active_phases(protocol()).await.unwrap();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].phase_code, 30);
    assert_eq!(active[1].phase_code, 20);
}

#[tokio::test]
async fn statistics_round_trip_closed_duration() {
    let rels = vec![
        PhaseEventRelationship::opens(20, 1098, date(2020, 1, 1)),
        PhaseEventRelationship::closes(20, 2001, date(2020, 1, 1)),
    ];
    let (engine, _store) = engine(rels, date(2024, 7, 1));

    engine
        .update_phases(protocol(), 1098, date(2024, 6, 1), "OP1234")
        .await
        .unwrap();
    engine
        .update_phases(protocol(), 2001, date(2024, 6, 15), "OP1234")
        .await
        .unwrap();

    let phases = engine.all_phases(protocol()).await.unwrap();
    let stats = engine.statistics(protocol()).await.unwrap();

    assert_eq!(stats.total, 1);
    assert_eq!(stats.closed, 1);
    assert_eq!(stats.open, 0);
    assert_eq!(
        stats.average_closed_duration_days,
        phases[0].duration_days().unwrap() as f64
    );
    assert_eq!(stats.longest_open_phase_days, None);
}

#[tokio::test]
async fn statistics_report_longest_open_phase() {
    let rels = vec![
        PhaseEventRelationship::opens(20, 1098, date(2020, 1, 1)).with_phase_name("Settlement"),
        PhaseEventRelationship::opens(30, 1098, date(2020, 1, 1)),
    ];
    let (engine, store) = engine(rels, date(2024, 7, 1));

    engine
        .update_phases(protocol(), 1098, date(2024, 6, 21), "OP1234")
        .await
        .unwrap();
    {
        let mut phases = store.phases.lock().unwrap();
        phases
            .iter_mut()
            .find(|p| p.phase_code == 20)
            .unwrap()
            .opened_on = date(2024, 6, 1);
    }

    let stats = engine.statistics(protocol()).await.unwrap();

    assert_eq!(stats.open, 2);
    assert_eq!(stats.longest_open_phase_days, Some(30));
    assert_eq!(stats.longest_open_phase_name.as_deref(), Some("Settlement"));
}
