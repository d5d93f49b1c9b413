//! In-memory record store

use super::traits::{RecordStore, StorageError, StorageResult};
use crate::record::{
    AnalysisResult, EntityKind, IdGenerator, NewAnalysisResult, NewProposal, Proposal,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError, RwLock};

/// In-memory record store
///
/// Each table sits behind its own `RwLock`. Writers hold the table's write
/// lock while allocating the id, stamping `created_at` and inserting, so ids
/// within a kind are handed out in insertion order and never collide.
/// Readers only take read locks.
///
/// Timestamps come from a monotonic stamp shared by both tables: a record
/// is never stamped earlier than any record inserted before it, which keeps
/// a proposal's `created_at` at or before its analysis's.
pub struct MemoryStore {
    ids: IdGenerator,
    proposals: RwLock<BTreeMap<u64, Proposal>>,
    analysis_results: RwLock<BTreeMap<u64, AnalysisResult>>,
    last_stamp: Mutex<Option<DateTime<Utc>>>,
    now: fn() -> DateTime<Utc>,
    /// Per-kind record limit; `None` means bounded only by memory
    max_records: Option<usize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StorageError {
    StorageError::Poisoned("record table".to_string())
}

impl MemoryStore {
    /// Create an empty, unbounded store
    pub fn new() -> Self {
        Self {
            ids: IdGenerator::new(),
            proposals: RwLock::new(BTreeMap::new()),
            analysis_results: RwLock::new(BTreeMap::new()),
            last_stamp: Mutex::new(None),
            now: Utc::now,
            max_records: None,
        }
    }

    /// Limit the number of records stored per kind
    pub fn with_max_records(mut self, limit: usize) -> Self {
        self.max_records = Some(limit);
        self
    }

    #[cfg(test)]
    fn with_clock(mut self, now: fn() -> DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn proposal_count(&self) -> StorageResult<usize> {
        Ok(self.proposals.read().map_err(poisoned)?.len())
    }

    pub fn analysis_result_count(&self) -> StorageResult<usize> {
        Ok(self.analysis_results.read().map_err(poisoned)?.len())
    }

    fn stamp(&self) -> StorageResult<DateTime<Utc>> {
        let mut last = self.last_stamp.lock().map_err(poisoned)?;
        let now = (self.now)();
        let stamp = match *last {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        *last = Some(stamp);
        Ok(stamp)
    }

    fn check_capacity(&self, kind: EntityKind, len: usize) -> StorageResult<()> {
        match self.max_records {
            Some(limit) if len >= limit => Err(StorageError::Exhausted {
                kind,
                limit: limit as u64,
            }),
            _ => Ok(()),
        }
    }

    fn allocate(&self, kind: EntityKind) -> StorageResult<u64> {
        self.ids.next(kind).ok_or(StorageError::Exhausted {
            kind,
            limit: u64::MAX,
        })
    }
}

impl RecordStore for MemoryStore {
    fn insert_proposal(&self, data: NewProposal) -> StorageResult<Proposal> {
        let mut table = self.proposals.write().map_err(poisoned)?;
        self.check_capacity(EntityKind::Proposal, table.len())?;
        let id = self.allocate(EntityKind::Proposal)?;
        let proposal = data.into_proposal(id, self.stamp()?);
        table.insert(id, proposal.clone());
        tracing::trace!(id, user_id = %proposal.user_id, "stored proposal");
        Ok(proposal)
    }

    fn insert_analysis_result(&self, data: NewAnalysisResult) -> StorageResult<AnalysisResult> {
        let mut table = self.analysis_results.write().map_err(poisoned)?;
        self.check_capacity(EntityKind::AnalysisResult, table.len())?;
        let id = self.allocate(EntityKind::AnalysisResult)?;
        let result = data.into_result(id, self.stamp()?);
        table.insert(id, result.clone());
        tracing::trace!(id, proposal_id = result.proposal_id, "stored analysis result");
        Ok(result)
    }

    fn proposal(&self, id: u64) -> StorageResult<Option<Proposal>> {
        Ok(self.proposals.read().map_err(poisoned)?.get(&id).cloned())
    }

    fn proposals_by_user(&self, user_id: &str) -> StorageResult<Vec<Proposal>> {
        let mut proposals: Vec<Proposal> = self
            .proposals
            .read()
            .map_err(poisoned)?
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        proposals.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(proposals)
    }

    fn analysis_result_by_proposal(
        &self,
        proposal_id: u64,
    ) -> StorageResult<Option<AnalysisResult>> {
        // BTreeMap iterates in id order, so "first match" is the oldest result
        Ok(self
            .analysis_results
            .read()
            .map_err(poisoned)?
            .values()
            .find(|a| a.proposal_id == proposal_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Assessment, KeyDetails, Recommendation, RiskLevel};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn assessment(recommendation: Recommendation) -> Assessment {
        Assessment {
            recommendation,
            reasoning: "Clear scope and modest cost.".to_string(),
            summary: "Funds a grants round.".to_string(),
            key_details: KeyDetails {
                budget_impact: "-10K USD".to_string(),
                duration: "3 Months".to_string(),
                risk_level: RiskLevel::Low,
                category: "Funding".to_string(),
            },
        }
    }

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn analyze(store: &MemoryStore, user: &str, content: &str) -> (Proposal, AnalysisResult) {
        let proposal = store.insert_proposal(NewProposal::new(user, content)).unwrap();
        let analysis = store
            .insert_analysis_result(NewAnalysisResult::for_proposal(
                &proposal,
                assessment(Recommendation::Yes),
            ))
            .unwrap();
        (proposal, analysis)
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let first = store.insert_proposal(NewProposal::new("u1", "a")).unwrap();
        let second = store.insert_proposal(NewProposal::new("u2", "b")).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(first.created_at <= second.created_at);
    }

    #[test]
    fn inserted_proposal_reads_back_unchanged() {
        let store = MemoryStore::new();
        let stored = store
            .insert_proposal(NewProposal::new("u1", "Fund 10k to grants").with_title("Grants"))
            .unwrap();
        let loaded = store.proposal(stored.id).unwrap().unwrap();
        assert_eq!(loaded, stored);
        assert!(store.proposal(stored.id + 1).unwrap().is_none());
    }

    #[test]
    fn proposals_by_user_newest_first_and_filtered() {
        let store = MemoryStore::new();
        store.insert_proposal(NewProposal::new("u1", "one")).unwrap();
        store.insert_proposal(NewProposal::new("u2", "other")).unwrap();
        store.insert_proposal(NewProposal::new("u1", "two")).unwrap();

        let listed = store.proposals_by_user("u1").unwrap();
        let contents: Vec<_> = listed.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["two", "one"]);
        assert!(store.proposals_by_user("nobody").unwrap().is_empty());
    }

    #[test]
    fn timestamp_ties_break_by_descending_id() {
        let store = MemoryStore::new().with_clock(fixed_instant);
        for content in ["a", "b", "c"] {
            store.insert_proposal(NewProposal::new("u1", content)).unwrap();
        }
        let ids: Vec<_> = store
            .proposals_by_user("u1")
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn stamps_never_go_backwards() {
        fn rewinding() -> DateTime<Utc> {
            use std::sync::atomic::{AtomicI64, Ordering};
            static OFFSET: AtomicI64 = AtomicI64::new(0);
            let offset = OFFSET.fetch_sub(60, Ordering::SeqCst);
            Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(offset)
        }

        let store = MemoryStore::new().with_clock(rewinding);
        let (proposal, analysis) = analyze(&store, "u1", "clock went backwards");
        assert!(proposal.created_at <= analysis.created_at);
    }

    #[test]
    fn history_skips_proposals_without_analysis() {
        let store = MemoryStore::new();
        let (analyzed, _) = analyze(&store, "u1", "analyzed");
        let pending = store.insert_proposal(NewProposal::new("u1", "pending")).unwrap();

        let proposals = store.proposals_by_user("u1").unwrap();
        assert_eq!(proposals.len(), 2);

        let history = store.analysis_results_by_user("u1").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].proposal.id, analyzed.id);
        assert!(history.iter().all(|r| r.proposal.id != pending.id));
    }

    #[test]
    fn history_orders_by_analysis_recency() {
        let store = MemoryStore::new();
        // Two proposals saved first, analyzed in reverse order
        let older = store.insert_proposal(NewProposal::new("u1", "older")).unwrap();
        let newer = store.insert_proposal(NewProposal::new("u1", "newer")).unwrap();
        store
            .insert_analysis_result(NewAnalysisResult::for_proposal(
                &newer,
                assessment(Recommendation::No),
            ))
            .unwrap();
        store
            .insert_analysis_result(NewAnalysisResult::for_proposal(
                &older,
                assessment(Recommendation::Yes),
            ))
            .unwrap();

        let history = store.analysis_results_by_user("u1").unwrap();
        let order: Vec<_> = history.iter().map(|r| r.proposal.id).collect();
        assert_eq!(order, vec![older.id, newer.id]);
        for pair in &history {
            assert_eq!(pair.proposal.id, pair.analysis.proposal_id);
        }
    }

    #[test]
    fn history_ties_break_by_descending_analysis_id() {
        let store = MemoryStore::new().with_clock(fixed_instant);
        analyze(&store, "u1", "first");
        analyze(&store, "u1", "second");

        let history = store.analysis_results_by_user("u1").unwrap();
        let ids: Vec<_> = history.iter().map(|r| r.analysis.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn lookup_by_proposal_returns_first_match() {
        let store = MemoryStore::new();
        let proposal = store.insert_proposal(NewProposal::new("u1", "x")).unwrap();
        let first = store
            .insert_analysis_result(NewAnalysisResult::for_proposal(
                &proposal,
                assessment(Recommendation::Yes),
            ))
            .unwrap();
        store
            .insert_analysis_result(NewAnalysisResult::for_proposal(
                &proposal,
                assessment(Recommendation::No),
            ))
            .unwrap();

        let found = store.analysis_result_by_proposal(proposal.id).unwrap();
        assert_eq!(found, Some(first));
        assert_eq!(store.analysis_result_by_proposal(999).unwrap(), None);
    }

    #[test]
    fn capacity_limit_reports_exhaustion() {
        let store = MemoryStore::new().with_max_records(1);
        store.insert_proposal(NewProposal::new("u1", "fits")).unwrap();

        let err = store
            .insert_proposal(NewProposal::new("u1", "overflow"))
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Exhausted {
                kind: EntityKind::Proposal,
                limit: 1
            }
        ));
        assert_eq!(store.proposal_count().unwrap(), 1);
        // Rejected insert did not burn an id
        assert_eq!(store.ids.last(EntityKind::Proposal), 1);
    }

    #[test]
    fn concurrent_inserts_get_unique_ids() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let user = format!("user-{}", t);
                        store
                            .insert_proposal(NewProposal::new(user, format!("p{}", i)))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.proposal_count().unwrap(), 400);
        for t in 0..4 {
            let listed = store.proposals_by_user(&format!("user-{}", t)).unwrap();
            assert_eq!(listed.len(), 100);
            // ids and timestamps agree on ordering within a user's listing
            for pair in listed.windows(2) {
                assert!(pair[0].id > pair[1].id);
                assert!(pair[0].created_at >= pair[1].created_at);
            }
        }
    }
}
