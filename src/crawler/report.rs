//! Per-phase and per-run counters
//!
//! Counts stay reportable no matter how many items failed; a failed item is
//! counted, never propagated.

use crate::conversation::Scope;
use crate::state::ItemOutcome;
use crate::storage::RunTotals;

/// Counters for one traversal phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    /// Scope the phase traversed
    pub scope: Scope,

    /// Unique conversation identities left after partitioning and dedup
    pub discovered: usize,

    /// References actually processed (not already seen)
    pub attempted: usize,

    /// Conversations accepted by the sink
    pub exported: usize,

    /// Attempted but not exported, for any reason
    pub skipped: usize,

    /// Subset of `skipped` caused by errors or timeouts
    pub failed: usize,

    /// The named scope could not be entered; every other counter is zero
    pub navigation_failed: bool,
}

impl PhaseReport {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            discovered: 0,
            attempted: 0,
            exported: 0,
            skipped: 0,
            failed: 0,
            navigation_failed: false,
        }
    }

    /// Report for a named scope that could not be entered
    pub fn navigation_failed(scope: Scope) -> Self {
        Self {
            navigation_failed: true,
            ..Self::new(scope)
        }
    }

    /// Folds one item outcome into the counters
    pub fn record(&mut self, outcome: ItemOutcome) {
        if !outcome.is_attempted() {
            return;
        }

        self.attempted += 1;
        if outcome.is_success() {
            self.exported += 1;
        } else {
            self.skipped += 1;
        }
        if outcome.is_error() {
            self.failed += 1;
        }
    }
}

/// Counters for a whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Traversal mode label
    pub mode: String,

    /// One entry per phase, in execution order
    pub phases: Vec<PhaseReport>,

    /// Size of the seen set when the run finished
    pub seen: usize,
}

impl RunReport {
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            phases: Vec::new(),
            seen: 0,
        }
    }

    pub fn attempted(&self) -> usize {
        self.phases.iter().map(|p| p.attempted).sum()
    }

    pub fn exported(&self) -> usize {
        self.phases.iter().map(|p| p.exported).sum()
    }

    pub fn skipped(&self) -> usize {
        self.phases.iter().map(|p| p.skipped).sum()
    }

    pub fn failed(&self) -> usize {
        self.phases.iter().map(|p| p.failed).sum()
    }

    /// Named scopes that could not be entered
    pub fn unreachable_scopes(&self) -> Vec<&Scope> {
        self.phases
            .iter()
            .filter(|p| p.navigation_failed)
            .map(|p| &p.scope)
            .collect()
    }

    /// Totals in the shape the manifest stores
    pub fn totals(&self) -> RunTotals {
        RunTotals {
            attempted: self.attempted() as u64,
            exported: self.exported() as u64,
            skipped: self.skipped() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut phase = PhaseReport::new(Scope::Root);
        phase.record(ItemOutcome::Exported);
        phase.record(ItemOutcome::Failed);
        phase.record(ItemOutcome::Exported);
        phase.record(ItemOutcome::AlreadySeen);
        phase.record(ItemOutcome::Filtered);

        assert_eq!(phase.attempted, 4);
        assert_eq!(phase.exported, 2);
        assert_eq!(phase.skipped, 2);
        assert_eq!(phase.failed, 1);
    }

    #[test]
    fn test_navigation_failed_phase_counts_zero() {
        let phase = PhaseReport::navigation_failed(Scope::Named("Work".into()));
        assert!(phase.navigation_failed);
        assert_eq!(phase.exported, 0);
        assert_eq!(phase.attempted, 0);
    }

    #[test]
    fn test_run_totals_accumulate_phases() {
        let mut root = PhaseReport::new(Scope::Root);
        root.record(ItemOutcome::Exported);
        root.record(ItemOutcome::NoContent);

        let mut named = PhaseReport::new(Scope::Named("Work".into()));
        named.record(ItemOutcome::Exported);
        named.record(ItemOutcome::TimedOut);

        let mut report = RunReport::new("all");
        report.phases.push(root);
        report.phases.push(named);
        report
            .phases
            .push(PhaseReport::navigation_failed(Scope::Named("Gone".into())));

        assert_eq!(report.attempted(), 4);
        assert_eq!(report.exported(), 2);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.unreachable_scopes(), vec![&Scope::Named("Gone".into())]);
        assert_eq!(
            report.totals(),
            RunTotals {
                attempted: 4,
                exported: 2,
                skipped: 2,
            }
        );
    }
}
