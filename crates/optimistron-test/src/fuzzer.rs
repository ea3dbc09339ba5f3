//! Transition Stream Fuzzer - Randomized checks of the reconciliation engine
//!
//! Drives an `items` engine with random interleavings of stage, amend,
//! commit, fail and stash over a small pool of transition ids and items, and
//! checks after every event:
//! - At most one pending entry per transition id
//! - Pending entries are stored staged, with single-level trailing
//! - Commits remove their id from the pending list
//! - Non-commit transitions leave the authoritative state untouched
//! - The sanitized pending list is stable under another pass

use std::collections::HashSet;
use std::sync::Arc;

use optimistron_core::{Event, OptimistronResult, Operation, Transitions};
use optimistron_state::{OptimistronOptions, Registry, Sanitizer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::{
    create_item, delete_item, edit_item, edit_item_trailing, item, register_items, Item,
    ItemEngine, ItemEvent, ItemHandler, ItemReconciliation, ItemState,
};

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Distinct item ids
    pub item_count: usize,
    /// Distinct transition ids
    pub transition_count: usize,
    /// Number of events to generate
    pub event_count: usize,
    /// Probability of a plain (non-transition) event
    pub plain_prob: f64,
    /// Probability that an edit uses trailing dedupe
    pub trailing_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            item_count: 5,
            transition_count: 8,
            event_count: 1000,
            plain_prob: 0.05,
            trailing_prob: 0.3,
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            item_count: 3,
            transition_count: 4,
            event_count: 200,
            plain_prob: 0.0,
            trailing_prob: 0.2,
            seed: 42,
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        FuzzerConfig {
            item_count: 20,
            transition_count: 32,
            event_count: 10000,
            plain_prob: 0.1,
            trailing_prob: 0.5,
            seed: 42,
        }
    }
}

/// Invariant violation found while fuzzing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Index of the offending event
    pub step: usize,
    pub event_type: String,
    pub reason: String,
}

/// Fuzzing result
#[derive(Debug, Default)]
pub struct FuzzResult {
    pub events_processed: usize,
    pub commits_applied: usize,
    /// Conflicting pending entries, summed over all steps
    pub conflicts_seen: usize,
    pub max_pending: usize,
    pub violations: Vec<Violation>,
}

impl FuzzResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Transition stream fuzzer
pub struct TransitionFuzzer {
    config: FuzzerConfig,
    engine: ItemEngine,
    sanitizer: Sanitizer<ItemHandler, Option<Item>>,
    rng: StdRng,
    revision: i64,
}

impl TransitionFuzzer {
    /// Fuzzer over a fresh `items` engine in a private registry
    pub fn new(config: FuzzerConfig) -> OptimistronResult<Self> {
        let rng = StdRng::seed_from_u64(config.seed);
        let engine = register_items(&Registry::new(), ItemState::new(), OptimistronOptions::default())?;
        let sanitizer = Sanitizer::new(Arc::clone(engine.binding()));

        Ok(TransitionFuzzer {
            config,
            engine,
            sanitizer,
            rng,
            revision: 0,
        })
    }

    /// Generate the event stream up front
    pub fn generate(&mut self) -> Vec<ItemEvent> {
        (0..self.config.event_count).map(|_| self.generate_event()).collect()
    }

    fn generate_event(&mut self) -> ItemEvent {
        self.revision += 1;
        let item_id = self.rng.gen_range(0..self.config.item_count.max(1)).to_string();
        // stale writes reuse an old revision
        let revision = if self.rng.gen_bool(0.2) {
            self.rng.gen_range(0..self.revision)
        } else {
            self.revision
        };
        let payload = Some(item(&item_id, &format!("v{}", self.revision), revision));

        if self.rng.gen::<f64>() < self.config.plain_prob {
            return Event::new("fuzz::tick", payload);
        }

        let transitions = self.pick_transitions();
        let id = format!("t{}", self.rng.gen_range(0..self.config.transition_count.max(1)));

        match self.rng.gen_range(0..10) {
            0..=3 => transitions.stage(id, payload),
            4 => transitions.amend(id, payload),
            5 | 6 => transitions.commit(id),
            7 => transitions.fail(id, "request failed"),
            _ => transitions.stash(id),
        }
    }

    fn pick_transitions(&mut self) -> Transitions {
        match self.rng.gen_range(0..3) {
            0 => create_item(),
            1 if self.rng.gen::<f64>() < self.config.trailing_prob => edit_item_trailing(),
            1 => edit_item(),
            _ => delete_item(),
        }
    }

    /// Generate and replay a stream, checking invariants after each event
    pub fn run(&mut self) -> FuzzResult {
        let events = self.generate();
        self.replay(&events)
    }

    /// Replay a given stream, checking invariants after each event
    pub fn replay(&self, events: &[ItemEvent]) -> FuzzResult {
        let mut result = FuzzResult::new();
        let mut state = self.engine.initial_state();

        for (step, event) in events.iter().enumerate() {
            let next = self.engine.reduce(Some(&state), event);

            for reason in self.check(&state, &next, event) {
                result.violations.push(Violation {
                    step,
                    event_type: event.event_type(),
                    reason,
                });
            }

            if event.operation() == Some(Operation::Commit) && !Arc::ptr_eq(next.state(), state.state()) {
                result.commits_applied += 1;
            }
            result.conflicts_seen += next.transitions().iter().filter(|e| e.is_conflicting()).count();
            result.max_pending = result.max_pending.max(next.transitions().len());
            result.events_processed += 1;
            state = next;
        }

        debug!(
            events = result.events_processed,
            commits = result.commits_applied,
            violations = result.violations.len(),
            "transition fuzz run complete"
        );
        result
    }

    fn check(&self, prev: &ItemReconciliation, next: &ItemReconciliation, event: &ItemEvent) -> Vec<String> {
        let mut violations = Vec::new();

        let mut seen = HashSet::new();
        for entry in next.transitions() {
            let Some(meta) = entry.transition.as_ref() else {
                violations.push(format!("plain event {} in pending list", entry.kind));
                continue;
            };
            if !seen.insert(meta.id.clone()) {
                violations.push(format!("duplicate pending entry for {}", meta.id));
            }
            if meta.operation != Operation::Stage {
                violations.push(format!("pending entry {} stored as {}", meta.id, meta.operation));
            }
            if entry.trailing().is_some_and(|t| t.trailing().is_some()) {
                violations.push(format!("nested trailing entry under {}", meta.id));
            }
        }

        if let Some(meta) = event.transition.as_ref() {
            if meta.operation == Operation::Commit && next.transitions().iter().any(|e| e.is_for(&meta.id)) {
                violations.push(format!("{} still pending after commit", meta.id));
            }
            if meta.operation != Operation::Commit && !Arc::ptr_eq(prev.state(), next.state()) {
                violations.push(format!("{} changed the authoritative state", meta.operation));
            }
        }

        if !Arc::ptr_eq(&self.sanitizer.sanitize(next), next.pending()) {
            violations.push("sanitized pending list not stable".to_string());
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_tracing;

    #[test]
    fn test_fuzzer_light() {
        init_tracing();
        let mut fuzzer = TransitionFuzzer::new(FuzzerConfig::light()).unwrap();
        let result = fuzzer.run();

        assert_eq!(result.events_processed, 200);
        assert!(result.is_valid(), "violations: {:?}", result.violations);
    }

    #[test]
    fn test_fuzzer_default() {
        let mut fuzzer = TransitionFuzzer::new(FuzzerConfig::default()).unwrap();
        let result = fuzzer.run();

        assert!(result.is_valid(), "violations: {:?}", result.violations);
        assert!(result.commits_applied > 0);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let a = TransitionFuzzer::new(FuzzerConfig::light()).unwrap().generate();
        let b = TransitionFuzzer::new(FuzzerConfig::light()).unwrap().generate();

        assert_eq!(a, b);
    }

    #[test]
    fn test_detects_commit_left_pending() {
        let fuzzer = TransitionFuzzer::new(FuzzerConfig::light()).unwrap();
        let prev = fuzzer.engine.initial_state();
        let stage = create_item().stage("t1", Some(item("1", "a", 0)));
        let next = fuzzer.engine.reduce(Some(&prev), &stage);

        let violations = fuzzer.check(&prev, &next, &create_item().commit("t1"));
        assert_eq!(violations, vec!["t1 still pending after commit".to_string()]);
    }
}
