//! Transition list processing
//!
//! Folds one incoming transition event into the ordered list of pending
//! transitions. Pure: the input list is never touched, and when an event has
//! no effect the very same `Arc` is handed back so callers can detect the
//! no-op by pointer.

use std::sync::Arc;

use optimistron_core::{DedupeMode, Event, Operation};
use tracing::trace;

/// Ordered pending transitions, in order of first staging
pub type PendingList<A> = Arc<Vec<Event<A>>>;

/// Apply one transition event to a pending list.
///
/// Invariant: at most one entry per transition id. Plain events (no
/// transition metadata) leave the list untouched.
pub fn process_transition<A: Clone>(event: &Event<A>, pending: &PendingList<A>) -> PendingList<A> {
    let Some(meta) = event.transition.as_ref() else {
        return Arc::clone(pending);
    };

    let position = pending.iter().position(|entry| entry.is_for(&meta.id));
    trace!(id = %meta.id, operation = %meta.operation, found = position.is_some(), "processing transition");

    match meta.operation {
        Operation::Stage | Operation::Amend => {
            // amending requires a prior stage
            if position.is_none() && meta.operation == Operation::Amend {
                return Arc::clone(pending);
            }

            let staged = staged_entry(event, position.map(|idx| &pending[idx]));
            let mut next = pending.as_ref().clone();
            match position {
                Some(idx) => next[idx] = staged,
                None => next.push(staged),
            }
            Arc::new(next)
        }

        Operation::Fail => match position {
            Some(idx) => {
                let mut next = pending.as_ref().clone();
                next[idx].transition.iter_mut().for_each(|t| t.failed = true);
                Arc::new(next)
            }
            None => Arc::clone(pending),
        },

        Operation::Stash => match position {
            Some(idx) => {
                let mut next = pending.as_ref().clone();
                match next[idx].trailing().cloned() {
                    Some(trailing) => next[idx] = trailing,
                    None => {
                        next.remove(idx);
                    }
                }
                Arc::new(next)
            }
            None => Arc::clone(pending),
        },

        Operation::Commit => match position {
            Some(idx) => {
                let mut next = pending.as_ref().clone();
                next.remove(idx);
                Arc::new(next)
            }
            None => Arc::clone(pending),
        },
    }
}

/// Build the staged entry replacing (or joining) the pending list.
fn staged_entry<A: Clone>(event: &Event<A>, existing: Option<&Event<A>>) -> Event<A> {
    let staged = event.to_staged().with_transition(|t| t.trailing = None);

    let Some(existing) = existing else {
        return staged;
    };

    // a repeat of the same type collapses onto the existing rollback target,
    // anything else makes the existing entry the target (one level only)
    let trailing = if existing.same_type(event) {
        existing.trailing().cloned()
    } else {
        Some(existing.clone().with_transition(|t| t.trailing = None))
    };

    let amend = event.operation() == Some(Operation::Amend);
    let dedupe = event.transition.as_ref().map(|t| t.dedupe);

    staged.with_transition(|t| {
        if amend {
            if let Some(prev) = existing.transition.as_ref() {
                t.dedupe = prev.dedupe;
                t.conflict = prev.conflict;
                t.failed = prev.failed;
            }
        }

        t.trailing = match dedupe {
            Some(DedupeMode::Trailing) => trailing.map(Box::new),
            _ => None,
        };
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use optimistron_core::Transitions;

    const ID: &str = "transition-1";

    fn overwrite() -> Transitions {
        Transitions::new("test::transition")
    }

    fn trailing() -> Transitions {
        Transitions::trailing("test::transition_with_history")
    }

    fn apply(events: &[Event<u32>]) -> PendingList<u32> {
        events
            .iter()
            .fold(Arc::new(Vec::new()), |pending, event| {
                process_transition(event, &pending)
            })
    }

    #[test]
    fn test_stage_pushes_new_entry() {
        let stage = overwrite().stage(ID, 1);
        let processed = apply(&[stage.clone()]);

        assert_eq!(*processed, vec![stage]);
    }

    #[test]
    fn test_stage_replaces_existing_entry() {
        let stage = overwrite().stage(ID, 2);
        let processed = apply(&[overwrite().stage(ID, 1), stage.clone()]);

        assert_eq!(*processed, vec![stage]);
    }

    #[test]
    fn test_stage_trailing_keeps_previous_entry() {
        let stage = overwrite().stage(ID, 1);
        let stage_trailing = trailing().stage(ID, 2);
        let processed = apply(&[stage.clone(), stage_trailing.clone()]);

        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].trailing(), Some(&stage));
        assert_eq!(processed[0].kind, stage_trailing.kind);
        assert_eq!(processed[0].payload, 2);
    }

    #[test]
    fn test_repeated_trailing_stage_collapses() {
        let stage = overwrite().stage(ID, 1);
        let stage_trailing = trailing().stage(ID, 2);
        let processed = apply(&[stage.clone(), stage_trailing.clone(), stage_trailing]);

        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].trailing(), Some(&stage));
        assert_eq!(processed[0].payload, 2);
    }

    #[test]
    fn test_overwrite_stage_drops_trailing() {
        let stage = overwrite().stage(ID, 1);
        let processed = apply(&[stage.clone(), trailing().stage(ID, 2), stage.clone()]);

        assert_eq!(*processed, vec![stage]);
        assert!(processed[0].trailing().is_none());
    }

    #[test]
    fn test_trailing_is_single_level() {
        let a = Transitions::new("test::a").stage(ID, 1);
        let b = Transitions::trailing("test::b").stage(ID, 2);
        let c = Transitions::trailing("test::c").stage(ID, 3);
        let processed = apply(&[a, b.clone(), c]);

        let target = processed[0].trailing().unwrap();
        assert_eq!(target.payload, 2);
        assert_eq!(target.kind, b.kind);
        assert!(target.trailing().is_none());
    }

    #[test]
    fn test_amend_without_stage_is_noop() {
        let pending = apply(&[overwrite().stage("other", 1)]);
        let next = process_transition(&overwrite().amend(ID, 5), &pending);

        assert!(Arc::ptr_eq(&pending, &next));
    }

    #[test]
    fn test_amend_keeps_identity_and_flags() {
        let t = overwrite();
        let processed = apply(&[t.stage(ID, 1), t.fail(ID, "boom"), t.amend(ID, 5)]);

        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].payload, 5);
        assert_eq!(processed[0].operation(), Some(Operation::Stage));
        assert!(processed[0].is_failed());
    }

    #[test]
    fn test_restage_clears_failed() {
        let t = overwrite();
        let processed = apply(&[t.stage(ID, 1), t.fail(ID, "boom"), t.stage(ID, 1)]);

        assert_eq!(*processed, vec![t.stage(ID, 1)]);
    }

    #[test]
    fn test_fail_flags_matching_entry() {
        let stage = overwrite().stage(ID, 1);
        let processed = apply(&[stage.clone(), overwrite().fail(ID, "boom")]);

        assert_eq!(processed.len(), 1);
        assert!(processed[0].is_failed());
        assert_eq!(processed[0].kind, stage.kind);
        assert_eq!(processed[0].payload, stage.payload);
    }

    #[test]
    fn test_fail_without_match_is_noop() {
        let pending = apply(&[overwrite().stage(ID, 1)]);
        let next = process_transition(&overwrite().fail("unknown", "boom"), &pending);

        assert!(Arc::ptr_eq(&pending, &next));
    }

    #[test]
    fn test_stash_removes_entry() {
        let processed = apply(&[overwrite().stage(ID, 1), overwrite().stash(ID)]);
        assert!(processed.is_empty());
    }

    #[test]
    fn test_stash_without_match_is_noop() {
        let stage = overwrite().stage(ID, 1);
        let processed = apply(&[stage.clone(), overwrite().stash("unknown")]);

        assert_eq!(*processed, vec![stage]);
    }

    #[test]
    fn test_stash_reverts_to_trailing() {
        let stage = overwrite().stage(ID, 1);
        let processed = apply(&[stage.clone(), trailing().stage(ID, 2), trailing().stash(ID)]);

        assert_eq!(*processed, vec![stage]);
    }

    #[test]
    fn test_commit_removes_only_matching_entry() {
        let stage_a = overwrite().stage(ID, 1);
        let stage_b = overwrite().stage("other", 1);
        let processed = apply(&[stage_a, stage_b.clone(), overwrite().commit(ID)]);

        assert_eq!(*processed, vec![stage_b]);
    }

    #[test]
    fn test_commit_without_match_keeps_list() {
        let pending = apply(&[overwrite().stage("other", 1)]);
        let next = process_transition(&overwrite().commit(ID), &pending);

        assert!(Arc::ptr_eq(&pending, &next));
        assert!(!next.iter().any(|e| e.transition_id().is_some_and(|id| id == ID)));
    }

    #[test]
    fn test_plain_event_is_ignored() {
        let pending = apply(&[overwrite().stage(ID, 1)]);
        let next = process_transition(&Event::new("init", 0), &pending);

        assert!(Arc::ptr_eq(&pending, &next));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_commit_clears_id(ids in prop::collection::vec(0u8..4, 0..16), target in 0u8..4) {
                let stages: Vec<_> = ids.iter().map(|id| overwrite().stage(format!("t{id}"), u32::from(*id))).collect();
                let pending = apply(&stages);
                let target = format!("t{target}");
                let next = process_transition(&overwrite().commit(target.as_str()), &pending);

                prop_assert!(next.iter().all(|e| e.transition_id().map_or(true, |id| *id != target.as_str())));
                prop_assert!(next.len() + 1 >= pending.len());
            }
        }
    }
}
