//! Property-based tests for dispatch and the store contract.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated tables and event sequences. Every handler here is
//! synchronous, so dispatch futures settle on their first poll.

use chrono::Utc;
use fsm_store::core::{State, StateHistory, StateTransition};
use fsm_store::{state_enum, ActionSet, Fsm, MachineBuilder, MachineConfig, StateTable};
use futures::FutureExt;
use proptest::prelude::*;
use serde_json::Value;
use std::sync::{Arc, Mutex};

state_enum! {
    enum TestState {
        Idle,
        Loading,
        Ready,
        Failed,
    }
}

const STATES: [TestState; 4] = [
    TestState::Idle,
    TestState::Loading,
    TestState::Ready,
    TestState::Failed,
];
const EVENTS: [&str; 3] = ["load", "done", "reset"];

prop_compose! {
    fn arbitrary_state()(variant in 0..4usize) -> TestState {
        STATES[variant].clone()
    }
}

/// For each state and event, either no handler or a literal target.
fn arbitrary_targets() -> impl Strategy<Value = Vec<Vec<Option<TestState>>>> {
    prop::collection::vec(
        prop::collection::vec(prop::option::of(arbitrary_state()), EVENTS.len()),
        STATES.len(),
    )
}

fn arbitrary_events() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..EVENTS.len(), 0..20)
}

fn table_from(targets: &[Vec<Option<TestState>>]) -> StateTable<TestState, Value> {
    STATES
        .iter()
        .zip(targets)
        .fold(StateTable::new(), |table, (state, row)| {
            let actions = EVENTS
                .iter()
                .zip(row)
                .filter_map(|(event, target)| target.clone().map(|target| (event, target)))
                .fold(ActionSet::new(), |set, (event, target)| set.on(*event, target));
            table.state(state.clone(), actions)
        })
}

fn build(initial: TestState, table: StateTable<TestState, Value>, history: usize) -> Fsm<TestState> {
    MachineBuilder::new(initial)
        .table(table)
        .config(MachineConfig::default().with_history(history))
        .build()
        .now_or_never()
        .expect("synchronous build")
        .expect("valid machine")
}

fn send(fsm: &Fsm<TestState>, event: &str) -> TestState {
    fsm.send(event, vec![])
        .now_or_never()
        .expect("synchronous dispatch")
        .expect("dispatch succeeds")
}

fn recorded(fsm: &Fsm<TestState>) -> Arc<Mutex<Vec<TestState>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _ = fsm.subscribe(move |state: &TestState| sink.lock().unwrap().push(state.clone()));
    seen
}

proptest! {
    #[test]
    fn state_tracks_literal_targets(
        initial in arbitrary_state(),
        targets in arbitrary_targets(),
        events in arbitrary_events(),
    ) {
        let fsm = build(initial.clone(), table_from(&targets), 0);
        let mut expected = initial;

        for event in events {
            let row = STATES.iter().position(|s| *s == expected).unwrap();
            if let Some(target) = &targets[row][event] {
                expected = target.clone();
            }
            prop_assert_eq!(send(&fsm, EVENTS[event]), expected.clone());
            prop_assert_eq!(fsm.state(), expected.clone());
        }
    }

    #[test]
    fn subscribers_hear_exactly_the_changes(
        initial in arbitrary_state(),
        targets in arbitrary_targets(),
        events in arbitrary_events(),
    ) {
        let fsm = build(initial.clone(), table_from(&targets), 0);
        let seen = recorded(&fsm);
        let mut expected = vec![initial.clone()];
        let mut current = initial;

        for event in events {
            let next = send(&fsm, EVENTS[event]);
            if next != current {
                expected.push(next.clone());
            }
            current = next;
        }

        prop_assert_eq!(&*seen.lock().unwrap(), &expected);
    }

    #[test]
    fn history_matches_committed_path(
        targets in arbitrary_targets(),
        events in arbitrary_events(),
    ) {
        let fsm = build(TestState::Idle, table_from(&targets), 64);
        let mut path = vec![TestState::Idle];

        for event in events {
            let next = send(&fsm, EVENTS[event]);
            if path.last() != Some(&next) {
                path.push(next);
            }
        }

        let history = fsm.history();
        if history.is_empty() {
            prop_assert_eq!(path.len(), 1);
        } else {
            let recorded: Vec<TestState> = history.get_path().into_iter().cloned().collect();
            prop_assert_eq!(recorded, path);
        }
    }

    #[test]
    fn state_specific_handlers_beat_the_fallback(
        state in arbitrary_state(),
        specific in arbitrary_state(),
        wildcard in arbitrary_state(),
        handled in any::<bool>(),
    ) {
        let actions = if handled {
            ActionSet::new().on("surge", specific.clone())
        } else {
            ActionSet::new()
        };
        let table = StateTable::new()
            .state(state.clone(), actions)
            .fallback(ActionSet::new().on("surge", wildcard.clone()));
        let fsm = build(state, table, 0);

        let expected = if handled { specific } else { wildcard };
        prop_assert_eq!(send(&fsm, "surge"), expected);
    }

    #[test]
    fn toggling_alternates(count in 0..40usize) {
        let table = StateTable::new()
            .state("off", ActionSet::new().on("toggle", "on"))
            .state("on", ActionSet::new().on("toggle", "off"));
        let fsm: Fsm<String> = Fsm::new("off", table).now_or_never().unwrap().unwrap();
        let notified = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&notified);
        let _ = fsm.subscribe(move |_: &String| *counter.lock().unwrap() += 1);

        for _ in 0..count {
            fsm.send("toggle", vec![]).now_or_never().unwrap().unwrap();
        }

        let expected = if count % 2 == 0 { "off" } else { "on" };
        prop_assert_eq!(fsm.state(), expected);
        prop_assert_eq!(*notified.lock().unwrap(), count + 1);
    }

    #[test]
    fn unknown_events_never_change_state(
        initial in arbitrary_state(),
        targets in arbitrary_targets(),
        event in "[a-z]{1,8}",
    ) {
        prop_assume!(!EVENTS.contains(&event.as_str()));
        let fsm = build(initial.clone(), table_from(&targets), 0);
        let seen = recorded(&fsm);

        prop_assert_eq!(send(&fsm, &event), initial.clone());
        prop_assert_eq!(&*seen.lock().unwrap(), &vec![initial]);
    }

    #[test]
    fn state_name_matches_variant(state in arbitrary_state()) {
        let json = serde_json::to_string(&state).unwrap();
        prop_assert_eq!(json, format!("\"{}\"", state.name()));
    }

    #[test]
    fn history_never_exceeds_capacity(
        capacity in 1..8usize,
        transitions in prop::collection::vec((arbitrary_state(), arbitrary_state()), 0..20),
    ) {
        let mut history = StateHistory::with_capacity(capacity);

        for (from, to) in &transitions {
            history.record(StateTransition {
                from: from.clone(),
                to: to.clone(),
                event: "step".to_string(),
                timestamp: Utc::now(),
            });
        }

        prop_assert_eq!(history.len(), transitions.len().min(capacity));
        if let Some((_, last)) = transitions.last() {
            prop_assert_eq!(history.get_path().last().copied(), Some(last));
        }
    }

    #[test]
    fn history_roundtrip_serialization(
        transitions in prop::collection::vec((arbitrary_state(), arbitrary_state()), 0..5)
    ) {
        let mut history = StateHistory::with_capacity(8);

        for (from, to) in transitions {
            history.record(StateTransition {
                from,
                to,
                event: "step".to_string(),
                timestamp: Utc::now(),
            });
        }

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<TestState> = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(history.len(), deserialized.len());
        prop_assert_eq!(history.get_path(), deserialized.get_path());
    }
}
