//! Property-based tests for the conversation store
//!
//! Random operation sequences are driven against the store the same way an
//! exchange would drive it, and the ordering and immutability invariants are
//! checked after every step.

use super::*;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
enum Op {
    Submit(String),
    Fragment(String),
    Finalize,
    Fail,
    /// Stray terminal write, as if two exit paths raced
    DoubleFinalize,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[ a-zA-Z?]{0,12}".prop_map(Op::Submit),
        "[a-zé😀 ]{0,6}".prop_map(Op::Fragment),
        Just(Op::Finalize),
        Just(Op::Fail),
        Just(Op::DoubleFinalize),
    ]
}

const FALLBACK: &str = "Sorry, try again.";

struct Harness {
    store: ConversationStore,
    in_flight: Option<MessageId>,
    last_finished: Option<MessageId>,
    /// Expected submission order: (user text, assistant id)
    submitted: Vec<(String, MessageId)>,
}

impl Harness {
    fn new() -> Self {
        Self {
            store: ConversationStore::new("hi"),
            in_flight: None,
            last_finished: None,
            submitted: Vec::new(),
        }
    }

    fn apply(&mut self, op: Op) {
        match op {
            Op::Submit(text) => match self.store.append_exchange(&text) {
                Ok((user, pending)) => {
                    assert!(self.in_flight.is_none());
                    self.submitted.push((user.content, pending.id));
                    self.in_flight = Some(pending.id);
                }
                Err(StoreError::EmptyMessage) => assert!(text.trim().is_empty()),
                Err(StoreError::AlreadyStreaming(id)) => assert_eq!(Some(id), self.in_flight),
                Err(e) => panic!("unexpected store error: {e}"),
            },
            Op::Fragment(text) => {
                if let Some(id) = self.in_flight {
                    self.store.append_fragment(id, &text).unwrap();
                }
            }
            Op::Finalize => {
                if let Some(id) = self.in_flight.take() {
                    self.store.finalize(id).unwrap();
                    self.last_finished = Some(id);
                }
            }
            Op::Fail => {
                if let Some(id) = self.in_flight.take() {
                    self.store.replace_and_finalize(id, FALLBACK).unwrap();
                    assert_eq!(self.store.get(id).unwrap().content, FALLBACK);
                    self.last_finished = Some(id);
                }
            }
            Op::DoubleFinalize => {
                if let Some(id) = self.last_finished {
                    self.store.finalize(id).unwrap();
                    self.store.replace_and_finalize(id, "overwritten").unwrap();
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_store_invariants(ops in proptest::collection::vec(arb_op(), 1..60)) {
        let mut harness = Harness::new();
        let mut finals: HashMap<MessageId, Message> = HashMap::new();

        for op in ops {
            harness.apply(op);
            let snapshot = harness.store.snapshot();

            // Single streaming message
            let streaming = snapshot.iter().filter(|m| m.is_streaming()).count();
            prop_assert!(streaming <= 1);
            prop_assert_eq!(streaming, usize::from(harness.in_flight.is_some()));

            // Identities are never reused
            let ids: HashSet<_> = snapshot.iter().map(|m| m.id).collect();
            prop_assert_eq!(ids.len(), snapshot.len());

            // Final messages never change once final
            for msg in &snapshot {
                if msg.status == MessageStatus::Final {
                    if let Some(previous) = finals.get(&msg.id) {
                        prop_assert_eq!(previous, msg);
                    } else {
                        finals.insert(msg.id, msg.clone());
                    }
                }
            }

            // Greeting, then user/assistant pairs in submission order
            prop_assert_eq!(snapshot.len(), 1 + 2 * harness.submitted.len());
            for (pair, (text, assistant_id)) in snapshot[1..].chunks(2).zip(&harness.submitted) {
                prop_assert_eq!(pair[0].role, Role::User);
                prop_assert_eq!(&pair[0].content, text);
                prop_assert_eq!(pair[1].role, Role::Assistant);
                prop_assert_eq!(pair[1].id, *assistant_id);
            }
        }
    }

    #[test]
    fn prop_fragment_events_replay_content(
        fragments in proptest::collection::vec("[a-z ñ漢]{0,5}", 0..20)
    ) {
        let store = ConversationStore::new("hi");
        let mut rx = store.subscribe();
        let pending = store.append_pending_assistant_message().unwrap();
        for fragment in &fragments {
            store.append_fragment(pending.id, fragment).unwrap();
        }
        store.finalize(pending.id).unwrap();

        // Replaying the events rebuilds exactly the stored content
        let mut replayed = String::new();
        let mut finalized = None;
        while let Ok(event) = rx.try_recv() {
            prop_assert_eq!(event.id(), pending.id);
            match event {
                StoreEvent::Appended(msg) => replayed = msg.content,
                StoreEvent::Fragment { text, .. } => {
                    prop_assert!(!text.is_empty());
                    replayed.push_str(&text);
                }
                StoreEvent::Finalized(msg) => finalized = Some(msg),
            }
        }
        let finalized = finalized.unwrap();
        prop_assert_eq!(&finalized.content, &replayed);
        prop_assert_eq!(replayed, fragments.concat());
    }
}
