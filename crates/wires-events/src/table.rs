//! Subscription table: event name → ordered listener records.

use crate::{Callback, Context};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A registered listener.
///
/// `original` is set for once-wrappers: `callback` is the wrapper and
/// `original` the callback the caller registered, so removal by either
/// identity succeeds.
pub(crate) struct ListenerRecord {
    pub(crate) callback: Callback,
    pub(crate) original: Option<Callback>,
    pub(crate) context: Option<Context>,
    /// Cleared when the record leaves the table; an in-flight dispatch
    /// skips records that are no longer live.
    live: AtomicBool,
}

impl ListenerRecord {
    pub(crate) fn new(callback: Callback, context: Option<Context>) -> Self {
        Self {
            callback,
            original: None,
            context,
            live: AtomicBool::new(true),
        }
    }

    pub(crate) fn once(wrapper: Callback, original: Callback, context: Option<Context>) -> Self {
        Self {
            callback: wrapper,
            original: Some(original),
            context,
            live: AtomicBool::new(true),
        }
    }

    pub(crate) fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn retire(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    /// Removal match: every given field must match.
    pub(crate) fn matches(&self, callback: Option<&Callback>, context: Option<&Context>) -> bool {
        let callback_matches = callback.map_or(true, |cb| {
            self.callback.same(cb) || self.original.as_ref().is_some_and(|o| o.same(cb))
        });
        let context_matches = context.map_or(true, |ctx| self.context.as_ref() == Some(ctx));
        callback_matches && context_matches
    }
}

/// Per-host subscription table.
///
/// Lists are never left empty: an event whose last record is removed
/// disappears from the table.
#[derive(Default)]
pub(crate) struct EventTable {
    events: HashMap<String, Vec<Arc<ListenerRecord>>>,
}

impl EventTable {
    /// Appends a record. Returns the new length of the event's list.
    pub(crate) fn push(&mut self, name: String, record: ListenerRecord) -> usize {
        let list = self.events.entry(name).or_default();
        list.push(Arc::new(record));
        list.len()
    }

    /// Returns the event's records as they are right now.
    pub(crate) fn snapshot(&self, name: &str) -> Option<Vec<Arc<ListenerRecord>>> {
        self.events.get(name).cloned()
    }

    /// Removes every record of `name`.
    pub(crate) fn remove_event(&mut self, name: &str) {
        if let Some(list) = self.events.remove(name) {
            list.iter().for_each(|r| r.retire());
        }
    }

    /// Removes records of `name` (every event if `None`) that match the
    /// given callback and context. Returns the number removed.
    pub(crate) fn remove_matching(
        &mut self,
        name: Option<&str>,
        callback: Option<&Callback>,
        context: Option<&Context>,
    ) -> usize {
        let names: Vec<String> = match name {
            Some(name) => vec![name.to_string()],
            None => self.events.keys().cloned().collect(),
        };

        let mut removed = 0;
        for name in names {
            let Some(list) = self.events.get_mut(&name) else {
                continue;
            };
            list.retain(|record| {
                if record.matches(callback, context) {
                    record.retire();
                    removed += 1;
                    false
                } else {
                    true
                }
            });
            if list.is_empty() {
                self.events.remove(&name);
            }
        }
        removed
    }

    /// Retires every record. Used on full reset.
    pub(crate) fn retire_all(&self) {
        self.events.values().flatten().for_each(|r| r.retire());
    }

    pub(crate) fn listener_count(&self, name: &str) -> usize {
        self.events.get(name).map_or(0, Vec::len)
    }

    pub(crate) fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.events.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns `true` if any record was registered with `context`.
    pub(crate) fn has_context(&self, context: &Context) -> bool {
        self.events
            .values()
            .flatten()
            .any(|r| r.context.as_ref() == Some(context))
    }
}
