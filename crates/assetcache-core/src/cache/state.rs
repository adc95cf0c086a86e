//! Mutable cache state shared by every handle: the in-memory slot and the in-flight ticket.

use futures::future::{BoxFuture, Shared};

use crate::asset::Asset;
use crate::retry::FetchError;

/// A network fetch every concurrent caller awaits. Resolves once; clones observe the same outcome.
pub(crate) type Ticket = Shared<BoxFuture<'static, Result<Asset, FetchError>>>;

#[derive(Default)]
pub(crate) struct State {
    pub memory: Option<Asset>,
    pub in_flight: Option<InFlight>,
    /// Bumped by `clear_cache`; completions from an older generation are ignored.
    pub generation: u64,
    next_ticket_id: u64,
}

pub(crate) struct InFlight {
    pub id: u64,
    pub ticket: Ticket,
}

/// Where a caller stands after looking at memory and the in-flight slot.
pub(crate) enum Lookup {
    Ready(Asset),
    Pending(Ticket),
    Empty,
}

impl State {
    pub fn lookup(&self) -> Lookup {
        if let Some(asset) = &self.memory {
            return Lookup::Ready(asset.clone());
        }
        if let Some(f) = &self.in_flight {
            return Lookup::Pending(f.ticket.clone());
        }
        Lookup::Empty
    }

    pub fn next_ticket_id(&mut self) -> u64 {
        self.next_ticket_id += 1;
        self.next_ticket_id
    }

    /// Record the outcome of ticket `id` started in `generation`.
    /// Returns true when the asset became the in-memory copy (and should be persisted).
    pub fn complete(&mut self, id: u64, generation: u64, result: &Result<Asset, FetchError>) -> bool {
        if self.in_flight.as_ref().is_some_and(|f| f.id == id) {
            self.in_flight = None;
        }
        match result {
            Ok(asset) if generation == self.generation => {
                self.memory = Some(asset.clone());
                true
            }
            _ => false,
        }
    }

    /// Keep `asset` in memory unless the cache was cleared since `generation` or already holds one.
    pub fn remember(&mut self, generation: u64, asset: Asset) -> Asset {
        if generation != self.generation {
            return asset;
        }
        self.memory.get_or_insert(asset).clone()
    }

    pub fn clear(&mut self) {
        self.memory = None;
        self.in_flight = None;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(b: &[u8]) -> Asset {
        Asset::new(b.to_vec(), "application/pdf")
    }

    #[test]
    fn complete_fills_memory_for_current_generation() {
        let mut st = State::default();
        let id = st.next_ticket_id();
        assert!(st.complete(id, 0, &Ok(asset(b"a"))));
        assert!(matches!(st.lookup(), Lookup::Ready(_)));
    }

    #[test]
    fn complete_after_clear_is_ignored() {
        let mut st = State::default();
        let id = st.next_ticket_id();
        st.clear();
        assert!(!st.complete(id, 0, &Ok(asset(b"a"))));
        assert!(matches!(st.lookup(), Lookup::Empty));
    }

    #[test]
    fn failure_leaves_memory_empty() {
        let mut st = State::default();
        let id = st.next_ticket_id();
        assert!(!st.complete(id, 0, &Err(FetchError::Http(500))));
        assert!(st.memory.is_none());
    }

    #[test]
    fn remember_keeps_existing_copy() {
        let mut st = State::default();
        let first = st.remember(0, asset(b"first"));
        let second = st.remember(0, asset(b"second"));
        assert_eq!(first.content(), b"first");
        assert_eq!(second.content(), b"first");

        st.clear();
        let stale = st.remember(0, asset(b"stale"));
        assert_eq!(stale.content(), b"stale");
        assert!(st.memory.is_none());
    }
}
