//! Flutter-facing bindings for EventDeck core.

pub mod api;
