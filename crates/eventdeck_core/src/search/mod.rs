//! In-memory event filtering for the list screen search box.

pub mod filter;
