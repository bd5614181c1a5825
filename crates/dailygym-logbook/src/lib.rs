//! Daily English Gym Logbook - append-only per-day practice records
//!
//! One Markdown file per calendar day, session blocks appended in order,
//! audio sidecars derived from `(date, session, kind)`. The text format is
//! a compatibility contract; everything about it lives in [`entry`].

pub mod entry;
mod store;

pub use store::LogStore;
