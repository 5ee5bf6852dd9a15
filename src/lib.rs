//! Scripting helpers: collections, strings, time, units, environment,
//! filesystem scanning, media sniffing, and a cycle-safe deep mapper over
//! dynamic value graphs.
//!
//! Each module stands alone; nothing here carries shared runtime state
//! beyond the memoized capability probe in [`envinfo`].

pub mod collect;
pub mod deep;
pub mod envinfo;
pub mod fsys;
pub mod ident;
pub mod logging;
pub mod media;
pub mod strings;
pub mod timefmt;
pub mod units;
pub mod value;

pub use deep::{map_deep, try_map_deep};
pub use value::{Record, RecordRef, Value, ValueError};
