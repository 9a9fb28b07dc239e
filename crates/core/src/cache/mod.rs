//! Ephemeral cache backing the search → fetch workflow.
//!
//! Nothing here is persisted; a restart forgets every issued id.

pub mod clock;
pub mod hash;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use hash::compute_result_id;
pub use store::{CacheEntry, ResultCache};
