//! Update check module
//!
//! Checks a JSON version manifest URL for a newer application version.
//! At most one check is in flight at a time: a `check_update_available()`
//! issued while a request is outstanding only resets the retry budget
//! instead of issuing another network call. Permanent redirects are followed
//! without consuming the retry budget; other failures are retried a bounded
//! number of times before a terminal check-error event is emitted.

pub mod controller;

pub use controller::{
    FetchResponse, UpdateCheckResult, UpdateController, UpdateEvent, VersionFetch,
    compare_versions,
};
