//! Services module
//!
//! Contains the upstream data gateway, the record merger, the refresh
//! pipeline, and the summary renderer.

pub mod merge;
pub mod refresh;
pub mod summary;
pub mod upstream;

pub use refresh::{RefreshOutcome, RefreshService};
pub use summary::{SummaryInput, SummaryRenderer};
pub use upstream::{RawCountry, UpstreamClient, UpstreamError};
