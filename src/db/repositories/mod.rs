//! Repository module
//!
//! Data access layer for the country table and the refresh metadata singleton.

pub mod country;

pub use country::CountryRepository;
