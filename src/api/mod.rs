//! API endpoint handlers

pub mod countries;
pub mod root;
pub mod status;
