//! File-backed stores.

pub mod grade_store;
