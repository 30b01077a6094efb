//! Storage abstractions for service layer
//!
//! Contains the reusable file-backed document store shared by services that
//! persist a whole JSON document per write.

pub mod json_document_store;
