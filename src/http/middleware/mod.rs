//! Request/response middleware applied around the entry point.

pub mod cors;
pub mod request_id;
