//! HTTP-layer extractors (C11, §4a).

pub mod auth;
