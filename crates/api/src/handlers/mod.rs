//! HTTP handlers (C11, §4a, §6a). Each module maps to one route family and
//! translates a request into the corresponding `Engine` call.

pub mod attempts;
pub mod health;
pub mod progress;
pub mod questions;
pub mod sessions;
pub mod subtopics;
