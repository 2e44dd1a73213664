//! Middleware module
//!
//! Contains middleware shared by every route.

pub mod origin;
