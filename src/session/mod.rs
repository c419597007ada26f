//! Client-side session persistence for the password overlay.

pub mod backend;
pub mod store;
