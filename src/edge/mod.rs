//! Edge request gate: Basic auth and bot filtering ahead of the application.

pub mod classify;
pub mod credentials;
pub mod gate;
pub mod paths;
