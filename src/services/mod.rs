//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own validation and store calls so route handlers can stay
//! focused on protocol translation.

pub mod feedback;
