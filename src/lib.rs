//! Feedback desk — reviewer comments attached to experiment pages.
//!
//! ARCHITECTURE
//! ============
//! `record` holds the data model shared by every layer. `store` is the seam
//! to the `feedbacks` document collection (in-memory, Postgres, or a remote
//! HTTP server). `routes` + `services` expose that collection over HTTP, and
//! `widget` is the host-agnostic UI component that reviewers interact with.

pub mod config;
pub mod db;
pub mod error;
pub mod record;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod widget;
