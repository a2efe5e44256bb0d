//! HTTP endpoints that render the skills and wave widgets
//!
//! The markdown for these widgets points at this server, so a README can embed
//! `![Skills](http://host/api/skills?...)` like any hosted card.

pub mod routes;
pub mod server;

pub use server::{router, ApiServer, ApiServerConfig};
