//! Thin HTTP proxy in front of the Veo video generation API.
//!
//! The browser-facing surface: an upload relay, a job starter, a status
//! endpoint, a blocking wait that redirects to the download route, and the
//! download relay itself. All provider interaction goes through
//! [`veoproxy_core::VeoClient`]; this crate only maps HTTP requests onto it
//! and client errors back onto HTTP status codes.

pub mod routes;

pub use routes::{build_router, ApiState};
