//! Applicant intake backend for the ONGC internship programme.
//!
//! The crate owns the applicant records, the staff accounts that review them, the bilingual
//! application form generator and the outbound email pipeline. The HTTP binary in
//! `services/api` wires these pieces into a server.

pub mod applicants;
pub mod auth;
pub mod config;
pub mod error;
pub mod forms;
pub mod mail;
pub mod telemetry;
