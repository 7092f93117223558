//! Contact inquiry intake for the S&G Global Advisors website.
//!
//! A submission is validated, written to the inquiry store, and then announced by
//! e-mail on a best-effort basis. Only validation and storage outcomes reach the caller.

pub mod config;
pub mod error;
pub mod inquiries;
pub mod telemetry;
