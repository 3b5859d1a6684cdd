//! Client for the DMPonline data management plan service.
//!
//! DMPonline exposes two incompatible API generations. This crate fetches
//! plans from either one, normalizes both response shapes into flat
//! [`models::PlanRecord`]s, and classifies whether a plan declares handling of
//! personal data by looking up a template-specific question.

pub mod client;
pub mod config;
pub mod contacts;
pub mod models;
pub mod output;
pub mod overview;
pub mod plans;
pub mod statistics;
pub mod templates;
