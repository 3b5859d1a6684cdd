//! Domain models for DMPonline plans.
//!
//! # Raw responses
//!
//! - [`RawPlan`]: a v0 plan object, typed down to the answer tree
//!   ([`PlanContent`] → [`Section`] → [`Question`] → [`Answer`]).
//!
//! # Normalized records
//!
//! - [`PlanRecord`]: one plan reshaped into a flat, tabular record, whichever
//!   [`ApiGeneration`] it came from.
//! - [`FlatRow`]: a JSON object flattened to dotted column names.

mod content;
mod flatten;
mod generation;
mod plan;
mod timestamp;

pub use content::*;
pub use flatten::*;
pub use generation::*;
pub use plan::*;
pub use timestamp::*;
