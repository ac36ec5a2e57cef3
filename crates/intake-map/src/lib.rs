#![deny(unsafe_code)]

//! Row normalization for lead intake.
//!
//! Converts one raw source row into a [`CandidateRecord`] using the source's
//! column mappings and the transform library, collecting one validation
//! message per violated required mapping.
//!
//! [`CandidateRecord`]: intake_model::CandidateRecord

pub mod headers;
pub mod normalizer;

pub use headers::{missing_optional_headers, missing_required_headers};
pub use normalizer::{normalize, normalize_rows, required_field_message, row_identifier};
