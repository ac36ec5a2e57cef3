//! Normalization functions for lead intake values.
//!
//! - **text**: whitespace trimming and case folding
//! - **phone**: digit extraction and the comparable phone key
//! - **numeric**: leading integer parsing for quantity fields

pub mod numeric;
pub mod phone;
pub mod text;

pub use numeric::parse_leading_int;
pub use phone::{PHONE_KEY_DIGITS, normalize_phone};
pub use text::{lower_case, title_case, trim};
