#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filtering, pagination and statistics over in-memory case collections.
//!
//! Every function here is pure and total: inputs are borrowed, nothing
//! is mutated or persisted, and an empty collection simply produces
//! empty or zero-valued output. Functions accept any slice whose
//! elements borrow as [`Case`], so owned rows and the `Vec<&Case>`
//! returned by [`filter`] can be fed back in without cloning.
//!
//! The listing screen's caller obligations:
//!
//! - reset the page number to 1 whenever [`FilterCriteria`] change;
//! - re-order [`CategoryStats`] with [`sort_by_count_desc`] if it wants
//!   the busiest categories first.
//!
//! [`Case`]: case_catalog_case_models::Case
//! [`FilterCriteria`]: case_catalog_case_models::FilterCriteria
//! [`CategoryStats`]: case_catalog_case_models::CategoryStats

pub mod filter;
pub mod paginate;
pub mod stats;

pub use filter::filter;
pub use paginate::{page_info, paginate};
pub use stats::{aggregate_by_category, sort_by_count_desc, summarize, unlisted_categories};
