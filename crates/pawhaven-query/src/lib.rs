#![forbid(unsafe_code)]
//! Request-scoped catalog queries: the filter evaluator, display sorting, and
//! the similar-pet selection used by detail views. Everything here is a pure
//! function over in-memory collections; nothing touches a store.

mod filters;
mod sort;

pub use filters::{filter_pets, FilterCriteria, ALL_BREEDS};
pub use sort::{similar_pets, sort_pets, SortOrder};

pub const CRATE_NAME: &str = "pawhaven-query";
