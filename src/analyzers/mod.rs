//! Sales aggregation queries.
//!
//! This module groups derived sales records by calendar, location and
//! product keys, ranks products, and measures month-over-month growth. The
//! results are collected into a single [`types::SalesReport`].

pub mod aggregate;
pub mod analyzer;
pub mod growth;
pub mod types;
pub mod utility;
