//! Test fixtures for cfdcase development.
//!
//! Provides ready-made case models for exercising the writer and the
//! analysis container: a complete valid case and a case with exactly one
//! missing required value.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{faces, rough_wall_missing_height, valid_case, ValidCase};
