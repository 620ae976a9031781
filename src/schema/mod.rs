// src/schema/mod.rs

pub mod ddl;
pub mod graph;
pub mod specs;

pub use specs::{spec_for, validate_specs, TableSpec, TABLE_SPECS};
