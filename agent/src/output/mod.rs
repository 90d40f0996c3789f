//! Session outputs

pub mod chart;
pub mod json;
pub mod table;
