pub mod plan;
pub mod plot;
pub mod profile;
