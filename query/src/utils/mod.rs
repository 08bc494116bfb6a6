//! Utility functions shared by the definition and the stores

pub mod inflect;
pub mod sql;
