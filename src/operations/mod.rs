pub mod query;
pub mod surgery;
