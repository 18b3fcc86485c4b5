pub mod models;
pub mod schemas;
