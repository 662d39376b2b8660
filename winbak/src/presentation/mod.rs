pub mod cli;
pub mod summary;
