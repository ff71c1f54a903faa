// ABOUTME: Thin per-resource wrappers over the dispatcher
// ABOUTME: One module per backend resource

pub mod file_storage;
pub mod upload;
pub mod user;
