//! Adapters for the external directory collaborators.

#![forbid(unsafe_code)]

mod in_memory_directory_repository;
mod rest_directory_repository;

pub use in_memory_directory_repository::InMemoryDirectoryRepository;
pub use rest_directory_repository::RestDirectoryRepository;
