//! Application services and ports.

#![forbid(unsafe_code)]

mod directory_service;
mod municipality_service;

pub use directory_service::{
    CreateUserInput, DirectoryService, UpdateUserInput, UserDirectoryRepository,
};
pub use municipality_service::{MunicipalityRepository, MunicipalityService};
