use bayan_application::{DirectoryService, MunicipalityService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub directory_service: DirectoryService,
    pub municipality_service: MunicipalityService,
    pub frontend_url: String,
}
