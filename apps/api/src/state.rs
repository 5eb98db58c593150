use crate::bundle::DocumentBundler;
use crate::config::Config;
use crate::directory::DirectoryClient;
use crate::verify::VerifyClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub directory: DirectoryClient,
    pub verify: VerifyClient,
    pub bundler: DocumentBundler,
}
