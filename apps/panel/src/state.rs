use std::sync::Arc;

use crate::auth::TokenStore;
use crate::backend::ResumeBackend;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no document: the side panel sends it with every redline call.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Remote backend. `BackendClient` in production, swapped for a fake in tests.
    pub backend: Arc<dyn ResumeBackend>,
    pub tokens: TokenStore,
}

#[cfg(test)]
impl AppState {
    pub(crate) fn for_tests(
        backend: crate::backend::testing::FakeBackend,
        demo_mode: bool,
    ) -> (Self, Arc<crate::backend::testing::FakeBackend>) {
        use std::path::PathBuf;
        use std::time::Duration;

        use crate::environment::{BackendMode, HostEnvironment};

        let backend = Arc::new(backend);
        let config = Config {
            port: 0,
            rust_log: "debug".to_string(),
            backend_url: None,
            backend_mode: BackendMode::Local,
            host_environment: HostEnvironment::Web,
            demo_mode,
            token_store_path: PathBuf::from("unused.json"),
            short_timeout: Duration::from_secs(30),
            long_timeout: Duration::from_secs(150),
            retry_delay: Duration::from_millis(10),
            max_retries: 1,
        };
        let state = Self {
            config,
            backend: backend.clone(),
            tokens: TokenStore::in_memory(),
        };
        (state, backend)
    }
}
