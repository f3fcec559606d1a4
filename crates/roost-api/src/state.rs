use roost_core::Config;
use roost_services::TwitterProxy;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub proxy: TwitterProxy,
    pub config: Config,
}

impl AppState {
    pub fn new(proxy: TwitterProxy, config: Config) -> Self {
        Self { proxy, config }
    }
}
