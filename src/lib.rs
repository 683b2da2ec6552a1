pub mod api;
pub mod config;
pub mod encryption;
pub mod errors;
pub mod format;
pub mod http;
pub mod logger;
pub mod models;
pub mod prefs;
pub mod redemption;
pub mod session;
pub mod validation;

use std::path::Path;
use std::sync::Arc;

use errors::AppError;
use http::ApiClient;
use prefs::PrefStore;
use session::SessionContext;

/// Wired-up client context — one per running dashboard instance.
///
/// Lifecycle: the session is populated at login, cleared at logout; the API
/// client reads and refreshes tokens only through it (no ambient storage
/// reads anywhere else).
pub struct AppContext {
    pub prefs: Arc<PrefStore>,
    pub session: SessionContext,
    pub api: ApiClient,
}

impl AppContext {
    /// Initialize config, logging, the preference store and the API client.
    ///
    /// `app_data_dir` holds the encrypted preference file and log files.
    pub fn init(app_data_dir: &Path) -> Result<Self, AppError> {
        // Local overrides from a .env file land in the environment before
        // the global config is built; absence is fine.
        let _ = config::AppConfig::load_from_file(&app_data_dir.join(".env"));

        let config = config::init_config();

        if let Err(e) = logger::init_global_logger(app_data_dir) {
            eprintln!("Warning: failed to initialize logger: {}", e);
        }

        log_info!("APP", "Client context starting", serde_json::json!({
            "version": config.version,
            "environment": config.environment.as_str(),
            "api_base_url": config.api.base_url,
        }));

        config.validate().map_err(AppError::Internal)?;

        let prefs = Arc::new(PrefStore::open(
            app_data_dir.join(&config.security.prefs_file),
        ));
        let session = SessionContext::new(Arc::clone(&prefs));
        let api = ApiClient::new(config, session.clone())?;

        Ok(Self { prefs, session, api })
    }
}
