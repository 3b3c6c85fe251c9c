//! HTTP server core implementation

use crate::config::{Config, ServerConfig};
use crate::monitoring::MonitoringSystem;
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{EngineError, Result};
use actix_web::{App, HttpServer as ActixHttpServer, middleware::DefaultHeaders, web};
use tracing::info;
use tracing_actix_web::TracingLogger;

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a server backed by the configured HTTP backend
    pub fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");
        let system = MonitoringSystem::from_config(&config.engine)?;
        Ok(Self::with_system(config, system))
    }

    /// Create a server around an existing engine
    pub fn with_system(config: &Config, system: MonitoringSystem) -> Self {
        Self {
            config: config.server().clone(),
            state: AppState::new(config.clone(), system),
        }
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                EngineError::validation(format!("invalid request body: {}", err)).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                EngineError::validation(format!("invalid query string: {}", err)).into()
            }))
            .wrap(TracingLogger::default())
            .wrap(DefaultHeaders::new().add(("Server", "platform-health")))
            .configure(routes::health::configure_routes)
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);
        let mut server = ActixHttpServer::new(move || Self::create_app(state.clone()));
        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }

        let server = server
            .bind(&bind_addr)
            .map_err(|e| EngineError::config(format!("failed to bind {}: {}", bind_addr, e)))?
            .run();

        info!("HTTP server listening on {}", bind_addr);
        server.await?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
