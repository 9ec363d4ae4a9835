//! Serving resource routers with the standard middleware stack

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{config::Config, error::Result};

/// Binds the configured port and serves a router
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the server with the given router until SIGINT or SIGTERM
    pub async fn serve(self, app: Router) -> Result<()> {
        let addr = self.config.bind_address();

        tracing::info!(
            timeout_secs = self.config.service.timeout_secs,
            default_per_page = self.config.resources.default_per_page,
            max_per_page = self.config.resources.max_per_page,
            expose_internal_errors = self.config.resources.expose_internal_errors,
            service = %self.config.service.name,
            environment = %self.config.service.environment,
            "serving resources"
        );

        let app = Self::with_layers(app, &self.config);

        let listener = TcpListener::bind(&addr).await?;

        tracing::info!(%addr, "listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("stopped");

        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // Layers are applied bottom-up: panic recovery is innermost
    fn with_layers(app: Router, config: &Config) -> Router {
        app.layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            config.service.timeout(),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CatchPanicLayer::new())
    }
}

/// Resolves on the first of SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(%err, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!(signal = "SIGINT", "shutting down");
        },
        _ = terminate => {
            tracing::info!(signal = "SIGTERM", "shutting down");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get};
    use tower::ServiceExt; // for oneshot

    #[test]
    fn server_keeps_its_config() {
        let mut config = Config::default();
        config.service.port = 9191;
        assert_eq!(Server::new(config).config().service.port, 9191);
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_500() {
        async fn boom() -> &'static str {
            panic!("handler exploded")
        }

        let app = Router::new().route("/boom", get(boom));
        let app = Server::with_layers(app, &Config::default());

        let request = Request::builder().uri("/boom").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
