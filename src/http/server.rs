//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the edge handler
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Rewrite each request to its tenant prefix
//! - Forward rewritten requests to the origin store
//! - Apply configuration updates without dropping connections

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        HeaderValue, Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::validation::validate_config;
use crate::config::{ConfigError, EdgeConfig, OriginConfig, ValidationError};
use crate::http::request::{apply_rewrite, request_id, MakeEdgeRequestId, X_FORWARDED_HOST};
use crate::http::response::{bad_gateway, strip_hop_by_hop};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::routing::{RewriteError, SubdomainRewriter};

/// Where rewritten requests are sent.
#[derive(Debug, Clone)]
pub struct Origin {
    pub authority: Authority,
    /// Host header presented to the origin.
    pub host: HeaderValue,
}

impl Origin {
    pub fn from_config(config: &OriginConfig) -> Result<Self, ValidationError> {
        let authority: Authority = config
            .address
            .parse()
            .map_err(|_| ValidationError::InvalidOriginAddress(config.address.clone()))?;

        let host_str = config.host_header.as_deref().unwrap_or(authority.as_str());
        let host = HeaderValue::from_str(host_str)
            .map_err(|_| ValidationError::InvalidOriginHost(host_str.to_string()))?;

        Ok(Self { authority, host })
    }

    /// Absolute origin URI for a rewritten request target.
    fn target(&self, uri: &Uri) -> Result<Uri, axum::http::uri::InvalidUriParts> {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        Uri::from_parts(parts)
    }

    /// Turn a rewritten client request into the request sent to the origin.
    pub fn forward_request(
        &self,
        request: Request<Body>,
        client_host: Option<&str>,
    ) -> Result<Request<Body>, RewriteError> {
        let (mut parts, body) = request.into_parts();

        parts.uri = self.target(&parts.uri).map_err(|_| RewriteError::InvalidPath {
            path: parts.uri.path().to_string(),
        })?;
        parts.version = Version::HTTP_11;

        strip_hop_by_hop(&mut parts.headers);
        parts.headers.insert(header::HOST, self.host.clone());
        if let Some(host) = client_host.and_then(|h| HeaderValue::from_str(h).ok()) {
            parts.headers.insert(X_FORWARDED_HOST, host);
        }

        Ok(Request::from_parts(parts, body))
    }
}

/// Live routing state, swapped as a whole on reload.
#[derive(Debug)]
pub struct EdgeState {
    pub rewriter: SubdomainRewriter,
    pub origin: Origin,
}

impl EdgeState {
    /// Validate `config` and build the state it describes.
    pub fn from_config(config: &EdgeConfig) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;
        let origin = Origin::from_config(&config.origin)
            .map_err(|e| ConfigError::Validation(vec![e]))?;

        Ok(Self {
            rewriter: SubdomainRewriter::new(config.rewrite.subdomain_base.clone()),
            origin,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub edge: Arc<ArcSwap<EdgeState>>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the edge node.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: EdgeConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: EdgeConfig) -> Result<Self, ConfigError> {
        let edge = EdgeState::from_config(&config)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            edge: Arc::new(ArcSwap::from_pointee(edge)),
            client,
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            state,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// A request that outlives `timeouts.request_secs` is answered with 504.
    fn build_router(config: &EdgeConfig, state: AppState) -> Router {
        Router::new()
            .fallback(edge_handler)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::GATEWAY_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeEdgeRequestId))
    }

    /// The fully layered router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Snapshot of the state requests are currently routed with.
    pub fn current(&self) -> Arc<EdgeState> {
        self.state.edge.load_full()
    }

    /// Get a reference to the startup config.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Serve until `shutdown` fires (or every `Shutdown` handle is dropped).
    ///
    /// Each config received on `config_updates` replaces the rewriter and
    /// origin; in-flight requests finish on the state they started with.
    /// Connect timeout and middleware settings are fixed at startup.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<EdgeConfig>,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            subdomain_base = %self.config.rewrite.subdomain_base,
            origin = %self.config.origin.address,
            "HTTP server starting"
        );

        let edge = self.state.edge.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match EdgeState::from_config(&config) {
                    Ok(next) => {
                        tracing::info!(
                            subdomain_base = %next.rewriter.base(),
                            origin = %next.origin.authority,
                            "Configuration applied"
                        );
                        edge.store(Arc::new(next));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Ignoring invalid configuration update");
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Rewrites the request to its tenant prefix and proxies it to the origin.
async fn edge_handler(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let start = Instant::now();
    let edge = state.edge.load_full();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();

    let routed = match apply_rewrite(&edge.rewriter, &mut request) {
        Ok(routed) => routed,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request rejected");
            metrics::record_rewrite(e.kind());
            return e.into_response();
        }
    };

    let origin_request = match edge.origin.forward_request(request, routed.host()) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request rejected");
            metrics::record_rewrite(e.kind());
            return e.into_response();
        }
    };
    metrics::record_rewrite("routed");

    match state.client.request(origin_request).await {
        Ok(response) => {
            let status = response.status();
            metrics::record_origin_response(method.as_str(), status.as_u16(), start);
            tracing::debug!(
                request_id = %request_id,
                uri = %routed.uri,
                status = %status,
                "Origin responded"
            );

            client_response(response)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                origin = %edge.origin.authority,
                error = %e,
                "Origin request failed"
            );
            metrics::record_origin_response(method.as_str(), 502, start);
            bad_gateway()
        }
    }
}

fn client_response(response: Response<hyper::body::Incoming>) -> Response {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
