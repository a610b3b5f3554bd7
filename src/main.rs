//! paperd binary: wires configuration, the backend pool, the document
//! routes and the server together, and tears everything down on ctrl-c.
//!
//! The route handlers here are thin placeholders: they demonstrate the
//! pool checkout/release discipline and the request data shapes, while the
//! actual document storage logic lives outside this core.

use std::process::ExitCode;
use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use paperd::config::Config;
use paperd::handler::{HandlerError, handler_fn};
use paperd::pool::{Pool, TcpConnector};
use paperd::protocol::Request;
use paperd::protocol::response::{self, Response};
use paperd::router::Router;
use paperd::server::Server;

fn main() -> ExitCode {
    let config = Config::from_env();

    let level = if config.debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(cause = %e, "failed to build runtime");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(config))
}

async fn run(config: Config) -> ExitCode {
    let pool = Arc::new(Pool::new(TcpConnector::new(config.backend_addr.clone())));
    if let Err(e) = pool.initialize(config.pool_size).await {
        error!(cause = %e, "error initializing backend pool");
        return ExitCode::FAILURE;
    }

    let router = document_routes(Arc::clone(&pool));

    let server = match Server::builder().address(config.bind_address) {
        Ok(builder) => builder.router(router),
        Err(e) => {
            error!(cause = %e, "invalid bind address");
            pool.shutdown();
            return ExitCode::FAILURE;
        }
    };

    let server = match server.build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "incomplete server configuration");
            pool.shutdown();
            return ExitCode::FAILURE;
        }
    };

    let bound = match server.bind().await {
        Ok(bound) => bound,
        Err(e) => {
            error!(cause = %e, "bind server error");
            pool.shutdown();
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %config.bind_address, workers = config.worker_threads, "server starting");

    let handle = bound.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("shutting down server");
            handle.stop().await;
        }
    });

    bound.serve().await;
    pool.shutdown();
    ExitCode::SUCCESS
}

fn document_routes(pool: Arc<Pool<TcpConnector>>) -> Router {
    info!("registering document routes");

    let search_pool = Arc::clone(&pool);
    let get_pool = Arc::clone(&pool);
    let create_pool = Arc::clone(&pool);
    let delete_pool = pool;

    Router::builder()
        .route(
            "/api/documents/search",
            Method::GET,
            handler_fn(move |req: Request| {
                let pool = Arc::clone(&search_pool);
                async move { search_documents(pool, req).await }
            }),
        )
        .route(
            "/api/documents/{id}",
            Method::GET,
            handler_fn(move |req: Request| {
                let pool = Arc::clone(&get_pool);
                async move { get_document(pool, req).await }
            }),
        )
        .route(
            "/api/documents",
            Method::POST,
            handler_fn(move |req: Request| {
                let pool = Arc::clone(&create_pool);
                async move { create_document(pool, req).await }
            }),
        )
        .route(
            "/api/documents/{id}",
            Method::DELETE,
            handler_fn(move |req: Request| {
                let pool = Arc::clone(&delete_pool);
                async move { delete_document(pool, req).await }
            }),
        )
        .build()
}

async fn search_documents(pool: Arc<Pool<TcpConnector>>, req: Request) -> Result<Response, HandlerError> {
    let query = req.query();
    let Some(q) = query.get("q").filter(|q| !q.is_empty()) else {
        return Ok(response::json(StatusCode::BAD_REQUEST, r#"{"error": "query parameter 'q' is required"}"#));
    };
    let owner = query.get("owner").unwrap_or("");

    let conn = pool.acquire().await?;
    // the actual search runs against the checked-out connection, outside
    // this core
    pool.release(conn)?;

    let body = format!(r#"{{"query": "{q}", "owner": "{owner}", "results": []}}"#);
    Ok(response::json(StatusCode::OK, body.into_bytes()))
}

async fn get_document(pool: Arc<Pool<TcpConnector>>, req: Request) -> Result<Response, HandlerError> {
    let Some(id) = req.param("id").and_then(|id| id.parse::<u64>().ok()) else {
        return Ok(response::json(StatusCode::BAD_REQUEST, r#"{"error": "document id must be numeric"}"#));
    };

    let conn = pool.acquire().await?;
    pool.release(conn)?;

    let body = format!(r#"{{"id": {id}, "title": "", "content": ""}}"#);
    Ok(response::json(StatusCode::OK, body.into_bytes()))
}

async fn create_document(pool: Arc<Pool<TcpConnector>>, req: Request) -> Result<Response, HandlerError> {
    if req.body().is_empty() {
        return Ok(response::json(StatusCode::BAD_REQUEST, r#"{"error": "request body is required"}"#));
    }

    let conn = pool.acquire().await?;
    pool.release(conn)?;

    Ok(response::json(StatusCode::CREATED, r#"{"message": "Document created successfully"}"#))
}

async fn delete_document(pool: Arc<Pool<TcpConnector>>, req: Request) -> Result<Response, HandlerError> {
    let Some(id) = req.param("id").and_then(|id| id.parse::<u64>().ok()) else {
        return Ok(response::json(StatusCode::BAD_REQUEST, r#"{"error": "document id must be numeric"}"#));
    };

    let conn = pool.acquire().await?;
    pool.release(conn)?;

    let body = format!(r#"{{"deleted": {id}}}"#);
    Ok(response::json(StatusCode::OK, body.into_bytes()))
}
