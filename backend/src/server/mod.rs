//! Server construction and adapter wiring.

mod settings;

pub use settings::ServerSettings;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tracing::info;

use records_backend::Trace;
use records_backend::domain::ports::{CommitBatchRepository, RecordStore};
use records_backend::domain::{BatchRollbackService, RecordTables};
use records_backend::inbound::http::commit_batches::{list_commit_batches, rollback_commit_batch};
use records_backend::inbound::http::state::HttpState;
use records_backend::outbound::memory::{InMemoryCommitBatchRepository, InMemoryRecordStore};
use records_backend::outbound::persistence::{DbPool, DieselCommitBatchRepository, DieselRecordStore};

/// Build handler state from settings.
///
/// Uses the Diesel adapters when a database URL is configured, otherwise
/// falls back to empty in-memory adapters for local runs.
///
/// # Errors
/// Returns [`std::io::Error`] when the connection pool cannot be built.
pub async fn build_http_state(settings: &ServerSettings) -> std::io::Result<HttpState> {
    let record_tables = settings.record_tables();
    let tables: Vec<&str> = record_tables.iter().map(|table| table.as_str()).collect();

    match settings.pool_config() {
        Some(config) => {
            let pool = DbPool::new(config)
                .await
                .map_err(|err| std::io::Error::other(err.to_string()))?;
            info!(record_tables = ?tables, "using PostgreSQL adapters");
            Ok(service_state(
                DieselCommitBatchRepository::new(pool.clone()),
                DieselRecordStore::new(pool),
                record_tables,
            ))
        }
        None => {
            info!(record_tables = ?tables, "no database configured; using in-memory adapters");
            Ok(service_state(
                InMemoryCommitBatchRepository::new(),
                InMemoryRecordStore::new(),
                record_tables,
            ))
        }
    }
}

fn service_state<B, S>(batches: B, records: S, record_tables: RecordTables) -> HttpState
where
    B: CommitBatchRepository + 'static,
    S: RecordStore + 'static,
{
    HttpState::from_service(Arc::new(BatchRollbackService::new(
        Arc::new(batches),
        Arc::new(records),
        record_tables,
        Arc::new(DefaultClock),
    )))
}

fn build_app(
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api")
        .service(list_commit_batches)
        .service(rollback_commit_batch);

    App::new().app_data(http_state).wrap(Trace).service(api)
}

/// Construct an Actix HTTP server for the given settings.
///
/// # Errors
/// Propagates [`std::io::Error`] when building adapters or binding fails.
pub async fn create_server(settings: &ServerSettings) -> std::io::Result<Server> {
    let bind_addr = settings.bind_addr()?;
    let http_state = web::Data::new(build_http_state(settings).await?);

    let server = HttpServer::new(move || build_app(http_state.clone()))
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "records backend listening");
    Ok(server)
}
