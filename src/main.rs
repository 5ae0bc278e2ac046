use std::{process, sync::Arc};

use halide::{
    application::{
        error::AppError,
        feed::FeedService,
        forms::{FormService, MemoryStore},
        search::SearchService,
    },
    config::{self, ContentBackend},
    infra::{
        content::{ContentRepo, HostedContentClient, MemoryContentRepo},
        error::InfraError,
        http::{AppState, build_router},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    let content: Arc<dyn ContentRepo> = match settings.content.backend {
        ContentBackend::Hosted => Arc::new(HostedContentClient::new(&settings.content)?),
        ContentBackend::Demo => {
            info!(target = "halide::startup", "serving built-in demo content");
            Arc::new(MemoryContentRepo::demo())
        }
    };

    let feed = Arc::new(FeedService::new(
        content.clone(),
        settings.feed.page_size,
        settings.feed.backfill_year,
    ));
    let search = Arc::new(SearchService::new(content.clone()));
    let forms = Arc::new(FormService::new(Arc::new(MemoryStore::default())));

    let state = AppState {
        feed,
        search,
        forms,
        content,
        site: settings.site.clone(),
    };

    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;
    info!(
        target = "halide::startup",
        addr = %settings.server.addr,
        "listening",
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install shutdown handler");
        return;
    }
    info!(target = "halide::startup", "shutdown signal received");
}
