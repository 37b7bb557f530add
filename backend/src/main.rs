use clap::Parser;
use oncf_backend::{AppState, config::Args, create_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oncf_backend=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let locator = args.locator().expect("load reference tables");
    let upstream = args.upstream();
    match &upstream {
        Some(client) => tracing::info!("using incident API at {}", client.base_url()),
        None => tracing::warn!("no incident API configured, /api/map/incidents is disabled"),
    }

    let app = create_router(AppState::new(locator, upstream));

    tracing::info!("starting backend on http://{}", args.bind);
    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .expect("bind listen address");
    axum::serve(listener, app).await.expect("serve HTTP");
}
