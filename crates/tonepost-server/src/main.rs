mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tonepost_core::StyleRules;
use tonepost_llm::{ChatClient, EmbeddingClient};
use tonepost_pipeline::CaptionPipeline;
use tonepost_retrieval::{ExemplarRetriever, QdrantClient};

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(tonepost_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = tonepost_db::PoolConfig {
        max_connections: config.db_max_connections,
        min_connections: config.db_min_connections,
        acquire_timeout_secs: config.db_acquire_timeout_secs,
    };
    let pool = tonepost_db::connect_pool(&config.database_url, pool_config).await?;
    tonepost_db::run_migrations(&pool).await?;

    let rules = Arc::new(StyleRules::load(config.style_rules_path.as_deref())?);

    let chat = ChatClient::new(
        &config.llm_base_url,
        &config.llm_api_key,
        &config.llm_model,
        config.llm_timeout_secs,
        config.llm_max_tokens,
    )?;
    let retriever = ExemplarRetriever::new(
        EmbeddingClient::new(&config.embedding_url, config.embedding_timeout_secs)?,
        QdrantClient::new(&config.qdrant_url, &config.qdrant_collection),
        Arc::clone(&rules),
        config.ranking.clone(),
    );
    let pipeline = Arc::new(CaptionPipeline::new(
        chat,
        retriever,
        rules,
        config.scoring.clone(),
    ));

    let app = build_app(AppState { pool, pipeline });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "tonepost server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
