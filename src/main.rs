//! Topic Flow server.
//!
//! Loads configuration and schema bundles, wires the engine to the chosen
//! model provider and session store, and serves the intake API.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use topic_flow::adapters::ai::{
    AnthropicConfig, AnthropicProvider, MockAIProvider, OpenAIConfig, OpenAIProvider,
};
use topic_flow::adapters::document::{DocxSummaryRenderer, MarkdownSummaryRenderer};
use topic_flow::adapters::http::{api_router, IntakeHandlers};
use topic_flow::adapters::schema::SchemaCatalog;
use topic_flow::adapters::storage::{FileSessionStore, InMemorySessionStore};
use topic_flow::config::{
    AiConfig, AiProvider, AppConfig, ServerConfig, StorageBackend, SummaryFormat,
};
use topic_flow::domain::engine::TopicGraphEngine;
use topic_flow::ports::{
    AIError, AIProvider as ModelProvider, SchemaProvider, SessionStore, SummaryRenderer,
};

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);
    if server.use_json_logs() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_provider(ai: &AiConfig) -> Result<Arc<dyn ModelProvider>, AIError> {
    use secrecy::ExposeSecret;

    let key = |k: &Option<secrecy::Secret<String>>| {
        k.as_ref()
            .map(|s| s.expose_secret().clone())
            .unwrap_or_default()
    };

    let provider: Arc<dyn ModelProvider> = match ai.provider {
        AiProvider::OpenAI => {
            let mut config = OpenAIConfig::new(key(&ai.openai_api_key))
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            if let Some(model) = &ai.model {
                config = config.with_model(model);
            }
            if let Some(url) = &ai.base_url {
                config = config.with_base_url(url);
            }
            Arc::new(OpenAIProvider::new(config)?)
        }
        AiProvider::Anthropic => {
            let mut config = AnthropicConfig::new(key(&ai.anthropic_api_key))
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            if let Some(model) = &ai.model {
                config = config.with_model(model);
            }
            if let Some(url) = &ai.base_url {
                config = config.with_base_url(url);
            }
            Arc::new(AnthropicProvider::new(config)?)
        }
        AiProvider::Mock => {
            tracing::warn!("using mock AI provider; replies are canned");
            Arc::new(MockAIProvider::new())
        }
    };
    Ok(provider)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        provider = ?config.ai.provider,
        storage = ?config.storage.backend,
        summary_format = ?config.document.format,
        "starting topic-flow"
    );

    let schemas = SchemaCatalog::load_dir(
        &config.engine.schema_dir,
        config.engine.default_schema.as_deref(),
    )
    .await?;
    tracing::info!(
        schemas = ?schemas.list().await,
        active = %schemas.active_name().await,
        "schema catalog ready"
    );

    let store: Arc<dyn SessionStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemorySessionStore::new()),
        StorageBackend::File => Arc::new(FileSessionStore::new(&config.storage.session_dir)),
    };

    let provider = build_provider(&config.ai)?;
    let info = provider.provider_info();
    tracing::info!(provider = %info.name, model = %info.model, "model provider ready");

    let renderer: Arc<dyn SummaryRenderer> = match config.document.format {
        SummaryFormat::Docx => Arc::new(DocxSummaryRenderer::new()),
        SummaryFormat::Markdown => Arc::new(MarkdownSummaryRenderer::new()),
    };

    let engine = Arc::new(TopicGraphEngine::new(provider, config.engine.settings()));
    let handlers = IntakeHandlers::new(store, Arc::new(schemas), engine, renderer);

    let app = api_router(handlers, config.server.request_timeout());
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
