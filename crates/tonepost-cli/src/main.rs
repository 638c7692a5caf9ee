use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use tonepost_core::{StyleRules, Tone};
use tonepost_llm::{ChatClient, EmbeddingClient};
use tonepost_pipeline::{
    CaptionPipeline, GenerationRequest, QuotaDecision, TodayContext,
};
use tonepost_retrieval::{ExemplarRetriever, QdrantClient};

#[derive(Debug, Parser)]
#[command(name = "tonepost-cli")]
#[command(about = "Tonepost command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one caption generation and print the payload as JSON.
    Generate {
        #[arg(long)]
        category: String,
        /// EMOTIONAL, CASUAL, or PROFESSIONAL.
        #[arg(long, value_parser = parse_tone)]
        tone: Tone,
        #[arg(long)]
        purpose: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        weather: Option<String>,
        #[arg(long)]
        inventory_status: Option<String>,
        #[arg(long)]
        customer_reaction: Option<String>,
        /// Also insert the result into the database.
        #[arg(long)]
        persist: bool,
    },
}

fn parse_tone(raw: &str) -> Result<Tone, String> {
    match raw.to_uppercase().as_str() {
        "EMOTIONAL" => Ok(Tone::Emotional),
        "CASUAL" => Ok(Tone::Casual),
        "PROFESSIONAL" => Ok(Tone::Professional),
        other => Err(format!(
            "unknown tone '{other}'; expected EMOTIONAL, CASUAL, or PROFESSIONAL"
        )),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            category,
            tone,
            purpose,
            content,
            weather,
            inventory_status,
            customer_reaction,
            persist,
        } => {
            let request = GenerationRequest {
                category,
                tone,
                purpose,
                content,
                today_context: Some(TodayContext {
                    weather,
                    inventory_status,
                    customer_reaction,
                }),
            };
            generate(request, persist).await
        }
    }
}

async fn generate(request: GenerationRequest, persist: bool) -> anyhow::Result<()> {
    let config = tonepost_core::load_app_config()?;
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
    let pipeline = CaptionPipeline::new(chat, retriever, rules, config.scoring.clone());

    // The CLI is an operator tool; it bypasses the upstream quota gate.
    let result = pipeline.run(&request, QuotaDecision::Allowed).await?;

    if persist {
        let pool_config = tonepost_db::PoolConfig {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        };
        let pool = tonepost_db::connect_pool(&config.database_url, pool_config).await?;
        tonepost_db::run_migrations(&pool).await?;
        let id = tonepost_db::insert_generated_post(
            &pool,
            &tonepost_db::NewGeneratedPost {
                category: &request.category,
                tone: request.tone.as_str(),
                purpose: &request.purpose,
                content: &request.content,
                caption: &result.caption,
                hashtags: &result.hashtags,
                story_phrases: &result.story_phrases,
                engagement_question: &result.engagement_question,
                score: Decimal::from_f32_retain(result.score).unwrap_or_default(),
                detected_tone: result.detected_tone.as_str(),
            },
        )
        .await?;
        eprintln!("persisted as generated_posts/{id}");
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
