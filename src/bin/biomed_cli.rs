use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use biomed_assistant::{load_graph, AssistantConfig, BiomedicalRag};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "biomed-cli", about = "Biomedical Assistant - Disease and Symptom Information")]
struct Args {
    /// Dataset CSV file or directory of partitioned Parquet files
    #[arg(long)]
    data: Option<String>,
    /// Answer with the rule-based formatter only
    #[arg(long)]
    no_llm: bool,
    /// Skip embedding-based matching and use the relaxed fuzzy pass instead
    #[arg(long)]
    fuzzy_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("biomed_assistant=info".parse()?))
        .init();

    let args = Args::parse();
    let mut config = AssistantConfig::from_env();
    if let Some(data) = args.data {
        config.data_path = data;
    }
    if args.no_llm {
        config.llm_enabled = false;
    }
    if args.fuzzy_only {
        config.semantic_matching_enabled = false;
    }

    let graph = load_graph(&config.data_path)
        .with_context(|| format!("failed to load knowledge graph from {}", config.data_path))?;
    let stats = graph.stats();
    info!(
        "Graph ready: diseases={}, symptoms={}, edges={}",
        stats.diseases, stats.symptoms, stats.edges
    );

    let rag = BiomedicalRag::from_config(Arc::new(graph), &config);

    println!("Biomedical Assistant - Disease and Symptom Information");
    println!("Type 'exit' to quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\nEnter your question: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        let answer = rag.answer_query(query).await;
        println!("\nResponse:\n{answer}");
    }

    println!("Thank you for using the Biomedical Assistant!");
    Ok(())
}
