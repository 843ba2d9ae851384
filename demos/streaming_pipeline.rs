use futures::StreamExt;
use llm_workflow::{ChatModel, HttpTransport, PromptPipeline, PromptVars, TransportConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let endpoint = std::env::var("CHAT_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:31111/api/inference/v1/chat/completions".into());
    let api_key = std::env::var("API_KEY")?;

    let model = ChatModel::new(Arc::new(HttpTransport::new(
        TransportConfig::new(endpoint, "qwen3-235b").with_api_key(api_key),
    )))
    .with_temperature(0.4);

    let pipeline = PromptPipeline::new(
        model,
        "You are a professional translation assistant. Translate the user's text into English.",
        "{text}",
    );

    let vars = PromptVars::new().insert("text", "Ceci est un exemple de pipeline");

    let mut stream = pipeline.stream(&vars).await?;
    while let Some(fragment) = stream.next().await {
        print!("{}", fragment?);
    }
    println!();

    Ok(())
}
