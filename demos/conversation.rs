use llm_workflow::{ChatModel, ConversationWorkflow, HttpTransport, Message, TransportConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let endpoint = std::env::var("CHAT_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:31111/api/inference/v1/chat/completions".into());
    let api_key = std::env::var("API_KEY")?;

    let config = TransportConfig::new(endpoint, "qwen3-235b")
        .with_api_key(api_key)
        .with_max_tokens(1024);
    let model = ChatModel::new(Arc::new(HttpTransport::new(config)));

    let workflow = ConversationWorkflow::new(model)?;

    let state = workflow
        .run(vec![
            Message::system("You are a helpful assistant."),
            Message::user("Hello, world!"),
        ])
        .await?;

    println!("{}", state.last_content().unwrap_or_default());
    Ok(())
}
