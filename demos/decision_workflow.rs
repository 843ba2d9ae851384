use llm_workflow::{ChatModel, DecisionWorkflow, HttpTransport, TransportConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let endpoint = std::env::var("CHAT_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:31111/api/inference/v1/chat/completions".into());
    let api_key = std::env::var("API_KEY")?;

    let model = ChatModel::new(Arc::new(HttpTransport::new(
        TransportConfig::new(endpoint, "qwen3-235b").with_api_key(api_key),
    )));

    let workflow = DecisionWorkflow::new(model)?;

    for input in [
        "What is a workflow graph?",
        "translate: this is an example sentence",
        "summarize: Workflow graphs route a conversation through named \
         processing nodes. Each node extends the running message list, and \
         a classifier can pick between branches before the run ends.",
    ] {
        println!("> {}", input);
        let state = workflow.run(input).await?;
        println!("{}\n", state.last_content().unwrap_or_default());
    }

    Ok(())
}
