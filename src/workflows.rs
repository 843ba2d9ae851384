//! Ready-made workflow graphs.
//!
//! Three graphs over a [`ChatModel`]:
//!
//! - [`ConversationWorkflow`]: a single chat node that answers the whole
//!   conversation.
//! - [`SimpleWorkflow`]: generate a reply, then summarize the exchange.
//! - [`DecisionWorkflow`]: classify the input, then route to an answering,
//!   translating, or summarizing node.
//!
//! Each `run` call owns a fresh state; workflows hold no state between
//! runs. `run_streaming` walks the same graph but streams every model
//! call, surfacing fragments through the supplied [`EventHandler`].

use crate::chat_model::ChatModel;
use crate::error::Result;
use crate::events::EventHandler;
use crate::graph::{ChatNode, CompiledGraph, GraphBuilder, RunCtx, Target, WorkflowState};
use crate::message::Message;
use std::sync::Arc;

const ASSISTANT_PROMPT: &str = "You are a helpful assistant.";
const SUMMARIZE_CONVERSATION_PROMPT: &str =
    "Summarize the following conversation, keeping it short and clear.";
const CLASSIFY_PROMPT: &str = "Classify the user input as one of the following types: \
question, translate, summarize. Reply with only the type name.";
const ANSWER_PROMPT: &str = "You are a helpful assistant. Answer the user's question.";
const TRANSLATE_PROMPT: &str = "Translate the user's text into English.";
const SUMMARIZE_TEXT_PROMPT: &str = "Summarize the user's text, keeping it short and clear.";

/// The closed set of branch keys the decision graph routes on.
///
/// Keys map one-to-one onto handler nodes; the mapping is built
/// exhaustively at graph construction, so a key can never name a missing
/// node. A classifier output outside this set surfaces as an
/// unhandled-branch error at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// A question to answer.
    Question,
    /// A translation request.
    Translate,
    /// A summarization request.
    Summarize,
}

impl Intent {
    /// Every intent, in routing order.
    pub const ALL: [Intent; 3] = [Intent::Question, Intent::Translate, Intent::Summarize];

    /// The branch key the classifier must produce for this intent.
    pub fn key(&self) -> &'static str {
        match self {
            Intent::Question => "question",
            Intent::Translate => "translate",
            Intent::Summarize => "summarize",
        }
    }

    /// The node that handles this intent.
    fn node_name(&self) -> &'static str {
        match self {
            Intent::Question => "answer_question",
            Intent::Translate => "translate",
            Intent::Summarize => "summarize",
        }
    }
}

/// Strip a leading request keyword (e.g. `translate:`) from user text.
///
/// Matching is case-insensitive and tolerates an optional colon. Text
/// without the keyword is returned unchanged.
fn strip_request_keyword(text: &str, keyword: &str) -> String {
    let trimmed = text.trim_start();
    if let Some(head) = trimmed.get(..keyword.len()) {
        if head.eq_ignore_ascii_case(keyword) {
            let rest = &trimmed[keyword.len()..];
            let rest = rest
                .strip_prefix(':')
                .or_else(|| rest.strip_prefix('：'))
                .unwrap_or(rest);
            return rest.trim_start().to_string();
        }
    }
    text.to_string()
}

/// Prepend a system prompt to a single user message.
fn prompted(system: &str, user_text: &str) -> Vec<Message> {
    vec![Message::system(system), Message::user(user_text)]
}

/// A single chat node answering the whole conversation.
///
/// Graph: chat → End.
pub struct ConversationWorkflow {
    graph: CompiledGraph,
}

impl ConversationWorkflow {
    /// Build the workflow over the given model.
    pub fn new(model: ChatModel) -> Result<Self> {
        let graph = GraphBuilder::new()
            .add_node(ChatNode::new("chat", model, |state| {
                state.messages.clone()
            }))
            .set_entry("chat")
            .add_edge("chat", Target::End)
            .compile()?;
        Ok(Self { graph })
    }

    /// Run the workflow over a conversation.
    pub async fn run(&self, messages: Vec<Message>) -> Result<WorkflowState> {
        self.graph.invoke(&RunCtx::new(), messages).await
    }

    /// Run the workflow, streaming model output through `handler`.
    pub async fn run_streaming(
        &self,
        messages: Vec<Message>,
        handler: Arc<dyn EventHandler>,
    ) -> Result<WorkflowState> {
        self.graph
            .invoke(&RunCtx::streaming(handler), messages)
            .await
    }
}

/// Generate a reply to the user, then summarize the exchange.
///
/// Graph: generate → summarize → End.
pub struct SimpleWorkflow {
    graph: CompiledGraph,
}

impl SimpleWorkflow {
    /// Build the workflow over the given model.
    pub fn new(model: ChatModel) -> Result<Self> {
        let graph = GraphBuilder::new()
            .add_node(ChatNode::new("generate", model.clone(), |state| {
                let latest = state.last_content().unwrap_or_default();
                prompted(ASSISTANT_PROMPT, latest)
            }))
            .add_node(ChatNode::new("summarize", model, |state| {
                prompted(SUMMARIZE_CONVERSATION_PROMPT, &state.joined_contents())
            }))
            .set_entry("generate")
            .add_edge("generate", "summarize")
            .add_edge("summarize", Target::End)
            .compile()?;
        Ok(Self { graph })
    }

    /// Run the workflow on one user input.
    pub async fn run(&self, user_input: impl Into<String>) -> Result<WorkflowState> {
        self.graph
            .invoke(&RunCtx::new(), vec![Message::user(user_input)])
            .await
    }

    /// Run the workflow, streaming model output through `handler`.
    pub async fn run_streaming(
        &self,
        user_input: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> Result<WorkflowState> {
        self.graph
            .invoke(
                &RunCtx::streaming(handler),
                vec![Message::user(user_input)],
            )
            .await
    }
}

/// Classify the input, then route to the matching handler node.
///
/// Graph: classify → {answer_question | translate | summarize} → End.
/// Routing matches the classifier's trimmed, lowercased output against the
/// [`Intent`] keys; anything else fails with an unhandled-branch error.
pub struct DecisionWorkflow {
    graph: CompiledGraph,
}

impl DecisionWorkflow {
    /// Build the workflow over the given model.
    pub fn new(model: ChatModel) -> Result<Self> {
        let mut builder = GraphBuilder::new()
            .add_node(ChatNode::new("classify", model.clone(), |state| {
                let latest = state.last_content().unwrap_or_default();
                prompted(CLASSIFY_PROMPT, latest)
            }))
            .add_node(ChatNode::new("answer_question", model.clone(), |state| {
                let original = state.first_content().unwrap_or_default();
                prompted(ANSWER_PROMPT, original)
            }))
            .add_node(ChatNode::new("translate", model.clone(), |state| {
                let original = state.first_content().unwrap_or_default();
                prompted(
                    TRANSLATE_PROMPT,
                    &strip_request_keyword(original, "translate"),
                )
            }))
            .add_node(ChatNode::new("summarize", model, |state| {
                let original = state.first_content().unwrap_or_default();
                prompted(
                    SUMMARIZE_TEXT_PROMPT,
                    &strip_request_keyword(original, "summarize"),
                )
            }))
            .set_entry("classify")
            .add_conditional_edges(
                "classify",
                Arc::new(|state: &WorkflowState| {
                    state
                        .last_content()
                        .unwrap_or_default()
                        .trim()
                        .to_lowercase()
                }),
                Intent::ALL.map(|intent| (intent.key(), Target::node(intent.node_name()))),
            );

        for intent in Intent::ALL {
            builder = builder.add_edge(intent.node_name(), Target::End);
        }

        Ok(Self {
            graph: builder.compile()?,
        })
    }

    /// Run the workflow on one user input.
    pub async fn run(&self, user_input: impl Into<String>) -> Result<WorkflowState> {
        self.graph
            .invoke(&RunCtx::new(), vec![Message::user(user_input)])
            .await
    }

    /// Run the workflow, streaming model output through `handler`.
    pub async fn run_streaming(
        &self,
        user_input: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> Result<WorkflowState> {
        self.graph
            .invoke(
                &RunCtx::streaming(handler),
                vec![Message::user(user_input)],
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkflowError;
    use crate::events::{Event, FnEventHandler};
    use crate::message::Role;
    use crate::transport::{ChatRequest, MockTransport};
    use std::sync::Mutex;

    /// Mock that echoes the last message content, prefixed.
    fn echo_mock() -> Arc<MockTransport> {
        Arc::new(MockTransport::respond_with(|req: &ChatRequest| {
            let last = req.messages.last().map(|m| m.content.as_str()).unwrap_or("");
            format!("ECHO:{}", last)
        }))
    }

    /// Mock for the decision graph: classifies with a fixed label, and
    /// marks which handler ran by its system prompt.
    fn decision_mock(classification: &'static str) -> Arc<MockTransport> {
        Arc::new(MockTransport::respond_with(move |req: &ChatRequest| {
            let system = req.messages.first().map(|m| m.content.as_str()).unwrap_or("");
            let last = req.messages.last().map(|m| m.content.as_str()).unwrap_or("");
            if system.starts_with("Classify") {
                classification.to_string()
            } else if system.starts_with("Translate") {
                format!("EN:{}", last)
            } else if system.starts_with("Summarize") {
                format!("SUM:{}", last)
            } else {
                format!("ANS:{}", last)
            }
        }))
    }

    #[tokio::test]
    async fn test_conversation_single_call() {
        let mock = echo_mock();
        let workflow = ConversationWorkflow::new(ChatModel::new(mock.clone())).unwrap();

        let state = workflow
            .run(vec![Message::user("Hello, world!")])
            .await
            .unwrap();

        assert_eq!(mock.call_count(), 1);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.last_content(), Some("ECHO:Hello, world!"));
        // The model saw the conversation verbatim.
        assert_eq!(mock.calls()[0].messages[0].content, "Hello, world!");
    }

    #[tokio::test]
    async fn test_simple_workflow_two_calls_in_order() {
        let mock = echo_mock();
        let workflow = SimpleWorkflow::new(ChatModel::new(mock.clone())).unwrap();

        let state = workflow.run("hello").await.unwrap();

        // Exactly two model calls: generate first, then summarize.
        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].messages[0].content, ASSISTANT_PROMPT);
        assert_eq!(calls[0].messages[1].content, "hello");
        assert_eq!(calls[1].messages[0].content, SUMMARIZE_CONVERSATION_PROMPT);

        // State: user input, generate's reply, summarize's reply.
        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.messages[1].content, "ECHO:hello");
        // The final message derives purely from the summarize call, which
        // saw the joined conversation.
        assert_eq!(state.last_content(), Some("ECHO:hello\nECHO:hello"));
        assert_eq!(state.messages[2].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_simple_workflow_rerun_is_identical() {
        let workflow = SimpleWorkflow::new(ChatModel::new(echo_mock())).unwrap();

        let first = workflow.run("hello").await.unwrap();
        let second = workflow.run("hello").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_decision_routes_question() {
        let workflow = DecisionWorkflow::new(ChatModel::new(decision_mock("question"))).unwrap();
        let state = workflow.run("What is a workflow graph?").await.unwrap();
        assert_eq!(
            state.last_content(),
            Some("ANS:What is a workflow graph?")
        );
    }

    #[tokio::test]
    async fn test_decision_routes_translate_and_strips_keyword() {
        let workflow = DecisionWorkflow::new(ChatModel::new(decision_mock("translate"))).unwrap();
        let state = workflow.run("translate: bonjour le monde").await.unwrap();
        assert_eq!(state.last_content(), Some("EN:bonjour le monde"));
    }

    #[tokio::test]
    async fn test_decision_routes_summarize_and_strips_keyword() {
        let workflow = DecisionWorkflow::new(ChatModel::new(decision_mock("summarize"))).unwrap();
        let state = workflow.run("Summarize: a long passage").await.unwrap();
        assert_eq!(state.last_content(), Some("SUM:a long passage"));
    }

    #[tokio::test]
    async fn test_decision_normalizes_classifier_output() {
        // Whitespace and case around the label are tolerated.
        let workflow = DecisionWorkflow::new(ChatModel::new(decision_mock(" Question \n"))).unwrap();
        let state = workflow.run("why?").await.unwrap();
        assert_eq!(state.last_content(), Some("ANS:why?"));
    }

    #[tokio::test]
    async fn test_decision_unknown_classification_fails() {
        let workflow = DecisionWorkflow::new(ChatModel::new(decision_mock("poetry"))).unwrap();
        let err = workflow.run("write me a poem").await.unwrap_err();
        match err {
            WorkflowError::UnhandledBranch { node, key } => {
                assert_eq!(node, "classify");
                assert_eq!(key, "poetry");
            }
            other => panic!("expected UnhandledBranch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_decision_handler_reads_original_input() {
        // The classifier's reply lands in the state, but the handler
        // prompts with the user's original text.
        let mock = decision_mock("question");
        let workflow = DecisionWorkflow::new(ChatModel::new(mock.clone())).unwrap();
        workflow.run("what is rust?").await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].messages[1].content, "what is rust?");
    }

    #[tokio::test]
    async fn test_streaming_run_surfaces_fragments_per_node() {
        let workflow = SimpleWorkflow::new(ChatModel::new(echo_mock())).unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let handler = Arc::new(FnEventHandler(move |event: Event| {
            sink.lock().unwrap().push(event);
        }));

        let state = workflow
            .run_streaming("hello there", handler)
            .await
            .unwrap();

        let events = events.lock().unwrap();
        let mut per_node: std::collections::HashMap<String, String> =
            std::collections::HashMap::new();
        for event in events.iter() {
            if let Event::Fragment { node, chunk } = event {
                per_node.entry(node.clone()).or_default().push_str(chunk);
            }
        }

        // Reassembled per-node text matches what landed in the state.
        assert_eq!(per_node["generate"], state.messages[1].content);
        assert_eq!(per_node["summarize"], state.messages[2].content);
    }

    #[tokio::test]
    async fn test_streaming_and_plain_runs_agree() {
        let workflow = SimpleWorkflow::new(ChatModel::new(echo_mock())).unwrap();
        let handler = Arc::new(FnEventHandler(|_event: Event| {}));

        let plain = workflow.run("hi").await.unwrap();
        let streamed = workflow.run_streaming("hi", handler).await.unwrap();
        assert_eq!(plain, streamed);
    }

    #[test]
    fn test_intent_keys_and_nodes() {
        assert_eq!(Intent::Question.key(), "question");
        assert_eq!(Intent::Translate.key(), "translate");
        assert_eq!(Intent::Summarize.key(), "summarize");
        assert_eq!(Intent::ALL.len(), 3);
    }

    #[test]
    fn test_strip_request_keyword() {
        assert_eq!(
            strip_request_keyword("translate: hello world", "translate"),
            "hello world"
        );
        assert_eq!(
            strip_request_keyword("Translate hello", "translate"),
            "hello"
        );
        assert_eq!(
            strip_request_keyword("summarize：the text", "summarize"),
            "the text"
        );
        assert_eq!(
            strip_request_keyword("no keyword here", "translate"),
            "no keyword here"
        );
        assert_eq!(strip_request_keyword("", "translate"), "");
    }
}
