//! Observation hooks for graph execution.
//!
//! A run can carry an optional [`EventHandler`]; the executor and chat
//! nodes report node lifecycle and streamed fragments through it. Useful
//! for progress display, logging, or forwarding fragments to a UI while a
//! workflow is still running.

/// Events emitted during graph execution.
#[derive(Debug, Clone)]
pub enum Event {
    /// A node has started executing.
    NodeStart {
        /// Name of the node.
        name: String,
    },
    /// A text fragment arrived while a node's model call was streaming.
    Fragment {
        /// Name of the node producing this fragment.
        node: String,
        /// The fragment text.
        chunk: String,
    },
    /// A node has finished executing.
    NodeEnd {
        /// Name of the node.
        name: String,
        /// Whether execution succeeded.
        ok: bool,
    },
}

/// Receives [`Event`]s during a graph run.
///
/// Handlers are optional; a run without one skips emission entirely. A
/// handler may be called from whatever task drives the run, so it must be
/// `Send + Sync` and should return quickly.
///
/// # Example
///
/// ```
/// use llm_workflow::events::{Event, EventHandler};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: Event) {
///         match event {
///             Event::Fragment { chunk, .. } => print!("{}", chunk),
///             Event::NodeStart { name } => println!("[start] {}", name),
///             Event::NodeEnd { name, ok } => println!("[end] {} ok={}", name, ok),
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called once per emitted event.
    fn on_event(&self, event: Event);
}

/// Adapter turning a closure into an [`EventHandler`].
///
/// # Example
///
/// ```
/// use llm_workflow::events::{Event, FnEventHandler};
/// use std::sync::Arc;
///
/// let handler = Arc::new(FnEventHandler(|event: Event| {
///     if let Event::Fragment { chunk, .. } = event {
///         print!("{}", chunk);
///     }
/// }));
/// ```
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}
