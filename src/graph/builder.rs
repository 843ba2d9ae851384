//! Graph declaration and compile-time validation.

use crate::error::{Result, WorkflowError};
use crate::graph::executor::CompiledGraph;
use crate::graph::node::Node;
use crate::graph::state::WorkflowState;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Where an edge leads: a named node, or the end of the run.
///
/// `End` is a marker, not a node; reaching it returns the final state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Transition to the named node.
    Node(String),
    /// Terminate the run and return the state.
    End,
}

impl Target {
    /// Target the named node.
    pub fn node(name: impl Into<String>) -> Self {
        Target::Node(name.into())
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::Node(name.to_string())
    }
}

/// Computes a branch-selection key from the current state.
///
/// Evaluated after the source node's update has been applied.
pub type ClassifierFn = Arc<dyn Fn(&WorkflowState) -> String + Send + Sync>;

/// Outgoing route from one node.
pub(crate) enum Route {
    /// Single unconditional edge.
    Direct(Target),
    /// Conditional edge: classifier output selects a branch.
    Conditional {
        classifier: ClassifierFn,
        branches: BTreeMap<String, Target>,
    },
}

impl Route {
    fn targets(&self) -> Vec<&Target> {
        match self {
            Route::Direct(t) => vec![t],
            Route::Conditional { branches, .. } => branches.values().collect(),
        }
    }
}

/// Builder for a workflow graph.
///
/// Register nodes and edges, declare the entry point, then
/// [`compile`](Self::compile) into an executable [`CompiledGraph`].
/// Validation is front-loaded: unknown targets, missing routes, duplicate
/// declarations, and cycles are all [`WorkflowError::InvalidGraph`] at
/// compile time, not runtime surprises.
///
/// # Example
///
/// ```
/// use llm_workflow::graph::{GraphBuilder, Target};
/// # use llm_workflow::graph::{ChatNode};
/// # use llm_workflow::chat_model::ChatModel;
/// # use llm_workflow::transport::MockTransport;
/// # use std::sync::Arc;
///
/// # let model = ChatModel::new(Arc::new(MockTransport::fixed("x")));
/// let graph = GraphBuilder::new()
///     .add_node(ChatNode::new("chat", model, |state| state.messages.clone()))
///     .set_entry("chat")
///     .add_edge("chat", Target::End)
///     .compile()
///     .unwrap();
/// ```
#[derive(Default)]
pub struct GraphBuilder {
    nodes: HashMap<String, Arc<dyn Node>>,
    routes: HashMap<String, Route>,
    entry: Option<String>,
    problems: Vec<String>,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node under its own name.
    pub fn add_node(mut self, node: impl Node + 'static) -> Self {
        let name = node.name().to_string();
        if self.nodes.insert(name.clone(), Arc::new(node)).is_some() {
            self.problems.push(format!("duplicate node '{}'", name));
        }
        self
    }

    /// Declare the entry node.
    pub fn set_entry(mut self, name: impl Into<String>) -> Self {
        self.entry = Some(name.into());
        self
    }

    /// Add an unconditional edge.
    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<Target>) -> Self {
        let from = from.into();
        if self
            .routes
            .insert(from.clone(), Route::Direct(to.into()))
            .is_some()
        {
            self.problems
                .push(format!("node '{}' already has an outgoing edge", from));
        }
        self
    }

    /// Add a conditional edge: the classifier's key selects a branch.
    ///
    /// A run-time key with no matching branch is an
    /// [`WorkflowError::UnhandledBranch`]; there is no default fallback.
    pub fn add_conditional_edges<K, T>(
        mut self,
        from: impl Into<String>,
        classifier: ClassifierFn,
        branches: impl IntoIterator<Item = (K, T)>,
    ) -> Self
    where
        K: Into<String>,
        T: Into<Target>,
    {
        let from = from.into();
        let branches: BTreeMap<String, Target> = branches
            .into_iter()
            .map(|(k, t)| (k.into(), t.into()))
            .collect();
        if branches.is_empty() {
            self.problems
                .push(format!("node '{}' has a conditional edge with no branches", from));
        }
        if self
            .routes
            .insert(
                from.clone(),
                Route::Conditional {
                    classifier,
                    branches,
                },
            )
            .is_some()
        {
            self.problems
                .push(format!("node '{}' already has an outgoing edge", from));
        }
        self
    }

    /// Validate the declaration and freeze it into an executable graph.
    pub fn compile(self) -> Result<CompiledGraph> {
        let mut problems = self.problems;

        let entry = match &self.entry {
            Some(name) => {
                if !self.nodes.contains_key(name) {
                    problems.push(format!("entry node '{}' is not registered", name));
                }
                name.clone()
            }
            None => {
                problems.push("no entry node declared".to_string());
                String::new()
            }
        };

        for (from, route) in &self.routes {
            if !self.nodes.contains_key(from) {
                problems.push(format!("edge from unknown node '{}'", from));
            }
            for target in route.targets() {
                if let Target::Node(name) = target {
                    if !self.nodes.contains_key(name) {
                        problems.push(format!(
                            "edge from '{}' targets unknown node '{}'",
                            from, name
                        ));
                    }
                }
            }
        }

        for name in self.nodes.keys() {
            if !self.routes.contains_key(name) {
                problems.push(format!("node '{}' has no outgoing edge", name));
            }
        }

        if problems.is_empty() {
            if let Some(cycle_node) = find_cycle(&self.routes) {
                problems.push(format!("cycle detected through node '{}'", cycle_node));
            }
        }

        if !problems.is_empty() {
            problems.sort();
            return Err(WorkflowError::InvalidGraph(problems.join("; ")));
        }

        Ok(CompiledGraph::new(self.nodes, self.routes, entry))
    }
}

/// Depth-first cycle check over all declared routes.
///
/// Returns a node on a cycle, or `None` if the graph is acyclic.
fn find_cycle(routes: &HashMap<String, Route>) -> Option<String> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    let mut marks: HashMap<&str, Mark> = HashMap::new();

    fn visit<'a>(
        node: &'a str,
        routes: &'a HashMap<String, Route>,
        marks: &mut HashMap<&'a str, Mark>,
    ) -> Option<String> {
        match marks.get(node) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => return Some(node.to_string()),
            None => {}
        }
        marks.insert(node, Mark::Visiting);
        if let Some(route) = routes.get(node) {
            for target in route.targets() {
                if let Target::Node(next) = target {
                    if let Some(found) = visit(next, routes, marks) {
                        return Some(found);
                    }
                }
            }
        }
        marks.insert(node, Mark::Done);
        None
    }

    let mut names: Vec<&String> = routes.keys().collect();
    names.sort();
    for name in names {
        if let Some(found) = visit(name, routes, &mut marks) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::{BoxFut, RunCtx};
    use crate::message::Message;

    /// Test node that appends one fixed message.
    struct StaticNode {
        name: String,
        text: String,
    }

    impl StaticNode {
        fn new(name: &str, text: &str) -> Self {
            Self {
                name: name.into(),
                text: text.into(),
            }
        }
    }

    impl Node for StaticNode {
        fn name(&self) -> &str {
            &self.name
        }

        fn run<'a>(
            &'a self,
            _ctx: &'a RunCtx,
            _state: &'a WorkflowState,
        ) -> BoxFut<'a, Result<Vec<Message>>> {
            let text = self.text.clone();
            Box::pin(async move { Ok(vec![Message::assistant(text)]) })
        }
    }

    fn classify_last() -> ClassifierFn {
        Arc::new(|state: &WorkflowState| {
            state.last_content().unwrap_or_default().to_string()
        })
    }

    #[test]
    fn test_compile_linear_graph() {
        let graph = GraphBuilder::new()
            .add_node(StaticNode::new("a", "1"))
            .add_node(StaticNode::new("b", "2"))
            .set_entry("a")
            .add_edge("a", "b")
            .add_edge("b", Target::End)
            .compile();
        assert!(graph.is_ok());
    }

    #[test]
    fn test_compile_requires_entry() {
        let err = GraphBuilder::new()
            .add_node(StaticNode::new("a", "1"))
            .add_edge("a", Target::End)
            .compile()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidGraph(m) if m.contains("no entry node")));
    }

    #[test]
    fn test_compile_rejects_unknown_entry() {
        let err = GraphBuilder::new()
            .add_node(StaticNode::new("a", "1"))
            .set_entry("missing")
            .add_edge("a", Target::End)
            .compile()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidGraph(m) if m.contains("entry node")));
    }

    #[test]
    fn test_compile_rejects_unknown_edge_target() {
        let err = GraphBuilder::new()
            .add_node(StaticNode::new("a", "1"))
            .set_entry("a")
            .add_edge("a", "ghost")
            .compile()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidGraph(m) if m.contains("ghost")));
    }

    #[test]
    fn test_compile_rejects_node_without_route() {
        let err = GraphBuilder::new()
            .add_node(StaticNode::new("a", "1"))
            .add_node(StaticNode::new("b", "2"))
            .set_entry("a")
            .add_edge("a", Target::End)
            .compile()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidGraph(m) if m.contains("'b' has no outgoing edge")));
    }

    #[test]
    fn test_compile_rejects_duplicate_node() {
        let err = GraphBuilder::new()
            .add_node(StaticNode::new("a", "1"))
            .add_node(StaticNode::new("a", "2"))
            .set_entry("a")
            .add_edge("a", Target::End)
            .compile()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidGraph(m) if m.contains("duplicate node 'a'")));
    }

    #[test]
    fn test_compile_rejects_second_route_from_same_node() {
        let err = GraphBuilder::new()
            .add_node(StaticNode::new("a", "1"))
            .set_entry("a")
            .add_edge("a", Target::End)
            .add_edge("a", Target::End)
            .compile()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidGraph(m) if m.contains("already has an outgoing edge")));
    }

    #[test]
    fn test_compile_rejects_cycle() {
        let err = GraphBuilder::new()
            .add_node(StaticNode::new("a", "1"))
            .add_node(StaticNode::new("b", "2"))
            .set_entry("a")
            .add_edge("a", "b")
            .add_edge("b", "a")
            .compile()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidGraph(m) if m.contains("cycle")));
    }

    #[test]
    fn test_compile_rejects_cycle_through_conditional_branch() {
        let err = GraphBuilder::new()
            .add_node(StaticNode::new("a", "1"))
            .add_node(StaticNode::new("b", "2"))
            .set_entry("a")
            .add_conditional_edges(
                "a",
                classify_last(),
                [("left", Target::node("b")), ("done", Target::End)],
            )
            .add_edge("b", "a")
            .compile()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidGraph(m) if m.contains("cycle")));
    }

    #[test]
    fn test_compile_rejects_unknown_branch_target() {
        let err = GraphBuilder::new()
            .add_node(StaticNode::new("a", "1"))
            .set_entry("a")
            .add_conditional_edges("a", classify_last(), [("x", Target::node("ghost"))])
            .compile()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidGraph(m) if m.contains("ghost")));
    }

    #[test]
    fn test_compile_rejects_empty_branches() {
        let err = GraphBuilder::new()
            .add_node(StaticNode::new("a", "1"))
            .set_entry("a")
            .add_conditional_edges(
                "a",
                classify_last(),
                std::iter::empty::<(String, Target)>(),
            )
            .compile()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidGraph(m) if m.contains("no branches")));
    }

    #[test]
    fn test_compile_branching_graph() {
        let graph = GraphBuilder::new()
            .add_node(StaticNode::new("decide", "left"))
            .add_node(StaticNode::new("left", "L"))
            .add_node(StaticNode::new("right", "R"))
            .set_entry("decide")
            .add_conditional_edges(
                "decide",
                classify_last(),
                [("left", Target::node("left")), ("right", Target::node("right"))],
            )
            .add_edge("left", Target::End)
            .add_edge("right", Target::End)
            .compile();
        assert!(graph.is_ok());
    }
}
