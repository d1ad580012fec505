use anyhow::Result;
use layout::{
    adt::dag::NodeHandle,
    core::{
        base::Orientation,
        color::Color,
        style::{LineStyleKind, StyleAttr},
    },
    std_shapes::shapes::ShapeKind,
    topo::layout::VisualGraph,
};
use std::{collections::HashMap, fmt};

use crate::mdp_framework::graphable::Graphable;

use super::probability::Probability;

pub const FORMAT_SPECIFICATION: &str = "A transition graph is exported as a graphviz digraph.
    State nodes are named s<i>, action nodes are named a<i>_<u> for state i and action u.
    Dashed edges connect a state to its action node; solid edges connect an action node to the states it may lead to,
    with a pen width proportional to the transition probability.";

pub const LABELLED_STATE_COLOR: &str = "lightblue";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    State(usize),
    Action { state: usize, action: usize },
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::State(state) => write!(f, "s{}", state),
            NodeId::Action { state, action } => write!(f, "a{}_{}", state, action),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Ellipse,
    Box,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub label: String,
    pub shape: NodeShape,
    pub filled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeKind {
    /// The dashed edge from a state to the action taken in it.
    Choice,
    /// The edge from an action node to a possible successor state.
    Transition(Probability),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
    pub label: Option<String>,
    pub pen_width: f64,
}

impl GraphEdge {
    pub fn is_dashed(&self) -> bool {
        self.kind == EdgeKind::Choice
    }

    pub fn probability(&self) -> Option<Probability> {
        match self.kind {
            EdgeKind::Choice => None,
            EdgeKind::Transition(probability) => Some(probability),
        }
    }
}

/// Advisory findings while building a transition graph. None of these stops the build.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    InvalidAction {
        requested: usize,
        number_of_controls: usize,
    },
    RowSum {
        state: usize,
        sum: f64,
    },
    UnknownStateLabel {
        state: usize,
        number_of_states: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::InvalidAction {
                requested,
                number_of_controls,
            } => write!(
                f,
                "{} is not a valid control action (there are {} controls); using action 0 instead",
                requested, number_of_controls
            ),
            Diagnostic::RowSum { state, sum } => write!(
                f,
                "the transition matrix has a row ({}) that does not sum to one; it sums to {:.6}",
                state, sum
            ),
            Diagnostic::UnknownStateLabel {
                state,
                number_of_states,
            } => write!(
                f,
                "label for state {} is ignored, as there are only {} states",
                state, number_of_states
            ),
        }
    }
}

/**
 * The graph of the Markov chain that a Markov decision process induces for one action at one time step.
 *
 * It is rebuilt from scratch for every combination of parameters and is not meant to be mutated.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionGraph {
    pub time: usize,
    pub action: usize,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TransitionGraph {
    pub fn state_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes
            .iter()
            .filter(|node| matches!(node.id, NodeId::State(_)))
    }

    pub fn action_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes
            .iter()
            .filter(|node| matches!(node.id, NodeId::Action { .. }))
    }

    pub fn choice_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|edge| edge.is_dashed())
    }

    pub fn transition_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|edge| !edge.is_dashed())
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn has_row_sum_violation(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| matches!(diagnostic, Diagnostic::RowSum { .. }))
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for TransitionGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph mdp {{")?;
        writeln!(f, "    // time {}, action {}", self.time, self.action)?;
        for node in &self.nodes {
            write!(f, "    \"{}\" [label=\"{}\"", node.id, escape(&node.label))?;
            if node.shape == NodeShape::Box {
                write!(f, ", shape=box")?;
            }
            if node.filled {
                write!(f, ", style=filled, fillcolor={}", LABELLED_STATE_COLOR)?;
            }
            writeln!(f, "];")?;
        }
        for edge in &self.edges {
            write!(f, "    \"{}\" -> \"{}\" [", edge.from, edge.to)?;
            match edge.kind {
                EdgeKind::Choice => write!(f, "style=dashed")?,
                EdgeKind::Transition(_) => write!(f, "penwidth={}", edge.pen_width)?,
            }
            if let Some(label) = &edge.label {
                write!(f, ", label=\"{}\"", escape(label))?;
            }
            writeln!(f, "];")?;
        }
        writeln!(f, "}}")
    }
}

impl Graphable for TransitionGraph {
    fn to_dot(&self) -> Result<VisualGraph> {
        log::info!("to_dot for TransitionGraph");
        let mut graph = VisualGraph::new(Orientation::TopToBottom);

        let mut handles: HashMap<NodeId, NodeHandle> = HashMap::new();
        for node in &self.nodes {
            let shape = match node.shape {
                NodeShape::Ellipse => ShapeKind::new_circle(&node.label),
                NodeShape::Box => ShapeKind::new_box(&node.label),
            };
            let mut look = StyleAttr::simple();
            if node.filled {
                look.fill_color = Color::from_name(LABELLED_STATE_COLOR);
            }
            handles.insert(node.id, <dyn Graphable>::create_node(&mut graph, shape, look));
        }

        for edge in &self.edges {
            let (Some(source), Some(target)) = (handles.get(&edge.from), handles.get(&edge.to)) else {
                continue;
            };
            let style = if edge.is_dashed() {
                LineStyleKind::Dashed
            } else {
                LineStyleKind::Normal
            };
            <dyn Graphable>::create_edge(
                &mut graph,
                source,
                target,
                style,
                edge.pen_width,
                edge.label.as_deref().unwrap_or(""),
            );
        }

        Ok(graph)
    }
}
