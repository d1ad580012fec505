use anyhow::{Context, Result};
use std::collections::BTreeMap;

use crate::mdp_objects::{
    markov_decision_process::MarkovDecisionProcess,
    probability::{PROBABILITY_TOLERANCE, Probability},
    transition_graph::{Diagnostic, EdgeKind, GraphEdge, GraphNode, NodeId, NodeShape, TransitionGraph},
};

/// Pen width of an edge with probability one.
pub const LINE_WIDTH_SCALE: f64 = 5.0;

/// Largest deviation from one that a row of transition probabilities may have without a warning.
pub const ROW_SUM_TOLERANCE: f64 = PROBABILITY_TOLERANCE;

/// How probabilities and states are shown in a transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphOptions {
    pub show_probabilities: bool,
    pub use_percentage: bool,
    pub show_state_numbers: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            show_probabilities: true,
            use_percentage: false,
            show_state_numbers: false,
        }
    }
}

impl GraphOptions {
    pub fn probability_label(&self, probability: &Probability) -> Option<String> {
        if !self.show_probabilities {
            None
        } else if self.use_percentage {
            Some(probability.to_percentage_string())
        } else {
            Some(probability.to_fraction_string())
        }
    }

    pub fn state_label(&self, state: usize, labels: &BTreeMap<usize, String>) -> Option<String> {
        let label = labels.get(&state)?;
        Some(if self.show_state_numbers {
            format!("{}:{}", state, label)
        } else {
            label.clone()
        })
    }
}

pub trait ToTransitionGraph {
    /**
     * Builds the graph of the Markov chain induced by taking `action` at `time` in every state.
     *
     * An action outside the range of controls falls back to action 0, and rows that do not sum to one are drawn as given;
     * both are reported as diagnostics on the result. A probability outside [0, 1] is an error.
     */
    fn to_transition_graph(
        &self,
        action: usize,
        time: usize,
        labels: &BTreeMap<usize, String>,
        options: &GraphOptions,
    ) -> Result<TransitionGraph>;
}

impl<T> ToTransitionGraph for T
where
    T: MarkovDecisionProcess + ?Sized,
{
    fn to_transition_graph(
        &self,
        action: usize,
        time: usize,
        labels: &BTreeMap<usize, String>,
        options: &GraphOptions,
    ) -> Result<TransitionGraph> {
        let number_of_states = self.number_of_states();
        let mut diagnostics = vec![];

        let action = if self.is_valid_action(action) {
            action
        } else {
            diagnostics.push(Diagnostic::InvalidAction {
                requested: action,
                number_of_controls: self.number_of_controls(),
            });
            0
        };

        for state in labels.keys().filter(|state| **state >= number_of_states) {
            diagnostics.push(Diagnostic::UnknownStateLabel {
                state: *state,
                number_of_states,
            });
        }

        let action_label = self.action_label(action);
        let mut nodes = Vec::with_capacity(2 * number_of_states);
        let mut edges = vec![];

        for state in 0..number_of_states {
            let state_node = match options.state_label(state, labels) {
                Some(label) => GraphNode {
                    id: NodeId::State(state),
                    label,
                    shape: NodeShape::Ellipse,
                    filled: true,
                },
                None => GraphNode {
                    id: NodeId::State(state),
                    label: format!("Node {}", state),
                    shape: NodeShape::Ellipse,
                    filled: false,
                },
            };
            let action_node = GraphNode {
                id: NodeId::Action { state, action },
                label: action_label.clone(),
                shape: NodeShape::Box,
                filled: false,
            };

            edges.push(GraphEdge {
                from: state_node.id,
                to: action_node.id,
                kind: EdgeKind::Choice,
                label: None,
                pen_width: 1.0,
            });
            nodes.push(state_node);
            nodes.push(action_node);
        }

        for from in 0..number_of_states {
            let mut sum = 0.0;
            for to in 0..number_of_states {
                let probability = Probability::try_from(self.transition_probability(from, to, time, action))
                    .with_context(|| {
                        format!(
                            "transition from state {} to state {} at time {} under action {}",
                            from, to, time, action
                        )
                    })?;

                if probability.is_positive() {
                    edges.push(GraphEdge {
                        from: NodeId::Action { state: from, action },
                        to: NodeId::State(to),
                        kind: EdgeKind::Transition(probability),
                        label: options.probability_label(&probability),
                        pen_width: LINE_WIDTH_SCALE * probability.value(),
                    });
                    sum += probability.value();
                }
            }

            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                diagnostics.push(Diagnostic::RowSum { state: from, sum });
            }
        }

        for diagnostic in &diagnostics {
            log::warn!("{}", diagnostic);
        }

        Ok(TransitionGraph {
            time,
            action,
            nodes,
            edges,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, fs};

    use crate::{
        mdp_objects::{
            example_markov_decision_processes::{MachineReplacement, shooting},
            markov_decision_process::MarkovDecisionProcess,
            tabular_markov_decision_process::TabularMarkovDecisionProcess,
            transition_graph::{Diagnostic, NodeId},
        },
        techniques::transition_graph_builder::{GraphOptions, LINE_WIDTH_SCALE, ToTransitionGraph},
    };

    fn positive_transitions(mdp: &dyn MarkovDecisionProcess, time: usize, action: usize) -> usize {
        let n = mdp.number_of_states();
        (0..n)
            .flat_map(|from| (0..n).map(move |to| (from, to)))
            .filter(|(from, to)| mdp.transition_probability(*from, *to, time, action) > 0.0)
            .count()
    }

    #[test]
    fn node_and_edge_counts() {
        let mdp = shooting().unwrap();
        let labels = mdp.state_labels();
        for action in 0..mdp.number_of_controls() {
            for time in [0, 3, 10000] {
                let graph = mdp
                    .to_transition_graph(action, time, &labels, &GraphOptions::default())
                    .unwrap();
                assert_eq!(graph.state_nodes().count(), 2);
                assert_eq!(graph.action_nodes().count(), 2);
                assert_eq!(graph.choice_edges().count(), 2);
                assert_eq!(
                    graph.transition_edges().count(),
                    positive_transitions(&mdp, time, action)
                );
                assert!(graph.diagnostics.is_empty());
            }
        }
    }

    #[test]
    fn blind_shot_omits_zero_probability() {
        let mdp = shooting().unwrap();
        let graph = mdp
            .to_transition_graph(1, 0, &mdp.state_labels(), &GraphOptions::default())
            .unwrap();
        assert_eq!(graph.transition_edges().count(), 3);
        assert!(!graph.transition_edges().any(|edge| {
            edge.from == NodeId::Action { state: 1, action: 1 } && edge.to == NodeId::State(0)
        }));
    }

    #[test]
    fn pen_width_is_proportional() {
        let mdp = shooting().unwrap();
        let graph = mdp
            .to_transition_graph(0, 0, &mdp.state_labels(), &GraphOptions::default())
            .unwrap();
        for edge in graph.transition_edges() {
            assert_eq!(edge.pen_width, LINE_WIDTH_SCALE * edge.probability().unwrap().value());
        }
        let mut widths = graph
            .transition_edges()
            .map(|edge| (edge.probability().unwrap().value(), edge.pen_width))
            .collect::<Vec<_>>();
        widths.sort_by(|a, b| a.0.total_cmp(&b.0));
        assert!(widths.windows(2).all(|w| w[0].1 <= w[1].1));
        assert!((widths.last().unwrap().1 - 3.5).abs() < 1e-12);
    }

    #[test]
    fn probability_labels() {
        let mdp = shooting().unwrap();
        let labels = mdp.state_labels();
        let edge_label = |options: &GraphOptions| {
            let graph = mdp.to_transition_graph(0, 0, &labels, options).unwrap();
            graph
                .transition_edges()
                .find(|edge| {
                    edge.from == NodeId::Action { state: 0, action: 0 } && edge.to == NodeId::State(0)
                })
                .unwrap()
                .label
                .clone()
        };

        assert_eq!(edge_label(&GraphOptions::default()), Some("0.70".to_string()));

        let percentage = GraphOptions {
            use_percentage: true,
            ..Default::default()
        };
        assert_eq!(edge_label(&percentage), Some("70.0%".to_string()));

        let hidden = GraphOptions {
            show_probabilities: false,
            use_percentage: true,
            ..Default::default()
        };
        assert_eq!(edge_label(&hidden), None);
    }

    #[test]
    fn hidden_probabilities_keep_widths() {
        let mdp = shooting().unwrap();
        let labels = mdp.state_labels();
        let shown = mdp.to_transition_graph(0, 0, &labels, &GraphOptions::default()).unwrap();
        let hidden = mdp
            .to_transition_graph(
                0,
                0,
                &labels,
                &GraphOptions {
                    show_probabilities: false,
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(hidden.transition_edges().all(|edge| edge.label.is_none()));
        let widths = |graph: &crate::mdp_objects::transition_graph::TransitionGraph| {
            graph.transition_edges().map(|edge| edge.pen_width).collect::<Vec<_>>()
        };
        assert_eq!(widths(&shown), widths(&hidden));
    }

    #[test]
    fn state_labels() {
        let mdp = shooting().unwrap();
        let mut labels = BTreeMap::new();
        labels.insert(1, "Target missed".to_string());

        let graph = mdp.to_transition_graph(0, 0, &labels, &GraphOptions::default()).unwrap();
        let unlabelled = graph.get_node(&NodeId::State(0)).unwrap();
        assert_eq!(unlabelled.label, "Node 0");
        assert!(!unlabelled.filled);
        let labelled = graph.get_node(&NodeId::State(1)).unwrap();
        assert_eq!(labelled.label, "Target missed");
        assert!(labelled.filled);

        let numbered = GraphOptions {
            show_state_numbers: true,
            ..Default::default()
        };
        let graph = mdp.to_transition_graph(0, 0, &labels, &numbered).unwrap();
        assert_eq!(graph.get_node(&NodeId::State(0)).unwrap().label, "Node 0");
        assert_eq!(graph.get_node(&NodeId::State(1)).unwrap().label, "1:Target missed");
    }

    #[test]
    fn action_nodes_carry_action_label() {
        let mdp = shooting().unwrap();
        let graph = mdp
            .to_transition_graph(1, 0, &mdp.state_labels(), &GraphOptions::default())
            .unwrap();
        assert!(graph.action_nodes().all(|node| node.label == "Take a blind shot"));
    }

    #[test]
    fn invalid_action_falls_back() {
        let mdp = shooting().unwrap();
        let labels = mdp.state_labels();
        let fallback = mdp.to_transition_graph(99, 4, &labels, &GraphOptions::default()).unwrap();
        let regular = mdp.to_transition_graph(0, 4, &labels, &GraphOptions::default()).unwrap();

        assert_eq!(fallback.action, 0);
        assert_eq!(fallback.nodes, regular.nodes);
        assert_eq!(fallback.edges, regular.edges);
        assert_eq!(
            fallback.diagnostics,
            vec![Diagnostic::InvalidAction {
                requested: 99,
                number_of_controls: 2
            }]
        );

        //the number of controls itself is out of range as well
        let boundary = mdp.to_transition_graph(2, 4, &labels, &GraphOptions::default()).unwrap();
        assert_eq!(boundary.action, 0);
    }

    #[test]
    fn row_sum_diagnostic() {
        let fin = fs::read_to_string("testfiles/unbalanced.mdp").unwrap();
        let mdp = fin.parse::<TabularMarkovDecisionProcess>().unwrap();
        let graph = mdp
            .to_transition_graph(0, 0, &mdp.state_labels(), &GraphOptions::default())
            .unwrap();

        let row_sums = graph
            .diagnostics
            .iter()
            .filter_map(|diagnostic| match diagnostic {
                Diagnostic::RowSum { state, sum } => Some((*state, *sum)),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(row_sums.len(), 1);
        assert_eq!(row_sums[0].0, 0);
        assert!((row_sums[0].1 - 0.9).abs() < 1e-9);
        assert!(graph.has_row_sum_violation());

        //the graph is drawn anyway
        assert_eq!(graph.transition_edges().count(), 6);
    }

    #[test]
    fn row_sum_tolerance() {
        let fin = fs::read_to_string("testfiles/tolerance.mdp").unwrap();
        let mdp = fin.parse::<TabularMarkovDecisionProcess>().unwrap();
        let graph = mdp
            .to_transition_graph(0, 0, &mdp.state_labels(), &GraphOptions::default())
            .unwrap();

        let violating_states = graph
            .diagnostics
            .iter()
            .filter_map(|diagnostic| match diagnostic {
                Diagnostic::RowSum { state, .. } => Some(*state),
                _ => None,
            })
            .collect::<Vec<_>>();
        //row 0 is 5e-7 off, row 1 is 2e-6 off
        assert_eq!(violating_states, vec![1]);
    }

    #[test]
    fn probability_slightly_above_one_is_rounded() {
        let fin = fs::read_to_string("testfiles/tolerance.mdp").unwrap();
        let mdp = fin.parse::<TabularMarkovDecisionProcess>().unwrap();
        let graph = mdp
            .to_transition_graph(0, 0, &mdp.state_labels(), &GraphOptions::default())
            .unwrap();

        let edge = graph
            .transition_edges()
            .find(|edge| edge.from == NodeId::Action { state: 2, action: 0 })
            .unwrap();
        assert_eq!(edge.probability().unwrap().value(), 1.0);
        assert_eq!(edge.pen_width, LINE_WIDTH_SCALE);
    }

    #[test]
    fn unknown_state_label() {
        let fin = fs::read_to_string("testfiles/unbalanced.mdp").unwrap();
        let mdp = fin.parse::<TabularMarkovDecisionProcess>().unwrap();
        let graph = mdp
            .to_transition_graph(0, 0, &mdp.state_labels(), &GraphOptions::default())
            .unwrap();

        assert!(graph.diagnostics.contains(&Diagnostic::UnknownStateLabel {
            state: 7,
            number_of_states: 3
        }));
        assert_eq!(graph.state_nodes().count(), 3);
        assert_eq!(graph.get_node(&NodeId::State(1)).unwrap().label, "Node 1");
        assert_eq!(graph.get_node(&NodeId::State(2)).unwrap().label, "Busy");
    }

    #[test]
    fn out_of_domain_probability() {
        let fin = fs::read_to_string("testfiles/negative.mdp").unwrap();
        let mdp = fin.parse::<TabularMarkovDecisionProcess>().unwrap();
        assert!(
            mdp.to_transition_graph(0, 0, &mdp.state_labels(), &GraphOptions::default())
                .is_err()
        );
    }

    #[test]
    fn shooting_rows_sum_to_one_at_all_times() {
        let mdp = shooting().unwrap();
        for time in 0..100 {
            let graph = mdp
                .to_transition_graph(0, time, &mdp.state_labels(), &GraphOptions::default())
                .unwrap();
            assert!(!graph.has_row_sum_violation());
        }
    }

    #[test]
    fn time_dependence() {
        let mdp = MachineReplacement::default();
        let labels = mdp.state_labels();
        let early = mdp
            .to_transition_graph(MachineReplacement::REPAIR, 0, &labels, &GraphOptions::default())
            .unwrap();
        let late = mdp
            .to_transition_graph(MachineReplacement::REPAIR, 100, &labels, &GraphOptions::default())
            .unwrap();

        //a perfect repair at time 0 never leaves the machine broken
        assert_eq!(early.transition_edges().count(), 2);
        assert_eq!(late.transition_edges().count(), 3);
        assert!(!late.has_row_sum_violation());
    }

    #[test]
    fn idempotent() {
        let mdp = shooting().unwrap();
        let labels = mdp.state_labels();
        let options = GraphOptions {
            use_percentage: true,
            show_state_numbers: true,
            ..Default::default()
        };
        let first = mdp.to_transition_graph(1, 7, &labels, &options).unwrap();
        let second = mdp.to_transition_graph(1, 7, &labels, &options).unwrap();
        assert_eq!(first, second);
    }
}
