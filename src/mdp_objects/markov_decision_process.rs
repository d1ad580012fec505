use std::collections::BTreeMap;

/**
 * The shape and the transition probabilities of a Markov decision process.
 *
 * States are the indices 0..number_of_states() and controls (actions) are the indices 0..number_of_controls().
 * Transition probabilities may depend on the time step; a time-invariant process simply ignores it.
 * Implementations are trusted to supply rows that sum to one; consumers check this after the fact.
 */
pub trait MarkovDecisionProcess {
    fn number_of_states(&self) -> usize;

    fn number_of_controls(&self) -> usize;

    /// Human-readable labels of states. States without an entry are unlabelled.
    fn state_labels(&self) -> BTreeMap<usize, String>;

    /// Human-readable description of a control.
    fn action_label(&self, action: usize) -> String;

    /// The probability of moving from `from` to `to` when taking `action` at `time`.
    fn transition_probability(&self, from: usize, to: usize, time: usize, action: usize) -> f64;

    fn is_valid_action(&self, action: usize) -> bool {
        action < self.number_of_controls()
    }
}

impl<T> MarkovDecisionProcess for Box<T>
where
    T: MarkovDecisionProcess + ?Sized,
{
    fn number_of_states(&self) -> usize {
        (**self).number_of_states()
    }

    fn number_of_controls(&self) -> usize {
        (**self).number_of_controls()
    }

    fn state_labels(&self) -> BTreeMap<usize, String> {
        (**self).state_labels()
    }

    fn action_label(&self, action: usize) -> String {
        (**self).action_label(action)
    }

    fn transition_probability(&self, from: usize, to: usize, time: usize, action: usize) -> f64 {
        (**self).transition_probability(from, to, time, action)
    }
}
