//! Axiom evaluation for derived variables.
//!
//! Derived variables are recomputed from scratch for every state: they are
//! reset to their default values, then the axiom rules are applied layer by
//! layer, each layer to a fixpoint.

use crate::task::{Axiom, PlanningTask};

/// Evaluates the task's axioms on raw state values.
#[derive(Debug)]
pub struct AxiomEvaluator {
    /// `(layer, rules)` sorted by layer.
    layers: Vec<(i32, Vec<Axiom>)>,
    /// `(var, default_value)` for every derived variable.
    derived_defaults: Vec<(usize, i32)>,
}

impl AxiomEvaluator {
    pub fn new(task: &PlanningTask) -> Self {
        let derived_defaults: Vec<(usize, i32)> = task
            .variables()
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_derived())
            .map(|(var, v)| (var, v.default_value))
            .collect();

        let mut layers: Vec<(i32, Vec<Axiom>)> = Vec::new();
        for axiom in task.axioms() {
            let layer = task.variable(axiom.fact.var).axiom_layer;
            match layers.iter_mut().find(|(l, _)| *l == layer) {
                Some((_, rules)) => rules.push(axiom.clone()),
                None => layers.push((layer, vec![axiom.clone()])),
            }
        }
        layers.sort_by_key(|(layer, _)| *layer);

        Self {
            layers,
            derived_defaults,
        }
    }

    pub fn has_axioms(&self) -> bool {
        !self.layers.is_empty()
    }

    /// Rewrites the derived portion of `values` in place.
    pub fn evaluate(&self, values: &mut [i32]) {
        if self.layers.is_empty() {
            return;
        }
        for &(var, default) in &self.derived_defaults {
            values[var] = default;
        }
        for (_, rules) in &self.layers {
            loop {
                let mut changed = false;
                for rule in rules {
                    if values[rule.fact.var] != rule.fact.value
                        && rule.conditions.iter().all(|c| values[c.var] == c.value)
                    {
                        values[rule.fact.var] = rule.fact.value;
                        changed = true;
                    }
                }
                if !changed {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TaskBuilder;

    #[test]
    fn no_axioms_leaves_values_untouched() {
        let mut builder = TaskBuilder::new();
        let v = builder.variable("v", 3);
        builder.goal(v, 2);
        let task = builder.build();

        let evaluator = AxiomEvaluator::new(&task);
        let mut values = vec![1];
        evaluator.evaluate(&mut values);
        assert_eq!(values, vec![1]);
        assert!(!evaluator.has_axioms());
    }

    #[test]
    fn chained_rules_reach_fixpoint() {
        // d0 derives from the base variable, d1 derives from d0.
        let mut builder = TaskBuilder::new();
        let base = builder.variable("base", 2);
        let d0 = builder.derived_variable("d0", 0);
        let d1 = builder.derived_variable("d1", 0);
        builder.axiom(&[(base, 1)], (d0, 1));
        builder.axiom(&[(d0, 1)], (d1, 1));
        builder.goal(d1, 1);
        let task = builder.build();

        let evaluator = AxiomEvaluator::new(&task);

        let mut values = vec![1, 0, 0];
        evaluator.evaluate(&mut values);
        assert_eq!(values, vec![1, 1, 1]);

        // Derived values are recomputed from defaults, not carried over.
        let mut values = vec![0, 1, 1];
        evaluator.evaluate(&mut values);
        assert_eq!(values, vec![0, 0, 0]);
    }
}
