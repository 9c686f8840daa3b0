//! Meta testing - using rosecheck to test rosecheck itself
//!
//! This module contains properties that validate the correctness of
//! rosecheck's generators, shrink trees, property runner and stateful runner.

use rosecheck::*;

#[path = "meta-testing/generator-invariants.rs"]
mod generator_invariants;

#[path = "meta-testing/shrinking-properties.rs"]
mod shrinking_properties;

#[path = "meta-testing/distribution-validation.rs"]
mod distribution_validation;

#[path = "meta-testing/combinator-properties.rs"]
mod combinator_properties;

#[path = "meta-testing/container-properties.rs"]
mod container_properties;

#[path = "meta-testing/integration-properties.rs"]
mod integration_properties;

#[path = "meta-testing/state-machine-properties.rs"]
mod state_machine_properties;

/// Helper to generate seed strings for meta testing
fn arbitrary_seed() -> Gen<String> {
    Gen::<u32>::interval(0, 10_000).map(|n| format!("meta-{n}"))
}

/// Every node of a shrink tree down to `depth`, root included.
fn tree_nodes<T: Clone + 'static>(tree: &Shrinkable<T>, depth: usize) -> Vec<T> {
    let mut nodes = vec![tree.value.clone()];
    if depth > 0 {
        for child in tree.shrinks().iter() {
            nodes.extend(tree_nodes(&child, depth - 1));
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_test_generator_bounds() {
        generator_invariants::test_interval_bounds();
        generator_invariants::test_shrink_tree_bounds();
        generator_invariants::test_just_is_idempotent();
        generator_invariants::test_random_determinism();
    }

    #[test]
    fn meta_test_shrinking_convergence() {
        shrinking_properties::test_zero_is_first_shrink();
        shrinking_properties::test_integer_shrinks_converge();
        shrinking_properties::test_float_first_shrink_is_zero();
    }

    #[test]
    fn meta_test_distribution_accuracy() {
        distribution_validation::test_weighted_value_frequency();
        distribution_validation::test_one_of_union();
        distribution_validation::test_boolean_probability();
    }

    #[test]
    fn meta_test_combinator_laws() {
        combinator_properties::test_map_composition();
        combinator_properties::test_filter_holds_through_tree();
        combinator_properties::test_flat_map_determinism();
    }

    #[test]
    fn meta_test_container_bounds() {
        container_properties::test_vec_size_bounds();
        container_properties::test_set_uniqueness();
        container_properties::test_dictionary_keys();
        container_properties::test_string_alphabets();
    }

    #[test]
    fn meta_test_integration_workflows() {
        integration_properties::test_minimized_pair();
        integration_properties::test_report_mentions_original();
        integration_properties::test_no_shrink_found();
    }

    #[test]
    fn meta_test_state_machine_testing() {
        state_machine_properties::test_counter_model();
        state_machine_properties::test_replay_is_deterministic();
        state_machine_properties::test_replay_shrinks_to_cause();
    }
}
