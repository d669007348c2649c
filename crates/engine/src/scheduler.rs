//! Topological Scheduler — turns a validated step list into an ordered
//! sequence of waves via Kahn's algorithm.
//!
//! Mode (`SEQUENTIAL`/`PARALLEL`/`BATCH`) has no bearing on this
//! computation — §4.2 gives `schedule` no mode parameter at all. Every
//! mode walks the same wave layering; what differs between modes is
//! entirely in how the executor reports on that layering (§4.3.4).

use std::collections::{HashMap, VecDeque};

use contract::WorkflowStep;

/// Compute the wave layering for `steps` via Kahn's algorithm over
/// `depends_on` edges restricted to the enabled subgraph.
///
/// A disabled step is neutral, the same way the validator's cycle check
/// treats it (`validator::validate`'s enabled-subgraph rule): it gates
/// nothing and is gated by nothing, so every edge incident to it — both
/// a dependent's edge onto it and its own edge onto a dependency — is
/// dropped before in-degree is computed. The step is still assigned a
/// wave (its in-degree starts and stays at zero, so it appears in the
/// earliest one) so the executor can iterate it and mark it skipped.
/// This is also what keeps a cycle that only exists through a disabled
/// step (§4.1 enabled-subgraph cycle check) from starving every wave —
/// with the cycle's edges dropped, both steps become immediately ready.
/// `order_index` has no scheduling effect; `parallel_group` is never
/// inspected here. Declaration index — the step's position in `steps` —
/// is the sole tiebreaker within a wave.
///
/// Assumes `steps` has already passed `validator::validate`: a residual
/// cycle among *enabled* steps would starve every wave, but that input
/// is rejected before it ever reaches `schedule`.
pub fn schedule(steps: &[WorkflowStep]) -> Vec<Vec<String>> {
    let declaration_index: HashMap<&str, usize> = steps
        .iter()
        .enumerate()
        .map(|(i, s)| (s.step_id.as_str(), i))
        .collect();

    let enabled: HashMap<&str, bool> = steps.iter().map(|s| (s.step_id.as_str(), s.enabled)).collect();

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();

    for step in steps {
        adjacency.entry(step.step_id.as_str()).or_default();
        in_degree.entry(step.step_id.as_str()).or_insert(0);
    }

    for step in steps {
        if !step.enabled {
            // A disabled step's own dependencies never gate it.
            continue;
        }
        for dep in &step.depends_on {
            if !enabled.get(dep.as_str()).copied().unwrap_or(false) {
                // A dependency on a disabled step reads as already satisfied.
                continue;
            }
            adjacency
                .entry(dep.as_str())
                .or_default()
                .push(step.step_id.as_str());
            *in_degree.entry(step.step_id.as_str()).or_insert(0) += 1;
        }
    }

    let mut ready: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&id, _)| id)
        .collect();
    sort_by_declaration(&mut ready, &declaration_index);

    let mut waves: Vec<Vec<String>> = Vec::new();

    while !ready.is_empty() {
        let mut wave: Vec<&str> = ready.drain(..).collect();
        sort_by_declaration(&mut wave, &declaration_index);

        let mut next_ready: Vec<&str> = Vec::new();
        for &id in &wave {
            if let Some(neighbours) = adjacency.get(id) {
                for &neighbour in neighbours {
                    let deg = in_degree.entry(neighbour).or_insert(0);
                    *deg -= 1;
                    if *deg == 0 {
                        next_ready.push(neighbour);
                    }
                }
            }
        }

        waves.push(wave.into_iter().map(str::to_owned).collect());

        ready = next_ready.into();
    }

    waves
}

fn sort_by_declaration<'a>(ids: &mut VecDeque<&'a str>, index: &HashMap<&'a str, usize>) {
    let mut as_vec: Vec<&str> = ids.drain(..).collect();
    as_vec.sort_by_key(|id| index[id]);
    ids.extend(as_vec);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_step;

    #[test]
    fn linear_chain_produces_one_step_per_wave() {
        let a = sample_step("a", 0, vec![]);
        let b = sample_step("b", 1, vec!["a".into()]);
        let c = sample_step("c", 2, vec!["b".into()]);
        let waves = schedule(&[a, b, c]);
        assert_eq!(waves, vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn diamond_groups_independent_steps_into_one_wave() {
        let a = sample_step("a", 0, vec![]);
        let b = sample_step("b", 1, vec!["a".into()]);
        let c = sample_step("c", 2, vec!["a".into()]);
        let d = sample_step("d", 3, vec!["b".into(), "c".into()]);
        let waves = schedule(&[a, b, c, d]);
        assert_eq!(waves, vec![vec!["a"], vec!["b", "c"], vec!["d"]]);
    }

    #[test]
    fn declaration_order_breaks_ties_within_a_wave() {
        let b = sample_step("b", 0, vec![]);
        let a = sample_step("a", 1, vec![]);
        let waves = schedule(&[b, a]);
        assert_eq!(waves, vec![vec!["b", "a"]]);
    }

    #[test]
    fn disabled_step_still_occupies_its_wave() {
        // b is disabled, so its edge to a (dependency) and its edge to c
        // (dependent) both drop: all three are immediately ready.
        let a = sample_step("a", 0, vec![]);
        let mut b = sample_step("b", 1, vec!["a".into()]);
        b.enabled = false;
        let c = sample_step("c", 2, vec!["b".into()]);
        let waves = schedule(&[a, b, c]);
        assert_eq!(waves, vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn dependent_of_a_disabled_step_is_not_gated_by_its_real_ancestors() {
        // c depends only on the disabled b; b's own dependency on a must
        // not transitively gate c once b's edges are dropped.
        let a = sample_step("a", 0, vec![]);
        let mut b = sample_step("b", 1, vec!["a".into()]);
        b.enabled = false;
        let c = sample_step("c", 2, vec!["b".into()]);
        let waves = schedule(&[a, b, c]);
        let wave0 = &waves[0];
        assert!(wave0.contains(&"c".to_string()));
    }

    #[test]
    fn cycle_through_a_disabled_step_does_not_starve_every_wave() {
        // a depends on disabled b, b depends on a — validator accepts this
        // as not-a-cycle (enabled subgraph is just {a}); schedule must not
        // produce empty waves for it either.
        let a = sample_step("a", 0, vec!["b".into()]);
        let mut b = sample_step("b", 1, vec!["a".into()]);
        b.enabled = false;
        let waves = schedule(&[a, b]);
        assert!(!waves.is_empty());
        let scheduled: Vec<&str> = waves.iter().flatten().map(String::as_str).collect();
        assert_eq!(scheduled.len(), 2);
        assert!(scheduled.contains(&"a"));
        assert!(scheduled.contains(&"b"));
    }

    #[test]
    fn empty_input_produces_no_waves() {
        assert!(schedule(&[]).is_empty());
    }
}
