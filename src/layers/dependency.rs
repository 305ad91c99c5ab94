//! Ordering modifications within one stage.
//!
//! Modifications apply in timestamp order unless one depends on another, in
//! which case the one depended upon applies first whatever its timestamp.
//! Dependency cycles are collapsed into strongly connected components; the
//! members of a cyclic component fall back to timestamp order among
//! themselves while the component as a whole still respects every edge
//! into and out of it.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use crate::core::Timestamp;

/// Result of ordering one stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyOrder {
    /// Indices into the input, in application order.
    pub order: Vec<usize>,
    /// Number of dependency cycles that needed the timestamp fallback.
    pub cycles: usize,
}

struct Tarjan<'a> {
    adjacency: &'a [Vec<usize>],
    next_index: usize,
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    component: Vec<usize>,
    components: usize,
}

impl<'a> Tarjan<'a> {
    fn new(adjacency: &'a [Vec<usize>]) -> Self {
        let n = adjacency.len();
        Self {
            adjacency,
            next_index: 0,
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            component: vec![0; n],
            components: 0,
        }
    }

    fn visit(&mut self, v: usize) {
        self.index[v] = Some(self.next_index);
        self.lowlink[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack[v] = true;

        let adjacency = self.adjacency;
        for &w in &adjacency[v] {
            match self.index[w] {
                None => {
                    self.visit(w);
                    self.lowlink[v] = self.lowlink[v].min(self.lowlink[w]);
                }
                Some(iw) if self.on_stack[w] => {
                    self.lowlink[v] = self.lowlink[v].min(iw);
                }
                Some(_) => {}
            }
        }

        if self.index[v] == Some(self.lowlink[v]) {
            while let Some(w) = self.stack.pop() {
                self.on_stack[w] = false;
                self.component[w] = self.components;
                if w == v {
                    break;
                }
            }
            self.components += 1;
        }
    }
}

/// Order `timestamps.len()` modifications.
///
/// Each edge `(before, after)` states that `after` depends on `before`.
/// Among modifications free to go next, the earliest timestamp wins; ties
/// break by input index so the result is a pure function of its inputs.
///
/// ```
/// use duel_rules::core::Timestamp;
/// use duel_rules::layers::order_by_dependencies;
///
/// // #0 is older, but depends on #1.
/// let order = order_by_dependencies(&[Timestamp(1), Timestamp(2)], &[(1, 0)]);
/// assert_eq!(order.order, vec![1, 0]);
/// ```
#[must_use]
pub fn order_by_dependencies(timestamps: &[Timestamp], edges: &[(usize, usize)]) -> DependencyOrder {
    let n = timestamps.len();
    let mut adjacency = vec![Vec::new(); n];
    for &(before, after) in edges {
        if before < n && after < n && before != after {
            adjacency[before].push(after);
        }
    }

    let mut tarjan = Tarjan::new(&adjacency);
    for v in 0..n {
        if tarjan.index[v].is_none() {
            tarjan.visit(v);
        }
    }
    let component = tarjan.component;
    let count = tarjan.components;

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); count];
    for v in 0..n {
        members[component[v]].push(v);
    }
    for group in &mut members {
        group.sort_by_key(|&v| (timestamps[v], v));
    }
    let cycles = members.iter().filter(|g| g.len() > 1).count();

    let mut successors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); count];
    let mut indegree = vec![0usize; count];
    for (before, targets) in adjacency.iter().enumerate() {
        for &after in targets {
            let (cb, ca) = (component[before], component[after]);
            if cb != ca && successors[cb].insert(ca) {
                indegree[ca] += 1;
            }
        }
    }

    let key = |c: usize| (timestamps[members[c][0]], members[c][0]);
    let mut ready: BinaryHeap<Reverse<((Timestamp, usize), usize)>> = (0..count)
        .filter(|&c| indegree[c] == 0)
        .map(|c| Reverse((key(c), c)))
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse((_, c))) = ready.pop() {
        order.extend_from_slice(&members[c]);
        for &next in &successors[c] {
            indegree[next] -= 1;
            if indegree[next] == 0 {
                ready.push(Reverse((key(next), next)));
            }
        }
    }

    DependencyOrder { order, cycles }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(values: &[u64]) -> Vec<Timestamp> {
        values.iter().map(|&v| Timestamp(v)).collect()
    }

    #[test]
    fn test_no_edges_is_timestamp_order() {
        let result = order_by_dependencies(&ts(&[30, 10, 20]), &[]);
        assert_eq!(result.order, vec![1, 2, 0]);
        assert_eq!(result.cycles, 0);
    }

    #[test]
    fn test_dependency_overrides_timestamp() {
        // #1 (t10) depends on #0 (t30).
        let result = order_by_dependencies(&ts(&[30, 10, 20]), &[(0, 1)]);
        assert_eq!(result.order, vec![2, 0, 1]);
    }

    #[test]
    fn test_chain() {
        let result = order_by_dependencies(&ts(&[1, 2, 3]), &[(2, 1), (1, 0)]);
        assert_eq!(result.order, vec![2, 1, 0]);
    }

    #[test]
    fn test_cycle_falls_back_to_timestamp_for_cyclic_subset_only() {
        // #0 <-> #1 form a cycle; #2 (oldest) must come after #1.
        let result = order_by_dependencies(&ts(&[20, 10, 5]), &[(0, 1), (1, 0), (1, 2)]);
        assert_eq!(result.cycles, 1);
        assert_eq!(result.order, vec![1, 0, 2]);
    }

    #[test]
    fn test_cycle_component_respects_outside_edges() {
        // #2 must precede the cycle {#0, #1} even though it is newest.
        let result = order_by_dependencies(&ts(&[1, 2, 9]), &[(0, 1), (1, 0), (2, 0)]);
        assert_eq!(result.order, vec![2, 0, 1]);
    }

    #[test]
    fn test_empty() {
        let result = order_by_dependencies(&[], &[]);
        assert!(result.order.is_empty());
    }
}
