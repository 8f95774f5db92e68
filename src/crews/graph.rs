//! Dependency graph over node indices.
//!
//! Edges are stored once, as `(upstream, downstream)` pairs. Dependencies and
//! dependents are both computed from that list, so the two views cannot
//! disagree.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Directed graph whose nodes are creation indices `0..len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    len: usize,
    edges: Vec<(usize, usize)>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its index.
    pub fn add_node(&mut self) -> usize {
        self.len += 1;
        self.len - 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Record that `upstream` must run before `downstream`.
    ///
    /// Returns `false` when the edge already exists. Cycles, including
    /// self-edges, are accepted here and reported by [`topological_order`].
    ///
    /// [`topological_order`]: DependencyGraph::topological_order
    pub fn add_edge(&mut self, upstream: usize, downstream: usize) -> bool {
        if self.edges.contains(&(upstream, downstream)) {
            return false;
        }
        self.edges.push((upstream, downstream));
        true
    }

    /// All edges in declaration order.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Nodes `node` depends on, ascending.
    pub fn dependencies(&self, node: usize) -> Vec<usize> {
        let mut deps: Vec<usize> = self
            .edges
            .iter()
            .filter(|(_, down)| *down == node)
            .map(|(up, _)| *up)
            .collect();
        deps.sort_unstable();
        deps
    }

    /// Nodes that depend on `node`, ascending.
    pub fn dependents(&self, node: usize) -> Vec<usize> {
        let mut deps: Vec<usize> = self
            .edges
            .iter()
            .filter(|(up, _)| *up == node)
            .map(|(_, down)| *down)
            .collect();
        deps.sort_unstable();
        deps
    }

    fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.len];
        for &(up, down) in &self.edges {
            adjacency[up].push(down);
        }
        for targets in &mut adjacency {
            targets.sort_unstable();
        }
        adjacency
    }

    /// Find a cycle by depth-first search with three-colour marking.
    ///
    /// Returns the cycle as a path that starts and ends on the same node,
    /// following edge direction.
    pub fn find_cycle(&self) -> Option<Vec<usize>> {
        let adjacency = self.adjacency();
        let mut marks = vec![Mark::Unvisited; self.len];

        for start in 0..self.len {
            if marks[start] == Mark::Unvisited {
                if let Some(cycle) = visit(start, &adjacency, &mut marks) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    /// Order all nodes so every edge points forward.
    ///
    /// Among ready nodes the lowest creation index goes first, so the order
    /// only depends on the declarations. A cycle is returned as the error.
    pub fn topological_order(&self) -> Result<Vec<usize>, Vec<usize>> {
        if let Some(cycle) = self.find_cycle() {
            return Err(cycle);
        }

        let adjacency = self.adjacency();
        let mut in_degree = vec![0usize; self.len];
        for &(_, down) in &self.edges {
            in_degree[down] += 1;
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg == 0)
            .map(|(node, _)| Reverse(node))
            .collect();

        let mut order = Vec::with_capacity(self.len);
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for &next in &adjacency[node] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
        Ok(order)
    }
}

/// Depth-first walk from `start` with an explicit stack of
/// `(node, next child position)` frames. The frames double as the current path.
fn visit(start: usize, adjacency: &[Vec<usize>], marks: &mut [Mark]) -> Option<Vec<usize>> {
    let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
    marks[start] = Mark::InProgress;

    while let Some(frame) = stack.last_mut() {
        let (node, child) = *frame;
        let Some(&next) = adjacency[node].get(child) else {
            marks[node] = Mark::Done;
            stack.pop();
            continue;
        };
        frame.1 += 1;

        match marks[next] {
            Mark::InProgress => {
                let from = stack.iter().position(|&(n, _)| n == next).unwrap_or(0);
                let mut cycle: Vec<usize> = stack[from..].iter().map(|&(n, _)| n).collect();
                cycle.push(next);
                return Some(cycle);
            }
            Mark::Unvisited => {
                marks[next] = Mark::InProgress;
                stack.push((next, 0));
            }
            Mark::Done => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: usize, edges: &[(usize, usize)]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for _ in 0..nodes {
            g.add_node();
        }
        for &(up, down) in edges {
            g.add_edge(up, down);
        }
        g
    }

    #[test]
    fn test_views_are_inverse() {
        let g = graph(3, &[(0, 2), (1, 2)]);
        assert_eq!(g.dependencies(2), vec![0, 1]);
        assert_eq!(g.dependents(0), vec![2]);
        assert_eq!(g.dependents(1), vec![2]);
        assert!(g.dependencies(0).is_empty());
    }

    #[test]
    fn test_duplicate_edge_is_noop() {
        let mut g = graph(2, &[(0, 1)]);
        assert!(!g.add_edge(0, 1));
        assert_eq!(g.edges().len(), 1);
    }

    #[test]
    fn test_order_prefers_creation_index() {
        let g = graph(3, &[(2, 0)]);
        assert_eq!(g.topological_order().unwrap(), vec![1, 2, 0]);
    }

    #[test]
    fn test_order_respects_every_edge() {
        let edges = [(3, 1), (1, 0), (4, 0), (2, 4), (3, 2)];
        let g = graph(5, &edges);
        let order = g.topological_order().unwrap();
        let pos = |n: usize| order.iter().position(|&x| x == n).unwrap();
        for (up, down) in edges {
            assert!(pos(up) < pos(down));
        }
        assert_eq!(order, g.topological_order().unwrap());
    }

    #[test]
    fn test_two_node_cycle() {
        let g = graph(2, &[(0, 1), (1, 0)]);
        assert_eq!(g.topological_order().unwrap_err(), vec![0, 1, 0]);
    }

    #[test]
    fn test_self_edge_is_cycle() {
        let g = graph(2, &[(1, 1)]);
        assert_eq!(g.find_cycle(), Some(vec![1, 1]));
    }

    #[test]
    fn test_cycle_reported_with_edges_declared_in_any_order() {
        let g = graph(4, &[(2, 3), (3, 1), (0, 1), (1, 2)]);
        let cycle = g.find_cycle().unwrap();
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle.len(), 4);
    }

    fn long_chain(len: usize) -> DependencyGraph {
        DependencyGraph {
            len,
            edges: (1..len).map(|i| (i - 1, i)).collect(),
        }
    }

    #[test]
    fn test_long_chain_orders_without_recursion() {
        let g = long_chain(100_000);
        assert_eq!(g.find_cycle(), None);
        let order = g.topological_order().unwrap();
        assert_eq!(order.len(), 100_000);
        assert!(order.windows(2).all(|w| w[0] + 1 == w[1]));
    }

    #[test]
    fn test_long_chain_closed_into_cycle() {
        let mut g = long_chain(100_000);
        g.add_edge(99_999, 0);
        let cycle = g.topological_order().unwrap_err();
        assert_eq!(cycle.len(), 100_001);
        assert_eq!(cycle.first(), Some(&0));
        assert_eq!(cycle.last(), Some(&0));
    }
}
