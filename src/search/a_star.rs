//! Best-first path search over an implicit graph.
//!
//! The graph is never materialised: [`a_star`] only sees a start node, a predicate for
//! end nodes, a function listing the neighbours of a node, an edge cost and a heuristic.
//! Both working sets are [`SortedVec`]s, so small searches run without touching the heap.

use core::cmp::Ordering;
use core::fmt::Debug;
use core::ops::Add;

use crate::SortedVec;

/// Inline capacity of the open and closed sets.
const INLINE_NODES: usize = 4;

/// A route found by [`a_star`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path<Node, Cost> {
    /// Every node from the start to the end node, both included.
    pub nodes: Vec<Node>,
    /// Sum of the edge costs along `nodes`.
    pub cost: Cost,
}

struct SearchNode<Node, Cost> {
    node: Node,
    cost: Cost,
    estimate: Cost,
    id: usize,
    // 0 for the start node
    previous_id: usize,
}

/// Open-set entry: the cheapest estimate sorts last, newest first among equals.
struct ByEstimate<Node, Cost>(SearchNode<Node, Cost>);

impl<Node, Cost: Ord> Ord for ByEstimate<Node, Cost> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .estimate
            .cmp(&self.0.estimate)
            .then(self.0.id.cmp(&other.0.id))
    }
}

impl<Node, Cost: Ord> PartialOrd for ByEstimate<Node, Cost> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Node, Cost: Ord> PartialEq for ByEstimate<Node, Cost> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<Node, Cost: Ord> Eq for ByEstimate<Node, Cost> {}

/// Closed-set entry, ordered by id.
struct ById<Node, Cost>(SearchNode<Node, Cost>);

impl<Node, Cost> Ord for ById<Node, Cost> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl<Node, Cost> PartialOrd for ById<Node, Cost> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Node, Cost> PartialEq for ById<Node, Cost> {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl<Node, Cost> Eq for ById<Node, Cost> {}

/// Finds the cheapest path from `start` to any node accepted by `is_end`.
///
/// * `next_nodes(n)` lists the nodes reachable from `n`.
/// * `cost(a, b)` is the cost of the edge from `a` to `b`.
/// * `heuristic(n)` estimates the remaining cost from `n`; it must never overestimate
///   for the result to be optimal.
///
/// A neighbour equal to an already expanded node is skipped. Returns `None` when every
/// reachable node has been expanded without reaching an end node.
///
/// ```rust
/// use hybrid_vec::a_star;
///
/// // walk the integers from 0 to 5 in steps of +1 or +2, each step costs 1
/// let path = a_star(
///     0i32,
///     |&n| n == 5,
///     |&n| [n + 1, n + 2],
///     |_, _| 1u32,
///     |&n| ((5 - n).max(0) as u32).div_ceil(2),
/// )
/// .unwrap();
/// assert_eq!(path.cost, 3);
/// assert_eq!(path.nodes.first(), Some(&0));
/// assert_eq!(path.nodes.last(), Some(&5));
/// ```
pub fn a_star<Node, Cost, IsEnd, NextNodes, Neighbours, CostFn, Heuristic>(
    start: Node,
    is_end: IsEnd,
    next_nodes: NextNodes,
    cost: CostFn,
    heuristic: Heuristic,
) -> Option<Path<Node, Cost>>
where
    Node: Clone + PartialEq,
    Cost: Copy + Ord + Add<Output = Cost> + Default + Debug,
    IsEnd: FnMut(&Node) -> bool,
    NextNodes: FnMut(&Node) -> Neighbours,
    Neighbours: IntoIterator<Item = Node>,
    CostFn: FnMut(&Node, &Node) -> Cost,
    Heuristic: FnMut(&Node) -> Cost,
{
    a_star_with_capacity(start, is_end, next_nodes, cost, heuristic, 0)
}

/// [`a_star`] with both working sets pre-sized for `estimated_nodes`.
pub fn a_star_with_capacity<Node, Cost, IsEnd, NextNodes, Neighbours, CostFn, Heuristic>(
    start: Node,
    mut is_end: IsEnd,
    mut next_nodes: NextNodes,
    mut cost: CostFn,
    mut heuristic: Heuristic,
    estimated_nodes: usize,
) -> Option<Path<Node, Cost>>
where
    Node: Clone + PartialEq,
    Cost: Copy + Ord + Add<Output = Cost> + Default + Debug,
    IsEnd: FnMut(&Node) -> bool,
    NextNodes: FnMut(&Node) -> Neighbours,
    Neighbours: IntoIterator<Item = Node>,
    CostFn: FnMut(&Node, &Node) -> Cost,
    Heuristic: FnMut(&Node) -> Cost,
{
    let mut open: SortedVec<ByEstimate<Node, Cost>, INLINE_NODES> = SortedVec::with_capacity(estimated_nodes);
    let mut closed: SortedVec<ById<Node, Cost>, INLINE_NODES> = SortedVec::with_capacity(estimated_nodes);
    let mut latest_id = 1;
    open.insert(ByEstimate(SearchNode {
        node: start,
        cost: Cost::default(),
        estimate: Cost::default(),
        id: latest_id,
        previous_id: 0,
    }));

    while let Some(ByEstimate(current)) = open.pop_last() {
        tracing::trace!(
            id = current.id,
            cost = ?current.cost,
            estimate = ?current.estimate,
            expanded = closed.len(),
            open = open.len(),
            "expanding node"
        );

        if is_end(&current.node) {
            let cost = current.cost;
            let nodes = rebuild_path(current, &closed);
            tracing::debug!(?cost, steps = nodes.len(), expanded = closed.len(), "path found");
            return Some(Path { nodes, cost });
        }

        for next in next_nodes(&current.node) {
            if closed.iter().any(|seen| seen.0.node == next) {
                continue;
            }
            let next_cost = current.cost + cost(&current.node, &next);
            let estimate = next_cost + heuristic(&next);
            latest_id += 1;
            open.insert(ByEstimate(SearchNode {
                node: next,
                cost: next_cost,
                estimate,
                id: latest_id,
                previous_id: current.id,
            }));
        }

        closed.insert(ById(current));
    }

    tracing::debug!(expanded = closed.len(), "no path found");
    None
}

/// Follows `previous_id` links from `last` back to the start node.
fn rebuild_path<Node: Clone, Cost>(
    last: SearchNode<Node, Cost>,
    closed: &SortedVec<ById<Node, Cost>, INLINE_NODES>,
) -> Vec<Node> {
    let mut previous = last.previous_id;
    let mut nodes = vec![last.node];
    while previous != 0 {
        let Ok(at) = closed.binary_search_by_key(&previous, |entry| entry.0.id) else {
            unreachable!("node {previous} was linked before it was expanded");
        };
        let entry = &closed[at].0;
        nodes.push(entry.node.clone());
        previous = entry.previous_id;
    }
    nodes.reverse();
    nodes
}
