use model::{EdgeMetrics, NodeMetrics};

use super::node::{MCTSNode, NodeId};

const VISITS_EPSILON: f32 = 1e-8;

/// The nodes of one search, stored flat and addressed by [`NodeId`]. Parents are referenced by
/// index so the tree owns every node exactly once.
#[derive(Debug)]
pub struct SearchTree<A> {
    nodes: Vec<MCTSNode<A>>,
}

impl<A> SearchTree<A> {
    pub fn new() -> Self {
        Self {
            nodes: vec![MCTSNode::root()],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &MCTSNode<A> {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root_visits(&self) -> usize {
        self.node(self.root()).visits()
    }

    /// Creates one child per `(action, prior)`. A node is expanded at most once.
    pub(crate) fn expand(&mut self, parent: NodeId, children: Vec<(A, f32)>) {
        if self.node(parent).is_expanded() {
            return;
        }

        let first = self.nodes.len();
        let ids = (first..first + children.len()).map(NodeId).collect();

        self.nodes.extend(
            children
                .into_iter()
                .map(|(action, prior)| MCTSNode::new(Some(action), Some(parent), prior)),
        );

        self.nodes[parent.0].set_children(ids);
    }

    /// The child maximizing `Q + cpuct * P * sqrt(N_parent) / (1 + N_child)`. The first
    /// maximum in expansion order wins ties.
    pub(crate) fn select_child(&self, parent: NodeId, cpuct: f32) -> Option<NodeId> {
        let parent_node = self.node(parent);
        let sqrt_parent_visits = (parent_node.visits() as f32 + VISITS_EPSILON).sqrt();

        let mut best: Option<(NodeId, f32)> = None;
        for &child_id in parent_node.children() {
            let child = self.node(child_id);
            let score = child.q()
                + cpuct * child.prior() * sqrt_parent_visits / (1.0 + child.visits() as f32);

            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_id, score)),
            }
        }

        best.map(|(id, _)| id)
    }

    /// Walks from `leaf` to the root, recording `value` and flipping its sign at every step.
    pub(crate) fn backup(&mut self, leaf: NodeId, value: f32) {
        let mut value = value;
        let mut current = Some(leaf);

        while let Some(id) = current {
            let node = &mut self.nodes[id.0];
            node.record(value);
            value = -value;
            current = node.parent();
        }
    }
}

impl<A: Clone> SearchTree<A> {
    pub fn root_metrics(&self) -> NodeMetrics<A> {
        let root = self.node(self.root());

        let children = root
            .children()
            .iter()
            .filter_map(|&id| {
                let child = self.node(id);
                child.action().map(|action| {
                    EdgeMetrics::new(action.clone(), child.visits(), child.value_sum(), child.prior())
                })
            })
            .collect();

        NodeMetrics::new(root.visits(), children)
    }
}

impl<A> Default for SearchTree<A> {
    fn default() -> Self {
        Self::new()
    }
}
