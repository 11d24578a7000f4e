/// Position of a node within its [`SearchTree`](crate::SearchTree).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct MCTSNode<A> {
    /// The action that led from the parent to this node. `None` only for the root.
    action: Option<A>,
    parent: Option<NodeId>,
    prior: f32,
    visits: usize,
    value_sum: f32,
    children: Vec<NodeId>,
}

impl<A> MCTSNode<A> {
    pub(crate) fn root() -> Self {
        Self::new(None, None, 1.0)
    }

    pub(crate) fn new(action: Option<A>, parent: Option<NodeId>, prior: f32) -> Self {
        Self {
            action,
            parent,
            prior,
            visits: 0,
            value_sum: 0.0,
            children: Vec::new(),
        }
    }

    pub fn action(&self) -> Option<&A> {
        self.action.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn prior(&self) -> f32 {
        self.prior
    }

    pub fn visits(&self) -> usize {
        self.visits
    }

    /// Sum of backed up values, from the perspective of the player who took `action`.
    pub fn value_sum(&self) -> f32 {
        self.value_sum
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Mean backed up value, 0 while unvisited.
    pub fn q(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f32
        }
    }

    pub(crate) fn set_children(&mut self, children: Vec<NodeId>) {
        debug_assert!(self.children.is_empty(), "children are only populated once");
        self.children = children;
    }

    pub(crate) fn record(&mut self, value: f32) {
        self.visits += 1;
        self.value_sum += value;
    }
}
