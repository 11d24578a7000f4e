use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;

/// Summary of a searched root: its visits and the statistics of every child.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeMetrics<A> {
    /// The total number of visits of the node. Equals the number of completed simulations.
    pub visits: usize,
    /// One entry per legal action of the root, in expansion order.
    pub children: Vec<EdgeMetrics<A>>,
}

impl<A> NodeMetrics<A> {
    pub fn new(visits: usize, children: Vec<EdgeMetrics<A>>) -> Self {
        Self { visits, children }
    }

    /// The most visited child. Ties go to the child that was expanded first.
    pub fn child_max_visits(&self) -> Option<&EdgeMetrics<A>> {
        self.children.iter().fold(None, |best, child| match best {
            Some(best) if best.visits >= child.visits => Some(best),
            _ => Some(child),
        })
    }

    /// Picks a child with probability proportional to its visits. Falls back to the first
    /// child when nothing has been visited.
    pub fn sample_by_visits<R: Rng>(&self, rng: &mut R) -> Option<&EdgeMetrics<A>> {
        match WeightedIndex::new(self.children.iter().map(|c| c.visits)) {
            Ok(dist) => self.children.get(dist.sample(rng)),
            Err(_) => self.children.first(),
        }
    }

    /// Normalized child visits laid out over the full action space. Actions without a child
    /// receive exactly zero.
    pub fn policy_target<F>(&self, action_space_size: usize, action_index: F) -> Vec<f32>
    where
        F: Fn(&A) -> usize,
    {
        let mut policy = vec![0.0; action_space_size];
        let total_visits = self.children.iter().map(|c| c.visits).sum::<usize>();

        for child in &self.children {
            let index = action_index(&child.action);
            if index >= action_space_size {
                continue;
            }

            policy[index] = if total_visits == 0 {
                1.0 / self.children.len() as f32
            } else {
                child.visits as f32 / total_visits as f32
            };
        }

        policy
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeMetrics<A> {
    /// The action that this edge represents.
    pub action: A,
    /// The number of visits for the child node of this specific edge.
    pub visits: usize,
    /// Sum of backed up values, from the perspective of the player taking `action`.
    pub value_sum: f32,
    /// Normalized prior assigned when the parent was expanded.
    pub prior: f32,
}

impl<A> EdgeMetrics<A> {
    pub fn new(action: A, visits: usize, value_sum: f32, prior: f32) -> Self {
        Self {
            action,
            visits,
            value_sum,
            prior,
        }
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn visits(&self) -> usize {
        self.visits
    }

    /// Mean value of the edge, 0 when unvisited.
    pub fn q(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f32
        }
    }
}
