use anyhow::{anyhow, Result};
use common::softmax;
use engine::engine::{result_for_player, GameEngine};
use log::{debug, warn};
use model::{NodeMetrics, Predictor};
use rand::thread_rng;
use rand::prelude::Distribution;
use rand_distr::Dirichlet;
use rayon::prelude::*;

use super::node::NodeId;
use super::options::{DirichletOptions, MCTSOptions};
use super::tree::SearchTree;

/// Outcome of evaluating the leaf a simulation stopped at.
enum LeafValue {
    /// Value from the perspective of the player who moved into the leaf.
    Value(f32),
    /// The leaf could not be expanded. Nothing in the tree was changed.
    Abandoned,
}

/// PUCT search over a fresh tree per call, guided by a [`Predictor`].
pub struct MCTS<'a, E, P> {
    options: MCTSOptions,
    game_engine: &'a E,
    predictor: &'a P,
}

impl<'a, E, P> MCTS<'a, E, P>
where
    E: GameEngine,
    E::State: Clone,
    E::Action: Clone,
    P: Predictor,
{
    pub fn new(options: MCTSOptions, game_engine: &'a E, predictor: &'a P) -> Self {
        Self {
            options,
            game_engine,
            predictor,
        }
    }

    /// Runs `simulations` simulations from `game_state` and summarizes the root.
    ///
    /// Returns `None` when the root has no legal moves, which callers treat as terminal.
    pub fn search(
        &self,
        game_state: &E::State,
        simulations: usize,
    ) -> Result<Option<NodeMetrics<E::Action>>> {
        Ok(self
            .search_tree(game_state, simulations)?
            .map(|tree| tree.root_metrics()))
    }

    /// Like [`search`](Self::search) but hands back the whole tree.
    pub fn search_tree(
        &self,
        game_state: &E::State,
        simulations: usize,
    ) -> Result<Option<SearchTree<E::Action>>> {
        if self.game_engine.is_terminal(game_state) {
            return Ok(None);
        }

        let mut tree = SearchTree::new();
        let root = tree.root();

        match self.expand(&mut tree, root, game_state)? {
            LeafValue::Abandoned => {
                return Err(anyhow!("Root expansion requested an action outside the policy"))
            }
            LeafValue::Value(_) if !tree.node(root).is_expanded() => return Ok(None),
            LeafValue::Value(_) => {}
        }

        let mut abandoned = 0;
        for _ in 0..simulations {
            if !self.simulate(&mut tree, game_state)? {
                abandoned += 1;
            }
        }

        if abandoned > 0 {
            warn!("Abandoned {} of {} simulations", abandoned, simulations);
        }

        debug!(
            "Searched {} simulations into {} nodes",
            tree.root_visits(),
            tree.len()
        );

        Ok(Some(tree))
    }

    /// One selection, expansion and backup pass. Returns false if the simulation was
    /// abandoned without changing the tree.
    fn simulate(&self, tree: &mut SearchTree<E::Action>, root_state: &E::State) -> Result<bool> {
        let mut node = tree.root();
        let mut game_state = root_state.clone();

        while let Some(child) = tree.select_child(node, self.options.cpuct) {
            if let Some(action) = tree.node(child).action() {
                game_state = self.game_engine.take_action(&game_state, action);
            }
            node = child;
        }

        match self.expand(tree, node, &game_state)? {
            LeafValue::Value(value) => {
                tree.backup(node, value);
                Ok(true)
            }
            LeafValue::Abandoned => Ok(false),
        }
    }

    /// Evaluates the leaf and, if it is not terminal, creates its children with priors
    /// softmaxed over the legal actions only.
    fn expand(
        &self,
        tree: &mut SearchTree<E::Action>,
        node: NodeId,
        game_state: &E::State,
    ) -> Result<LeafValue> {
        let player_to_move = self.game_engine.player_to_move(game_state);

        if self.game_engine.is_terminal(game_state) {
            let result = self.game_engine.result(game_state).unwrap_or(0.0);
            return Ok(LeafValue::Value(-result_for_player(result, player_to_move)));
        }

        let legal_actions = self.game_engine.legal_actions(game_state);
        if legal_actions.is_empty() {
            warn!("Non terminal state has no legal actions, scoring it as a draw");
            return Ok(LeafValue::Value(0.0));
        }

        let prediction = self.predictor.predict(&self.game_engine.encode(game_state))?;
        let policy_size = self
            .game_engine
            .action_space_size()
            .min(prediction.logits.len());

        let mut legal_logits = Vec::with_capacity(legal_actions.len());
        for action in &legal_actions {
            let index = self.game_engine.action_index(action);
            if index >= policy_size {
                warn!(
                    "Action index {} is outside of the policy of size {}, abandoning simulation",
                    index, policy_size
                );
                return Ok(LeafValue::Abandoned);
            }

            legal_logits.push(prediction.logits[index]);
        }

        let mut priors = softmax(&legal_logits, 1.0);

        if node == tree.root() {
            if let Some(dirichlet) = self.options.dirichlet() {
                priors = apply_dirichlet_noise(priors, dirichlet)?;
            }
        }

        tree.expand(node, legal_actions.into_iter().zip(priors).collect());

        Ok(LeafValue::Value(-prediction.value))
    }
}

impl<'a, E, P> MCTS<'a, E, P>
where
    E: GameEngine + Sync,
    E::State: Clone + Sync,
    E::Action: Clone + Send,
    P: Predictor + Sync,
{
    /// Splits `simulations` across `threads` independent trees and sums their root statistics.
    /// Each tree is owned by exactly one thread.
    pub fn search_parallel(
        &self,
        game_state: &E::State,
        simulations: usize,
        threads: usize,
    ) -> Result<Option<NodeMetrics<E::Action>>> {
        let threads = threads.max(1).min(simulations.max(1));

        if threads == 1 {
            return self.search(game_state, simulations);
        }

        let results = (0..threads)
            .into_par_iter()
            .map(|thread| {
                let share = simulations / threads + usize::from(thread < simulations % threads);
                self.search(game_state, share)
            })
            .collect::<Result<Vec<_>>>()?;

        merge_root_metrics(results)
    }
}

/// Sums the visits and values of matching root children. Priors are averaged.
fn merge_root_metrics<A>(results: Vec<Option<NodeMetrics<A>>>) -> Result<Option<NodeMetrics<A>>> {
    let mut results = results.into_iter();
    let mut merged = match results.next().flatten() {
        Some(metrics) => metrics,
        None => return Ok(None),
    };
    let mut trees = 1;

    for metrics in results {
        let metrics = metrics.ok_or_else(|| anyhow!("Parallel searches disagree on terminal root"))?;

        if metrics.children.len() != merged.children.len() {
            return Err(anyhow!(
                "Parallel searches expanded {} and {} root children",
                merged.children.len(),
                metrics.children.len()
            ));
        }

        merged.visits += metrics.visits;
        for (total, child) in merged.children.iter_mut().zip(metrics.children) {
            total.visits += child.visits;
            total.value_sum += child.value_sum;
            total.prior += child.prior;
        }

        trees += 1;
    }

    for child in merged.children.iter_mut() {
        child.prior /= trees as f32;
    }

    Ok(Some(merged))
}

fn apply_dirichlet_noise(priors: Vec<f32>, dirichlet: &DirichletOptions) -> Result<Vec<f32>> {
    let num_actions = priors.len();

    // Do not apply noise if there is only one action.
    if num_actions < 2 {
        return Ok(priors);
    }

    let e = dirichlet.epsilon;
    let noise = Dirichlet::new_with_size(dirichlet.alpha, num_actions)
        .map_err(|err| anyhow!("Invalid dirichlet alpha {}: {:?}", dirichlet.alpha, err))?
        .sample(&mut thread_rng());

    Ok(noise
        .into_iter()
        .zip(priors)
        .map(|(noise, prior)| (1.0 - e) * prior + e * noise)
        .collect())
}
