use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{anyhow, bail, Result};
use engine::{GameEngine, Value};
use itertools::Itertools;
use log::debug;
use model::{AnalysisRequest, Evaluator, PlayoutMove};

use crate::{
    BackpropagationStrategy, ExpansionFlags, MonteCarloBackpropagation, NodeInit, SearchAction,
    SearchContext, SearchOptions, SearchTree, SelectionStrategy, UnvisitedValue,
};

/// Runs selection, expansion, evaluation and backpropagation cycles over a shared tree.
///
/// Each call to [`MCTS::search`] builds a fresh tree from the given state. Worker threads claim
/// cycles from a shared counter until `options.iterations` have been claimed or one of them
/// fails.
pub struct MCTS<'a, E, M, S> {
    game_engine: &'a E,
    analyzer: &'a M,
    selection: S,
    backpropagation: MonteCarloBackpropagation,
    options: SearchOptions,
}

/// A freshly created node together with the outcome backpropagated through it.
struct Expansion<A> {
    init: NodeInit<A>,
    utilities: Vec<f64>,
    playout: Vec<PlayoutMove<A>>,
}

impl<'a, St, A, E, M, S> MCTS<'a, E, M, S>
where
    St: Clone + Sync,
    A: SearchAction,
    E: GameEngine<State = St, Action = A> + Sync,
    M: Evaluator<State = St, Action = A> + Sync,
    S: SelectionStrategy,
{
    pub fn new(game_engine: &'a E, analyzer: &'a M, selection: S, options: SearchOptions) -> Self {
        let backpropagation = MonteCarloBackpropagation::new(selection.backprop_flags());

        Self {
            game_engine,
            analyzer,
            selection,
            backpropagation,
            options,
        }
    }

    pub fn selection(&self) -> &S {
        &self.selection
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn search(&self, game_state: &St) -> Result<SearchTree<A>> {
        let root = self.expand(game_state)?;
        let tree = SearchTree::new(root.init)?;

        let claimed = AtomicUsize::new(0);
        let abort = AtomicBool::new(false);
        let threads = self.options.threads.max(1);

        std::thread::scope(|s| {
            let handles = (0..threads)
                .map(|worker| {
                    let tree = &tree;
                    let claimed = &claimed;
                    let abort = &abort;
                    s.spawn(move || self.run_worker(worker, tree, game_state, claimed, abort))
                })
                .collect_vec();

            let mut first_error = None;
            for handle in handles {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        first_error.get_or_insert(err);
                    }
                    Err(_) => {
                        first_error.get_or_insert(anyhow!("Search worker panicked"));
                    }
                }
            }

            match first_error {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })?;

        debug!(
            "{}: {} cycles on {} threads, {} nodes, max depth {}",
            self.selection.name(),
            tree.root_node().visits(),
            threads,
            tree.len(),
            tree.max_depth()
        );

        Ok(tree)
    }

    /// Searches `game_state` and returns the most visited action at the root.
    pub fn select_action(&self, game_state: &St) -> Result<A> {
        self.search(game_state)?
            .best_action()
            .ok_or_else(|| anyhow!("No legal actions to select from"))
    }

    fn run_worker(
        &self,
        worker: usize,
        tree: &SearchTree<A>,
        game_state: &St,
        claimed: &AtomicUsize,
        abort: &AtomicBool,
    ) -> Result<()> {
        let mut ctx = SearchContext::from_seed(self.options.seed, worker);

        while !abort.load(Ordering::Acquire)
            && claimed.fetch_add(1, Ordering::AcqRel) < self.options.iterations
        {
            if let Err(err) = self.run_cycle(&mut ctx, tree, game_state) {
                abort.store(true, Ordering::Release);
                return Err(err);
            }
        }

        Ok(())
    }

    fn run_cycle(
        &self,
        ctx: &mut SearchContext,
        tree: &SearchTree<A>,
        game_state: &St,
    ) -> Result<()> {
        ctx.clear();

        let mut node_id = tree.root();
        let mut state = game_state.clone();
        tree.node(node_id).add_virtual_visit();
        ctx.path.push(node_id);

        let (leaf, utilities, playout) = loop {
            let node = tree.node(node_id);

            if node.num_legal_moves() == 0 {
                let value = self
                    .game_engine
                    .is_terminal_state(&state)
                    .ok_or_else(|| anyhow!("Non-terminal state has no legal actions"))?;
                break (node_id, value.utilities(), Vec::new());
            }

            let index = self.selection.select(ctx, tree, node_id)?;
            if index >= node.num_legal_moves() {
                bail!(
                    "{} selected index {} of {} legal moves",
                    self.selection.name(),
                    index,
                    node.num_legal_moves()
                );
            }

            state = self
                .game_engine
                .take_action(&state, node.legal_action(index));

            match node.child(index) {
                Some(child_id) => {
                    tree.node(child_id).add_virtual_visit();
                    ctx.path.push(child_id);
                    node_id = child_id;
                }
                None => {
                    let expansion = self.expand(&state)?;
                    let child_id = tree.add_child(node_id, index, expansion.init)?;
                    tree.node(child_id).add_virtual_visit();
                    ctx.path.push(child_id);
                    break (child_id, expansion.utilities, expansion.playout);
                }
            }
        };

        self.backpropagation.update(tree, leaf, &playout, &utilities);

        if self.options.unvisited_value == UnvisitedValue::ParentMean {
            for node_id in &ctx.path {
                let node = tree.node(*node_id);
                node.set_unvisited_value_estimate(node.exploitation_score(node.agent_to_move()));
            }
        }

        Ok(())
    }

    fn expand(&self, state: &St) -> Result<Expansion<A>> {
        let engine = self.game_engine;
        let agent_to_move = engine.agent_to_move(state);
        let num_agents = engine.num_agents();
        let depth = engine.move_number(state);
        let wants_heuristics = self
            .selection
            .expansion_flags()
            .contains(ExpansionFlags::HEURISTIC_INIT);

        if let Some(value) = engine.is_terminal_state(state) {
            let utilities = value.utilities();
            let mut init = NodeInit::new(Vec::new(), agent_to_move, num_agents, depth);
            if wants_heuristics {
                init = init.with_heuristic_values(utilities.clone());
            }

            return Ok(Expansion {
                init,
                utilities,
                playout: Vec::new(),
            });
        }

        let legal_actions = engine.legal_actions(state);
        let request = AnalysisRequest {
            heuristic_values: wants_heuristics,
        };
        let analysis = self
            .analyzer
            .get_state_analysis(state, &legal_actions, &request);

        let mut init = NodeInit::new(legal_actions, agent_to_move, num_agents, depth)
            .with_policy(analysis.policy_scores)
            .with_unvisited_value_estimate(analysis.unvisited_value_estimate);

        if let Some(heuristic_values) = analysis.heuristic_values {
            init = init.with_heuristic_values(heuristic_values);
        } else if wants_heuristics {
            bail!("Evaluator did not supply the requested heuristic estimates");
        }

        if let Some(bounds) = analysis.bounds {
            init = init.with_bounds(bounds);
        }

        Ok(Expansion {
            init,
            utilities: analysis.value_score.utilities(),
            playout: analysis.playout,
        })
    }
}
