use assert_approx_eq::assert_approx_eq;

use crate::counting_game::{
    CountingAction, CountingAnalyzer, CountingGameEngine, CountingGameState,
};
use crate::{SearchOptions, SelectionStrategies, SelectionStrategy, UnvisitedValue, MCTS};

fn options(selection: &[&str], iterations: usize, threads: usize) -> SearchOptions {
    SearchOptions {
        threads,
        iterations,
        seed: 7,
        selection: selection.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

fn run(
    selection: &[&str],
    iterations: usize,
    threads: usize,
    state: &CountingGameState,
) -> crate::SearchTree<CountingAction> {
    let engine = CountingGameEngine::new();
    let analyzer = CountingAnalyzer::new();
    let options = options(selection, iterations, threads);
    let strategy = options.selection_strategy().unwrap();

    MCTS::new(&engine, &analyzer, strategy, options)
        .search(state)
        .unwrap()
}

#[test]
fn test_ucb1_chooses_increment() {
    let tree = run(&["UCB1"], 800, 1, &CountingGameState::initial());

    assert_eq!(tree.best_action(), Some(CountingAction::Increment));
}

#[test]
fn test_ag0_chooses_increment() {
    let tree = run(&["AG0"], 800, 1, &CountingGameState::initial());

    assert_eq!(tree.best_action(), Some(CountingAction::Increment));
}

#[test]
fn test_second_agent_chooses_decrement() {
    let state = CountingGameState {
        count: 5,
        move_number: 1,
    };
    let tree = run(&["UCB1"], 800, 1, &state);

    assert_eq!(tree.best_action(), Some(CountingAction::Decrement));
}

#[test]
fn test_takes_immediate_win() {
    let tree = run(&["UCB1"], 200, 1, &CountingGameState::from_count(9));

    assert_eq!(tree.best_action(), Some(CountingAction::Increment));
    let metrics = tree.root_metrics();
    assert_approx_eq!(metrics.children[0].value(), 1.0);
}

#[test]
fn test_single_thread_is_deterministic() {
    let first = run(&["UCB1-GRAVE"], 300, 1, &CountingGameState::initial());
    let second = run(&["UCB1-GRAVE"], 300, 1, &CountingGameState::initial());

    assert_eq!(first.root_metrics(), second.root_metrics());
    assert_eq!(first.len(), second.len());
}

#[test]
fn test_root_visits_equal_iterations() {
    for threads in [1, 4] {
        let tree = run(&["UCB1"], 500, threads, &CountingGameState::initial());
        let metrics = tree.root_metrics();

        assert_eq!(metrics.visits, 500);
        assert_eq!(metrics.children.iter().map(|c| c.visits()).sum::<usize>(), 500);
    }
}

#[test]
fn test_virtual_visits_return_to_zero() {
    let tree = run(&["NoisyAG0"], 400, 4, &CountingGameState::initial());

    for i in 0..tree.len() {
        let node = tree.node(crate::NodeId::from_u32(i as u32));
        assert_eq!(node.virtual_visits(), 0);
    }
}

#[test]
fn test_terminal_root_is_revisited() {
    let tree = run(&["UCB1"], 10, 2, &CountingGameState::from_count(10));

    assert_eq!(tree.root_node().visits(), 10);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.best_action(), None);
}

#[test]
fn test_every_strategy_completes_a_search() {
    let names = [
        "UCB1",
        "UCB1Tuned",
        "UCB1AlphaBeta",
        "AG0",
        "NoisyAG0",
        "ExIt",
        "ProgressiveBias",
        "ProgressiveHistory",
        "MC-GRAVE",
        "UCB1-GRAVE",
        "MC-BRAVE",
        "RegPolOpt",
    ];

    for name in names {
        let tree = run(&[name], 200, 2, &CountingGameState::initial());
        assert_eq!(tree.root_node().visits(), 200, "{}", name);
    }
}

#[test]
fn test_grave_tables_are_filled_only_when_requested() {
    let with_grave = run(&["MC-GRAVE"], 100, 1, &CountingGameState::initial());
    let without = run(&["UCB1"], 100, 1, &CountingGameState::initial());

    assert!(!with_grave.root_node().grave_stats().is_empty());
    assert!(without.root_node().grave_stats().is_empty());
    assert!(without.global_stats().is_empty());
}

#[test]
fn test_progressive_history_fills_global_table() {
    let tree = run(&["ProgressiveHistory"], 100, 1, &CountingGameState::initial());

    assert!(!tree.global_stats().is_empty());
    assert!(tree.root_node().grave_stats().is_empty());
}

#[test]
fn test_customised_strategy_is_used() {
    let options = options(&["UCB1", "explorationconstant=0"], 50, 1);

    match options.selection_strategy().unwrap() {
        SelectionStrategies::Ucb1(ucb1) => {
            assert_eq!(ucb1.options().exploration_constant, 0.0);
            assert_eq!(ucb1.name(), "UCB1");
        }
        other => panic!("unexpected strategy {:?}", other),
    }
}

#[test]
fn test_unvisited_value_follows_parent_mean() {
    let engine = CountingGameEngine::new();
    let analyzer = CountingAnalyzer::new();
    let options = SearchOptions {
        unvisited_value: UnvisitedValue::ParentMean,
        ..options(&["UCB1"], 300, 1)
    };
    let strategy = options.selection_strategy().unwrap();
    let tree = MCTS::new(&engine, &analyzer, strategy, options)
        .search(&CountingGameState::initial())
        .unwrap();

    // The last cycle passes through the root after every other update.
    let root = tree.root_node();
    assert_approx_eq!(root.unvisited_value_estimate(), root.exploitation_score(0));
    assert_ne!(root.unvisited_value_estimate(), 0.0);
}

#[test]
fn test_evaluator_estimate_is_kept_by_default() {
    let tree = run(&["UCB1"], 300, 1, &CountingGameState::initial());

    assert_eq!(tree.root_node().unvisited_value_estimate(), 0.0);
    assert!(tree.max_depth() > 1);
}
