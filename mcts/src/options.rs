use std::str::FromStr;

use anyhow::{bail, Context, Result};
use common::{Config, ConfigLoader};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::SelectionStrategies;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Worker threads sharing the tree.
    pub threads: usize,
    /// Selection, expansion, evaluation and backpropagation cycles per search.
    pub iterations: usize,
    /// Base seed; worker `i` seeds its generator from `seed` and `i`.
    pub seed: u64,
    /// Strategy name followed by `key=value` overrides.
    pub selection: Vec<String>,
    /// Source of the value substituted for children that have not been expanded.
    pub unvisited_value: UnvisitedValue,
}

/// Where a node's unvisited-child value estimate comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnvisitedValue {
    /// Keep the estimate the evaluator supplied when the node was created.
    #[default]
    Evaluator,
    /// After each cycle, replace the estimate with the node's own mean for the agent to move.
    ParentMean,
}

impl FromStr for UnvisitedValue {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "evaluator" => Ok(Self::Evaluator),
            "parent" | "parentmean" | "parent_mean" => Ok(Self::ParentMean),
            _ => bail!("Unknown unvisited value source \"{}\"", s),
        }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            iterations: 800,
            seed: 0,
            selection: vec!["UCB1".to_string()],
            unvisited_value: UnvisitedValue::default(),
        }
    }
}

impl SearchOptions {
    pub fn selection_strategy(&self) -> Result<SelectionStrategies> {
        let tokens = self.selection.iter().map(String::as_str).collect_vec();
        SelectionStrategies::from_tokens(&tokens)
            .with_context(|| {
                format!("Invalid selection setting: \"{}\"", self.selection.iter().join(" "))
            })
    }
}

impl Config for SearchOptions {
    fn load(config: &ConfigLoader) -> Result<Self> {
        let defaults = Self::default();
        let unvisited_value = match config.get("unvisited_value").and_then(|v| v.as_string()) {
            Some(value) => value.parse().context("Invalid unvisited_value setting")?,
            None => defaults.unvisited_value,
        };

        Ok(Self {
            threads: config
                .get("threads")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.threads)
                .max(1),
            iterations: config
                .get("iterations")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.iterations),
            seed: config
                .get("seed")
                .and_then(|v| v.as_u64())
                .unwrap_or(defaults.seed),
            selection: config
                .get("selection")
                .and_then(|v| v.as_string_list())
                .filter(|tokens| !tokens.is_empty())
                .unwrap_or(defaults.selection),
            unvisited_value,
        })
    }
}
