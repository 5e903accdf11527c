//! Two-phase reload gating.
//!
//! A reload cycle delivers two independent signals: the recipe dataset
//! (from the host's data reload pipeline) and the rule set list (from
//! configuration reload, which may run concurrently). Either may arrive
//! first. The gate is an explicit state machine driven by [`ReloadEvent`]s
//! rather than a pair of polled booleans: when the second half of a pair
//! arrives, the completed pair is handed to the application pass exactly
//! once and the gate resets for the next cycle.

use crate::collection::RecipeCollection;
use crate::rule::RuleSet;
use tracing::warn;

/// A reload signal from the host.
pub enum ReloadEvent {
    /// The recipe dataset has (re)loaded.
    DatasetLoaded(RecipeCollection),
    /// The configuration rule sets have (re)loaded, replacing any previous
    /// configuration rule sets wholesale.
    RulesetLoaded(Vec<RuleSet>),
}

#[derive(Debug, Default)]
pub(super) enum ReloadState {
    #[default]
    AwaitingBoth,
    AwaitingRuleset {
        dataset: RecipeCollection,
    },
    AwaitingDataset {
        rulesets: Vec<RuleSet>,
    },
}

impl ReloadState {
    /// Absorbs one event. Returns the follow-up state and, when the event
    /// completed a pair, the dataset and rule sets to apply.
    pub(super) fn absorb(
        self,
        event: ReloadEvent,
    ) -> (Self, Option<(RecipeCollection, Vec<RuleSet>)>) {
        use ReloadEvent::*;
        use ReloadState::*;

        match (self, event) {
            (AwaitingBoth, DatasetLoaded(dataset)) => (AwaitingRuleset { dataset }, None),
            (AwaitingBoth, RulesetLoaded(rulesets)) => (AwaitingDataset { rulesets }, None),
            (AwaitingRuleset { .. }, DatasetLoaded(dataset)) => {
                warn!("Recipe dataset reloaded twice without a rule set reload in between");
                (AwaitingRuleset { dataset }, None)
            }
            (AwaitingDataset { .. }, RulesetLoaded(rulesets)) => {
                warn!("Rule sets reloaded twice without a dataset reload in between");
                (AwaitingDataset { rulesets }, None)
            }
            (AwaitingRuleset { dataset }, RulesetLoaded(rulesets)) => {
                (AwaitingBoth, Some((dataset, rulesets)))
            }
            (AwaitingDataset { rulesets }, DatasetLoaded(dataset)) => {
                (AwaitingBoth, Some((dataset, rulesets)))
            }
        }
    }
}
