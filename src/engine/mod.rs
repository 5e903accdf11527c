//! The central engine: reload gating, the application pass, and the public
//! query/extension API.

mod lifecycle;

pub use lifecycle::ReloadEvent;

use crate::collection::RecipeCollection;
use crate::error::{EngineError, ParseError};
use crate::model::{AssemblyContext, ComponentStack, Identifier, Recipe, RegistryContext};
use crate::registry::{RuleRegistry, parse_ruleset_documents};
use crate::rule::{Filter, Modifier, MutationHandle, RuleSet};
use crate::transform::{ResultTransform, TransformChain};
use ahash::AHashMap;
use itertools::Itertools;
use lifecycle::ReloadState;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Diagnostics from one completed application pass.
#[derive(Debug, Clone)]
pub struct PassSummary {
    /// Recipes in the dataset when the pass started.
    pub recipes: usize,
    /// Number of (rule set, recipe) matches whose modifiers ran.
    pub rule_applications: usize,
    /// Recipes removed at the end of the pass.
    pub removed: usize,
    pub elapsed: Duration,
}

enum Observer {
    Dataset(Box<dyn FnOnce(&RecipeCollection) + Send>),
    PerRecipe {
        filter: Option<Filter>,
        callback: Box<dyn FnMut(&Recipe) + Send>,
    },
}

/// The recipe modification engine.
///
/// One engine instance is a process-scoped service the host owns and
/// injects; there is no ambient global state, so tests construct isolated
/// instances freely. The host drives it with [`ReloadEvent`]s; once both
/// halves of a reload cycle have arrived the engine runs a single
/// application pass over the dataset and becomes queryable.
///
/// Registration methods expect a single writer at a time (startup or pass
/// callbacks); they provide no internal locking.
pub struct Engine {
    registry: RuleRegistry,
    context: Arc<dyn RegistryContext>,
    /// Rule sets registered through the API, kept for the engine's lifetime.
    api_rulesets: Vec<RuleSet>,
    /// Rule sets from configuration documents, replaced wholesale each
    /// reload.
    config_rulesets: Vec<RuleSet>,
    state: ReloadState,
    collection: Option<RecipeCollection>,
    by_result: AHashMap<Identifier, Vec<Identifier>>,
    transforms: TransformChain,
    pending_removals: Vec<Identifier>,
    observers: Vec<Observer>,
    last_pass: Option<PassSummary>,
}

impl Engine {
    pub fn new(registry: RuleRegistry, context: Arc<dyn RegistryContext>) -> Self {
        Self {
            registry,
            context,
            api_rulesets: Vec::new(),
            config_rulesets: Vec::new(),
            state: ReloadState::AwaitingBoth,
            collection: None,
            by_result: AHashMap::new(),
            transforms: TransformChain::new(),
            pending_removals: Vec::new(),
            observers: Vec::new(),
            last_pass: None,
        }
    }

    // --- registration -----------------------------------------------------

    /// Registers a rule set to be applied on every reload, on all recipes
    /// matching its filter. API rule sets run before configuration rule
    /// sets, in registration order.
    pub fn register_ruleset(&mut self, ruleset: RuleSet) {
        self.api_rulesets.push(ruleset);
    }

    /// Registers a rule set from its parts.
    pub fn register_rules(&mut self, id: Identifier, filter: Filter, modifiers: Vec<Modifier>) {
        self.register_ruleset(RuleSet::new(id, filter, modifiers));
    }

    /// Registers a result transform for the given recipe, applied at
    /// production time after every previously registered transform.
    pub fn register_result_transform(&mut self, recipe: Identifier, transform: ResultTransform) {
        self.transforms.register(recipe.clone(), transform);
        debug!(recipe = %recipe, "Registered result transform");
    }

    /// Marks a recipe for removal at the end of the next application pass.
    pub fn mark_for_removal(&mut self, id: Identifier) {
        self.pending_removals.push(id);
    }

    /// Queues a callback to run once, at the start of the next application
    /// pass, with the freshly loaded dataset. Fired exactly once, then
    /// discarded; it is not re-fired on later reloads.
    pub fn on_dataset_ready(&mut self, callback: impl FnOnce(&RecipeCollection) + Send + 'static) {
        self.observers.push(Observer::Dataset(Box::new(callback)));
    }

    /// Queues a read-only callback to run once per recipe (optionally only
    /// recipes matching a filter) at the start of the next application
    /// pass. Fired exactly once, then discarded.
    pub fn for_each_recipe(
        &mut self,
        filter: Option<Filter>,
        callback: impl FnMut(&Recipe) + Send + 'static,
    ) {
        self.observers.push(Observer::PerRecipe {
            filter,
            callback: Box::new(callback),
        });
    }

    /// The kind tables used to deserialize rule documents, for registering
    /// new filter, selector or modifier kinds.
    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn context(&self) -> &dyn RegistryContext {
        &*self.context
    }

    // --- reload lifecycle -------------------------------------------------

    /// Feeds one reload signal into the two-phase gate. When this event
    /// completes a dataset/ruleset pair, the application pass runs before
    /// the call returns and the gate resets for the next cycle.
    pub fn handle(&mut self, event: ReloadEvent) {
        let state = std::mem::take(&mut self.state);
        let (state, completed) = state.absorb(event);
        self.state = state;

        if let Some((dataset, rulesets)) = completed {
            self.apply(dataset, rulesets);
        }
    }

    /// Convenience for [`ReloadEvent::DatasetLoaded`].
    pub fn dataset_loaded(&mut self, collection: RecipeCollection) {
        self.handle(ReloadEvent::DatasetLoaded(collection));
    }

    /// Convenience for [`ReloadEvent::RulesetLoaded`].
    pub fn rulesets_loaded(&mut self, rulesets: Vec<RuleSet>) {
        self.handle(ReloadEvent::RulesetLoaded(rulesets));
    }

    /// Parses a batch of rule set documents and feeds the result into the
    /// gate as a [`ReloadEvent::RulesetLoaded`]. Failing documents are
    /// logged under their key and returned; sibling documents still load.
    pub fn load_ruleset_documents(
        &mut self,
        documents: impl IntoIterator<Item = (Identifier, Value)>,
    ) -> Vec<(Identifier, ParseError)> {
        let (rulesets, failures) =
            parse_ruleset_documents(&self.registry, &*self.context, documents);
        self.rulesets_loaded(rulesets);
        failures
    }

    // --- queries ----------------------------------------------------------

    /// Whether the first application pass has completed and derived state
    /// is queryable.
    pub fn is_ready(&self) -> bool {
        self.last_pass.is_some()
    }

    /// Returns the recipe with the given identifier, or `None` if no such
    /// recipe is loaded.
    pub fn get_by_id(&self, id: &Identifier) -> Result<Option<&Recipe>, EngineError> {
        let collection = self.ready_collection("get recipe by ID")?;
        Ok(collection.get(id))
    }

    /// Returns every recipe whose default result is the given component.
    /// Absent components yield an empty list, never an error.
    pub fn recipes_by_result(&self, component: &Identifier) -> Result<Vec<&Recipe>, EngineError> {
        let collection = self.ready_collection("get recipes by result")?;
        Ok(self
            .by_result
            .get(component)
            .into_iter()
            .flatten()
            .filter_map(|id| collection.get(id))
            .collect())
    }

    /// Returns every recipe of the given kind.
    pub fn recipes_by_kind(&self, kind: &Identifier) -> Result<Vec<&Recipe>, EngineError> {
        let collection = self.ready_collection("get recipes by kind")?;
        Ok(collection
            .ids_by_kind(kind)
            .iter()
            .filter_map(|id| collection.get(id))
            .collect())
    }

    /// The dataset as of the last completed pass.
    pub fn recipes(&self) -> Result<impl Iterator<Item = &Recipe>, EngineError> {
        Ok(self.ready_collection("iterate recipes")?.iter())
    }

    pub fn last_pass_summary(&self) -> Option<&PassSummary> {
        self.last_pass.as_ref()
    }

    /// Resolves the result a recipe produces, folding every registered
    /// result transform over the given default in registration order.
    ///
    /// `assembly` is `None` when the result is only previewed/displayed and
    /// `Some` on a genuine production event; transforms may branch on it.
    pub fn resolve_result(
        &self,
        recipe: &Recipe,
        default: ComponentStack,
        assembly: Option<&AssemblyContext>,
    ) -> ComponentStack {
        let registered = self.transforms.registered_for(recipe.id());
        if registered > 0 && assembly.is_some() {
            debug!(recipe = %recipe.id(), "Applying {registered} result transforms");
        }
        self.transforms.resolve(recipe, default, assembly)
    }

    fn ready_collection(&self, action: &'static str) -> Result<&RecipeCollection, EngineError> {
        if !self.is_ready() {
            return Err(EngineError::NotReady { action });
        }
        self.collection
            .as_ref()
            .ok_or(EngineError::NotReady { action })
    }

    // --- application pass -------------------------------------------------

    /// Runs the application pass over a freshly completed reload pair.
    fn apply(&mut self, mut collection: RecipeCollection, rulesets: Vec<RuleSet>) {
        let started = Instant::now();

        // Derived state belongs to the previous cycle.
        self.transforms.clear();
        self.by_result.clear();
        self.config_rulesets = rulesets;

        info!(
            "Applying {} configuration rule sets, {} total",
            self.config_rulesets.len(),
            self.config_rulesets.len() + self.api_rulesets.len()
        );

        let ids: Vec<Identifier> = collection.ids().cloned().sorted().collect();
        self.fire_observers(&collection, &ids);

        let ctx: &dyn RegistryContext = &*self.context;
        let mut rule_applications = 0usize;

        for id in &ids {
            let Some(recipe) = collection.get_mut(id) else {
                continue;
            };

            let mut applied_on_recipe = 0usize;
            for ruleset in self.api_rulesets.iter().chain(self.config_rulesets.iter()) {
                if !ruleset.filter().test(recipe, ctx) {
                    continue;
                }

                for modifier in ruleset.modifiers() {
                    let mut handle = MutationHandle::new(
                        recipe,
                        ctx,
                        &mut self.transforms,
                        &mut self.pending_removals,
                    );
                    if let Err(modifier_error) = modifier.apply(&mut handle) {
                        error!(
                            ruleset = %ruleset.id(), recipe = %id, error = %modifier_error,
                            "Failed to apply modifier",
                        );
                    }
                }
                applied_on_recipe += 1;
            }

            if applied_on_recipe > 0 {
                debug!(recipe = %id, "Applied {applied_on_recipe} rule sets");
            }
            rule_applications += applied_on_recipe;
        }

        // Deletions were deferred while the dataset was being iterated.
        let mut removed = 0usize;
        for id in self.pending_removals.drain(..).unique() {
            if collection.remove(&id).is_some() {
                removed += 1;
            }
        }

        // Post-structural default results; production-time transforms are
        // resolved lazily and never baked into the index.
        for id in &ids {
            if let Some(recipe) = collection.get(id) {
                self.by_result
                    .entry(recipe.default_result().component.clone())
                    .or_default()
                    .push(recipe.id().clone());
            }
        }

        let summary = PassSummary {
            recipes: ids.len(),
            rule_applications,
            removed,
            elapsed: started.elapsed(),
        };
        info!(
            "Modified {} of {} recipes, removed {}, in {:?}",
            summary.rule_applications, summary.recipes, summary.removed, summary.elapsed
        );

        self.collection = Some(collection);
        self.last_pass = Some(summary);
    }

    fn fire_observers(&mut self, collection: &RecipeCollection, ids: &[Identifier]) {
        if self.observers.is_empty() {
            return;
        }

        let observers = std::mem::take(&mut self.observers);
        let count = observers.len();
        let ctx: &dyn RegistryContext = &*self.context;

        for observer in observers {
            match observer {
                Observer::Dataset(callback) => callback(collection),
                Observer::PerRecipe {
                    filter,
                    mut callback,
                } => {
                    for id in ids {
                        let Some(recipe) = collection.get(id) else {
                            continue;
                        };
                        if filter.as_ref().is_none_or(|f| f.test(recipe, ctx)) {
                            callback(recipe);
                        }
                    }
                }
            }
        }
        debug!("Executed {count} queued recipe observers");
    }
}
