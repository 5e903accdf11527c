use clap::Parser;
use kaihen::data::{self, ContextDocument};
use kaihen::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// A data-driven recipe modification engine CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the recipe dataset JSON file (an array of recipe documents)
    recipes_path: String,

    /// Path to the rule documents: a directory of .json files, or a single file
    rules_path: String,

    /// Optional path to a component/tag context JSON file
    #[arg(short, long)]
    context: Option<String>,

    /// Print every recipe after modification
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let load_start = Instant::now();
    let collection = data::dataset_from_file(&cli.recipes_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load recipes from '{}': {}",
            &cli.recipes_path, e
        ))
    });

    let mut context = match &cli.context {
        Some(path) => ContextDocument::from_file(path)
            .unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to load context from '{}': {}", path, e))
            })
            .into_context(),
        None => InMemoryContext::new(),
    };
    // Components the dataset itself mentions don't need to be listed twice.
    data::register_dataset_components(&mut context, &collection);

    let rule_documents = load_rule_documents(&cli.rules_path);
    let load_duration = load_start.elapsed();

    println!(
        "Loaded {} recipes and {} rule documents in {:?}",
        collection.len(),
        rule_documents.len(),
        load_duration
    );

    // --- 2. Rule Parsing and Application ---
    let apply_start = Instant::now();
    let mut engine = Engine::new(RuleRegistry::with_defaults(), Arc::new(context));

    let failures = engine.load_ruleset_documents(rule_documents);
    for (id, error) in &failures {
        eprintln!("  ! rule document '{}' failed to parse: {}", id, error);
    }

    engine.dataset_loaded(collection);
    let apply_duration = apply_start.elapsed();

    let summary = engine
        .last_pass_summary()
        .unwrap_or_else(|| exit_with_error("Application pass did not run"));

    // --- 3. Results and Summary ---
    println!("\n--- Application Summary ---");
    println!("Recipes:            {}", summary.recipes);
    println!("Rule applications:  {}", summary.rule_applications);
    println!("Recipes removed:    {}", summary.removed);
    println!("Failed documents:   {}", failures.len());
    println!("Pass duration:      {:?}", summary.elapsed);

    if cli.verbose {
        println!("\n--- Modified Dataset ---");
        let mut recipes: Vec<&Recipe> = engine
            .recipes()
            .unwrap_or_else(|e| exit_with_error(&format!("{}", e)))
            .collect();
        recipes.sort_by_key(|r| r.id().clone());

        for recipe in recipes {
            let produced =
                engine.resolve_result(recipe, recipe.default_result().clone(), None);
            println!("{} -> {:?}", recipe.id(), produced);
            for ingredient in recipe.inputs() {
                println!("    {:?}", ingredient);
            }
        }
    }

    println!("\nTotal Execution:    {:?}", total_start.elapsed());
}

/// Collects `(document id, JSON tree)` pairs from a rules directory or a
/// single rules file. Document ids are derived from file stems.
fn load_rule_documents(path: &str) -> Vec<(Identifier, serde_json::Value)> {
    let path = Path::new(path);
    let files: Vec<PathBuf> = if path.is_dir() {
        let entries = fs::read_dir(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to read rules directory '{}': {}", path.display(), e))
        });
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    files
        .into_iter()
        .map(|file| {
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unnamed".to_string());
            let content = fs::read_to_string(&file).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read '{}': {}", file.display(), e))
            });
            let doc = serde_json::from_str(&content).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to parse '{}': {}", file.display(), e))
            });
            (Identifier::new("rules", stem), doc)
        })
        .collect()
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
