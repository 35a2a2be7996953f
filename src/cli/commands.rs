//! The training pipeline driver.
//!
//! Sequences the linear pipeline: load -> split -> hyperparameter search ->
//! fit -> evaluate -> save. Progress lines go to stdout; every failure
//! propagates as a [`TriageError`] to the binary's single error handler.

use crate::cli::args::TriageArgs;
use crate::cli::output::output_summary;
use crate::corpus::{load_corpus, train_test_split};
use crate::error::{Result, TriageError};
use crate::ml::classifier::{AnalyzerSpec, MessageClassifier, TrainingOptions};
use crate::ml::forest::ForestConfig;
use crate::ml::grid_search::GridSearch;
use crate::ml::metrics::evaluate;
use crate::ml::vectorizer::TfIdfConfig;

/// Run the full training pipeline.
pub fn execute_training(args: &TriageArgs) -> Result<()> {
    let verbosity = args.verbosity();

    if args.jobs.is_some() {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.effective_jobs())
            .build_global()
            .map_err(|e| TriageError::other(format!("Cannot configure worker pool: {e}")))?;
    }

    let seed = match args.seed {
        Some(seed) => seed,
        None => {
            // Drawn once so an unseeded run can still be reproduced
            let seed = rand::random::<u64>();
            if verbosity > 0 {
                println!("Using seed {seed}");
            }
            seed
        }
    };
    if verbosity > 1 {
        println!("Using {} worker threads", args.effective_jobs());
    }

    let analyzer_spec = AnalyzerSpec {
        token_pattern: args.token_pattern.clone(),
        lexicon_path: args.lexicon.clone(),
    };
    let forest = ForestConfig {
        n_trees: args.trees,
        max_depth: args.max_depth,
        ..ForestConfig::default()
    };

    if verbosity > 0 {
        println!("Loading data...\n    DATABASE: {}", args.database_path.display());
    }
    let corpus = load_corpus(&args.database_path)?;
    if verbosity > 1 {
        println!(
            "Loaded {} messages across {} categories",
            corpus.len(),
            corpus.category_count()
        );
    }

    let (train, test) = train_test_split(&corpus, args.test_fraction, seed)?;

    if verbosity > 0 {
        println!("Building model...");
    }
    let tfidf = if args.no_grid_search {
        TfIdfConfig::default()
    } else {
        let analyzer = analyzer_spec.build()?;
        let search = GridSearch::new(args.folds)?;
        let outcome = search.search(&train, analyzer.as_ref(), &forest, seed)?;
        if verbosity > 1 {
            for entry in &outcome.scores {
                println!("    [cv] {}  score={:.5}", entry.config, entry.score);
            }
        }
        if verbosity > 0 {
            println!(
                "    Selected {} (cv score {:.5})",
                outcome.best.config, outcome.best.score
            );
        }
        outcome.best.config
    };

    if verbosity > 0 {
        println!("Training model...");
    }
    let options = TrainingOptions { tfidf, forest, seed };
    let mut model = MessageClassifier::fit(&train, analyzer_spec, &options)?;

    if verbosity > 0 {
        println!("Evaluating model...");
    }
    let predictions = model.predict(&test.messages)?;
    let summary = evaluate(&test.labels, &predictions, &test.categories)?;
    model.record_validation_metric("mean_accuracy", summary.mean_accuracy);
    model.record_validation_metric("mean_weighted_f1", summary.mean_weighted_f1);
    output_summary(&summary, args)?;

    if verbosity > 0 {
        println!("Saving model...\n    MODEL: {}", args.model_path.display());
    }
    model.save(&args.model_path)?;

    if verbosity > 0 {
        println!("Trained model saved!");
    }

    Ok(())
}
