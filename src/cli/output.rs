//! Output formatting for the evaluation report.

use crate::cli::args::{OutputFormat, TriageArgs};
use crate::error::Result;
use crate::ml::metrics::{CategoryReport, EvaluationSummary};

/// Render the evaluation summary in the configured format.
pub fn output_summary(summary: &EvaluationSummary, args: &TriageArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            output_human(summary, args);
            Ok(())
        }
        OutputFormat::Json => output_json(summary, args),
    }
}

/// Classification reports per category plus aggregate lines.
fn output_human(summary: &EvaluationSummary, args: &TriageArgs) {
    if args.verbosity() == 0 {
        return;
    }

    for report in &summary.categories {
        println!("{} accuracy: {:.5}", report.category, report.accuracy);
        print_classification_report(report);
        println!();
    }

    println!("total accuracy {:.5}", summary.mean_accuracy);
    println!("total f1 {:.5}", summary.mean_weighted_f1);
}

/// Per-class precision/recall/F1/support table for one category.
fn print_classification_report(report: &CategoryReport) {
    let total = report.negative.support + report.positive.support;

    println!("{:>14} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support");
    for (label, class) in [("0", &report.negative), ("1", &report.positive)] {
        println!(
            "{:>14} {:>9.3} {:>9.3} {:>9.3} {:>9}",
            label, class.precision, class.recall, class.f1, class.support
        );
    }

    let macro_precision = (report.negative.precision + report.positive.precision) / 2.0;
    let macro_recall = (report.negative.recall + report.positive.recall) / 2.0;
    let macro_f1 = (report.negative.f1 + report.positive.f1) / 2.0;

    println!("{:>14} {:>9} {:>9} {:>9.3} {:>9}", "accuracy", "", "", report.accuracy, total);
    println!(
        "{:>14} {:>9.3} {:>9.3} {:>9.3} {:>9}",
        "macro avg", macro_precision, macro_recall, macro_f1, total
    );
    println!(
        "{:>14} {:>9.3} {:>9.3} {:>9.3} {:>9}",
        "weighted avg",
        weighted(report, |c| c.precision),
        weighted(report, |c| c.recall),
        report.weighted_f1,
        total
    );
}

/// Support-weighted mean of a per-class metric.
fn weighted(report: &CategoryReport, metric: impl Fn(&crate::ml::metrics::ClassMetrics) -> f64) -> f64 {
    let total = (report.negative.support + report.positive.support) as f64;
    if total == 0.0 {
        return 0.0;
    }
    (report.negative.support as f64 * metric(&report.negative)
        + report.positive.support as f64 * metric(&report.positive))
        / total
}

/// JSON rendering of the summary.
fn output_json(summary: &EvaluationSummary, args: &TriageArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(summary)?
    } else {
        serde_json::to_string(summary)?
    };
    println!("{json}");
    Ok(())
}
