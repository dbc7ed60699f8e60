use structopt::*;
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use discern::{ClassifierKind, DatasetFormat, Dataset};
use discern::sample::load_path;
use discern::validate::{self, ValidationConfig, ValidationReport};

/// Train and cross-validate classifiers over labeled CSV datasets
#[derive(StructOpt, Debug)]
pub struct Discern {

    /// Log every fold and every tree split
    #[structopt(short, long, global = true)]
    verbose : bool,

    #[structopt(subcommand)]
    cmd : Command

}

#[derive(StructOpt, Debug)]
pub enum Command {

    /// Cross-validates one classifier (or all of them) over a dataset, printing
    /// the tally of correct, incorrect and undecided outcomes.
    Validate {
        path : PathBuf,

        /// Dataset layout (iris, wine, heart, zoo or generic)
        #[structopt(short, long, default_value = "generic")]
        format : DatasetFormat,

        /// Classifier kind (optimal, naive, linear, tree) or "all"
        #[structopt(short, long, default_value = "all")]
        model : String,

        /// Number of folds
        #[structopt(short = "k", long, default_value = "10")]
        folds : usize,

        /// Use one fold per row, ignoring --folds
        #[structopt(long)]
        loo : bool,

        /// Shuffle rows with this seed before splitting
        #[structopt(short, long)]
        seed : Option<u64>,

        /// Print the full reports as JSON
        #[structopt(long)]
        json : bool
    },

    /// Grows a decision tree over the whole dataset and writes it in dot format.
    Tree {
        path : PathBuf,

        #[structopt(short, long, default_value = "generic")]
        format : DatasetFormat,

        #[structopt(short)]
        output : Option<PathBuf>
    }

}

fn parse_kinds(model : &str) -> Result<Vec<ClassifierKind>> {
    if model.eq_ignore_ascii_case("all") {
        return Ok(ClassifierKind::ALL.to_vec());
    }
    model.parse::<ClassifierKind>()
        .map(|kind| vec![kind] )
        .map_err(|e| anyhow::anyhow!(e) )
}

fn validation_config(folds : usize, loo : bool, seed : Option<u64>) -> Result<ValidationConfig> {
    let config = if loo {
        ValidationConfig::new().leave_one_out()
    } else if folds < 2 {
        bail!("Number of folds should be at least two");
    } else {
        ValidationConfig::new().with_folds(folds)
    };
    Ok(match seed {
        Some(seed) => config.with_seed(seed),
        None => config
    })
}

fn open_dataset(path : &PathBuf, format : DatasetFormat) -> Result<Dataset> {
    load_path(path, format)
        .with_context(|| format!("Error opening dataset {}", path.display()) )
}

fn run_validation(data : &Dataset, kind : ClassifierKind, config : &ValidationConfig) -> Result<ValidationReport> {
    let n_folds = config.folds().unwrap_or(data.len());
    let pb = ProgressBar::new(n_folds as u64);
    pb.set_style(ProgressStyle::default_bar().template("{msg:>8} [{bar:40}] {pos}/{len} folds"));
    pb.set_message(kind.to_string());
    let report = validate::cross_validate(data, kind, config, |_| pb.inc(1) );
    pb.finish_and_clear();
    report.with_context(|| format!("Cross-validation of the {} classifier failed", kind) )
}

fn main() -> Result<()> {
    let discern = Discern::from_args();
    let filter = if discern.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    match discern.cmd {
        Command::Validate { path, format, model, folds, loo, seed, json } => {
            let config = validation_config(folds, loo, seed)?;
            let kinds = parse_kinds(&model)?;
            let data = open_dataset(&path, format)?;
            let mut reports = Vec::new();
            for kind in kinds {
                let report = run_validation(&data, kind, &config)?;
                if !json {
                    println!("{}", report);
                }
                reports.push(report);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            }
            Ok(())
        },
        Command::Tree { path, format, output } => {
            let data = open_dataset(&path, format)?;
            let clf = data.classifier(ClassifierKind::DecisionTree)?;
            let tree = match clf.as_tree() {
                Some(tree) => tree,
                None => bail!("Expected a decision tree")
            };
            info!(nodes = tree.node_count(), depth = tree.depth(), "tree grown");
            match output {
                Some(out) => fs::write(&out, tree.dot())
                    .with_context(|| format!("Error writing {}", out.display()) ),
                None => {
                    println!("{}", tree.dot());
                    Ok(())
                }
            }
        }
    }
}
