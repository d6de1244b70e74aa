// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — runs the full pipeline: fetch the MultiNLI
//                   corpus, fine-tune the genre classifier,
//                   evaluate on the held-out split, persist the
//                   metrics report
//   2. `classify` — loads a trained checkpoint and predicts the
//                   genre of a single sentence

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{ClassifyArgs, Commands, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "mnli-genre",
    version = "0.1.0",
    about = "Fine-tune a transformer genre classifier on MultiNLI, then classify sentences."
)]
pub struct Cli {
    /// The subcommand to run (train or classify)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    /// The handlers are associated functions: matching moves the args
    /// out of `self.command`, so no `&self` can exist afterwards.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => Self::run_train(args),
            Commands::Classify(args) => Self::run_classify(args),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::{TrainConfig, TrainUseCase};

        tracing::info!("Starting training run, data dir: {}", args.data_dir);

        // Convert CLI args → application config (separates presentation from domain)
        let config: TrainConfig = args.into();
        config.validate()?;

        let use_case = TrainUseCase::new(config);
        let summary  = use_case.execute()?;

        println!(
            "Training complete. accuracy={:.4} macro_f1={:.4}",
            summary.accuracy, summary.macro_f1,
        );
        Ok(())
    }

    /// Handles the `classify` subcommand.
    /// Loads the model from checkpoint and prints the predicted genre.
    fn run_classify(args: ClassifyArgs) -> Result<()> {
        use crate::application::classify_use_case::ClassifyUseCase;

        let use_case = ClassifyUseCase::new(args.checkpoint_dir)?;

        let (genre, confidence) = use_case.classify(&args.text)?;
        println!("\nGenre: {} (confidence {:.1}%)", genre, confidence * 100.0);
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_subcommand_moves_its_args_out() {
        // Dispatch consumes self.command by value — parsing then
        // matching must hand the args over without a lingering borrow
        let cli = Cli::parse_from(["mnli-genre", "train", "--quick", "--epochs", "2"]);
        match cli.command {
            Commands::Train(args) => {
                assert!(args.quick);
                assert_eq!(args.epochs, 2);
            }
            _ => panic!("expected the train subcommand"),
        }
    }

    #[test]
    fn test_classify_subcommand_requires_text() {
        assert!(Cli::try_parse_from(["mnli-genre", "classify"]).is_err());

        let cli = Cli::parse_from(["mnli-genre", "classify", "--text", "A dog ran."]);
        match cli.command {
            Commands::Classify(args) => {
                assert_eq!(args.text, "A dog ran.");
                assert_eq!(args.checkpoint_dir, "checkpoints");
            }
            _ => panic!("expected the classify subcommand"),
        }
    }
}
