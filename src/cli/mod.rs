mod catalog;
mod lotes;
mod quote;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{data_dir, AppConfig};
use crate::services::exporter::LAYOUT_FILE_NAME;
use crate::services::{build_request, write_layout_template, QuoteDispatcher, QuoteStore};
use crate::telemetry::{self, LogTarget};
use crate::tui::{self, Launch};

use catalog::CatalogCommand;
use lotes::LotesCommand;
use quote::{CompareArgs, ExportArgs, QuoteArgs, QuoteInputArgs};

/// Car insurance quote comparator
#[derive(Parser)]
#[command(name = "cotizador")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive comparison (default). Quotes live when vehicle
    /// flags are given, otherwise shows the last saved quote.
    Tui(QuoteInputArgs),

    /// Quote every selected insurer and print the comparison
    Quote(QuoteArgs),

    /// Re-render the last saved quote
    Compare(CompareArgs),

    /// Write the last saved quote to Excel
    Export(ExportArgs),

    /// Vehicle catalog lookups
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },

    /// Bulk quoting batches
    Lotes {
        #[command(subcommand)]
        command: LotesCommand,
    },

    /// Write the empty bulk upload template
    Layout {
        /// Output file
        #[arg(long, short, default_value = LAYOUT_FILE_NAME)]
        output: PathBuf,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let config = AppConfig::load()?;

        let target = match &self.command {
            None | Some(Commands::Tui(_)) => LogTarget::File,
            Some(_) => LogTarget::Stderr,
        };
        init_logging(&config, target);

        match self.command {
            None => run_tui(&config, QuoteInputArgs::default()),
            Some(Commands::Tui(input)) => run_tui(&config, input),
            Some(Commands::Quote(args)) => Ok(args.run(&config)?),
            Some(Commands::Compare(args)) => Ok(args.run()?),
            Some(Commands::Export(args)) => Ok(args.run(&config)?),
            Some(Commands::Catalog { command }) => Ok(command.run(&config)?),
            Some(Commands::Lotes { command }) => Ok(command.run(&config)?),
            Some(Commands::Layout { output }) => {
                write_layout_template(&output)?;
                println!("Layout generado: {}", output.display());
                Ok(())
            }
        }
    }
}

fn init_logging(config: &AppConfig, target: LogTarget) {
    let result = data_dir().and_then(|dir| telemetry::init(&config.log_level, target, &dir));
    if let Err(e) = result {
        eprintln!("[cotizador] Warning: logging disabled: {}", e);
    }
}

fn run_tui(config: &AppConfig, input: QuoteInputArgs) -> anyhow::Result<()> {
    let launch = if input.is_provided() {
        let (vehicle, user) = input.forms();
        let insurers = input.insurers();
        let request = build_request(&vehicle, &user, &insurers)?;
        Launch::Live {
            dispatcher: QuoteDispatcher::new(config)?,
            request,
            vehicle,
            user,
            insurers,
        }
    } else {
        match QuoteStore::new()?.load() {
            Ok(Some(stored)) => Launch::Stored(stored),
            Ok(None) => Launch::Empty,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable last quote");
                Launch::Empty
            }
        }
    };

    tui::run(config, launch)
}
