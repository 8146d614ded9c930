//! winela: launch registered executables through a wrapper program.
//!
//! This is the entry point of the application. It parses command-line
//! arguments, opens the on-disk store and dispatches to the launcher or to
//! one of the registry and configuration maintenance commands.

mod command;
mod config;
mod launcher;
mod output;
mod registry;
mod store;

use std::future::Future;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::builder::styling::{AnsiColor, Effects, Style};
use clap::builder::Styles;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use crate::launcher::{LaunchMode, Launcher};
use crate::output::OutputLine;
use crate::registry::Entry;
use crate::store::Store;

/// Command-line interface definition.
#[derive(Debug, Parser)]
#[command(
    name = "winela",
    version,
    about = "Launch registered executables through wine or another wrapper",
    styles = help_styles()
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Directory holding winelarc and wineladb (default: <config dir>/winela).
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the numbered list of entries.
    List,
    /// Launch the entry with the given number.
    Run {
        /// 1-based entry number as shown by `list`.
        #[arg(allow_negative_numbers = true)]
        ordinal: i64,
        /// Start the process and return without streaming its output.
        #[arg(long)]
        fork: bool,
    },
    /// Append an entry to the list.
    Add {
        /// Display name.
        name: String,
        /// Path passed to the program; relative paths resolve against DefaultDir.
        path: String,
    },
    /// Remove the entry with the given number.
    Remove {
        #[arg(allow_negative_numbers = true)]
        ordinal: i64,
    },
    /// Show or update the launch configuration.
    Config {
        /// Wrapper program used to run entries.
        #[arg(long)]
        program: Option<String>,
        /// Single argument inserted before the entry path ("" for none).
        #[arg(long = "args", allow_hyphen_values = true)]
        program_args: Option<String>,
        /// Directory that relative entry paths resolve against.
        #[arg(long)]
        default_dir: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("warn");
    env_logger::init_from_env(env);

    let cli = Cli::parse();
    let base_dir = match cli.config_dir {
        Some(dir) => dir,
        None => store::default_base_dir()
            .ok_or_else(|| anyhow!("could not determine the user config directory"))?,
    };
    let mut store = Store::open(&base_dir)?;

    match cli.command {
        Commands::List => {
            if store.registry.is_empty() {
                eprintln!("no entries yet (add one with `winela add <name> <path>`)");
            }
            print!("{}", store.registry.format_listing());
        }
        Commands::Run { ordinal, fork } => {
            let mode = if fork {
                LaunchMode::Detach
            } else {
                LaunchMode::Attach
            };
            let launcher = Launcher::new(store.config.clone(), store.registry.clone());
            run_entry(&launcher, ordinal, mode, tokio::signal::ctrl_c()).await?;
        }
        Commands::Add { name, path } => {
            let path = store.resolve_entry_path(&path);
            store.registry.push(Entry { name, path });
            store.save_registry()?;
            print!("{}", store.registry.format_listing());
        }
        Commands::Remove { ordinal } => {
            let removed = store.registry.remove(ordinal)?;
            store.save_registry()?;
            println!("removed {}", removed.name);
        }
        Commands::Config {
            program,
            program_args,
            default_dir,
        } => {
            let changed = program.is_some() || program_args.is_some() || default_dir.is_some();
            store.config.update(program, program_args, default_dir)?;
            if changed {
                store.save_config()?;
            }
            print!(
                "{}",
                toml::to_string(&store.config).context("failed to render config")?
            );
        }
    }
    Ok(())
}

// Print captured lines while the launch runs. When `interrupt` resolves first
// the printer is aborted and the drains are left behind with the child.
async fn run_entry<F>(launcher: &Launcher, ordinal: i64, mode: LaunchMode, interrupt: F) -> Result<()>
where
    F: Future,
{
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<OutputLine>();
    let printer = tokio::spawn(async move {
        while let Some(line) = line_rx.recv().await {
            println!("{}", line);
        }
    });

    tokio::select! {
        result = launcher.launch(ordinal, mode, line_tx) => {
            if let Err(err) = result {
                printer.abort();
                return Err(err.into());
            }
        }
        _ = interrupt => {
            printer.abort();
            log::warn!("interrupted while attached to entry {}", ordinal);
            bail!("interrupted while running entry {}", ordinal);
        }
    }

    printer.await.context("output printer failed")?;
    Ok(())
}

fn help_styles() -> Styles {
    Styles::styled()
        .header(
            Style::new()
                .fg_color(Some(AnsiColor::Cyan.into()))
                .effects(Effects::BOLD),
        )
        .usage(
            Style::new()
                .fg_color(Some(AnsiColor::Green.into()))
                .effects(Effects::BOLD),
        )
        .literal(Style::new().fg_color(Some(AnsiColor::Yellow.into())))
        .placeholder(Style::new().fg_color(Some(AnsiColor::Magenta.into())))
}
