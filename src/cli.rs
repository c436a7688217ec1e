// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The CLI stands in for the host UI: `assign` / `unassign` are the two drop
//! commands, `board` prints what a calendar view would render, and `route`
//! plans a day's stops read from a TOML file.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::Granularity;

/// Command-line arguments for `fieldsched`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fieldsched",
    version,
    about = "Calendar assignment and route sequencing for field crews.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Fieldsched.toml` in the current working directory; built-in
    /// defaults are used when that file does not exist.
    #[arg(long, value_name = "PATH", default_value = "Fieldsched.toml", global = true)]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FIELDSCHED_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse + validate the config and print it.
    Check,

    /// Print the days of a week or month window.
    Window(WindowArgs),

    /// Load and print the unscheduled pool and day buckets for a window.
    Board {
        #[command(flatten)]
        window: WindowArgs,

        /// Only show jobs for this crew id.
        #[arg(long, value_name = "ID")]
        crew: Option<u64>,
    },

    /// Assign a job to a day (drop on a calendar day).
    Assign {
        /// Job id (drag payload), e.g. `7`.
        #[arg(long, value_name = "ID")]
        job: String,

        /// Target day, `YYYY-MM-DD`.
        #[arg(long, value_name = "DATE")]
        day: NaiveDate,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Clear a job's schedule (drop on the unscheduled zone).
    Unassign {
        #[arg(long, value_name = "ID")]
        job: String,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Plan a route for the stops listed in a TOML file.
    Route {
        /// File with `[[stop]]` entries.
        #[arg(long, value_name = "PATH")]
        stops: PathBuf,

        /// Route through stops in file order instead of optimizing.
        #[arg(long)]
        standard: bool,

        /// Crew name shown in the route heading.
        #[arg(long, value_name = "NAME")]
        crew: Option<String>,

        /// Day the route is for, `YYYY-MM-DD`. Shown in the heading only.
        #[arg(long, value_name = "DATE")]
        date: Option<NaiveDate>,
    },
}

/// Which window to show.
#[derive(Debug, Clone, Default, Args)]
pub struct WindowArgs {
    /// `week` or `month`. Defaults to `[calendar].default_view`.
    #[arg(long, value_name = "VIEW")]
    pub view: Option<Granularity>,

    /// Any day inside the window, `YYYY-MM-DD`. Defaults to today.
    #[arg(long, value_name = "DATE")]
    pub anchor: Option<NaiveDate>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
