// src/lib.rs

pub mod assign;
pub mod backend;
pub mod bus;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod model;
pub mod pool;
pub mod route;
pub mod types;
pub mod view;

use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::assign::DropOutcome;
use crate::backend::{HttpBackend, JobBackend};
use crate::bus::ScheduleBus;
use crate::calendar::{CalendarWindow, compute_window, day_key};
use crate::cli::{CliArgs, Command, WindowArgs};
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::model::{CrewId, Job};
use crate::pool::JobPoolStore;
use crate::route::{OsrmProvider, RouteSession, StopModel, load_stops_file};
use crate::types::Granularity;
use crate::view::CalendarView;

/// High-level entry point used by `main.rs`.
///
/// Loads the config, then runs one subcommand against the HTTP backend and
/// routing provider it names.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    match args.command {
        Command::Check => {
            print_config(&cfg);
            Ok(())
        }
        Command::Window(window) => {
            let (anchor, granularity) = resolve_window(&cfg, &window, None);
            print_window(&compute_window(anchor, granularity));
            Ok(())
        }
        Command::Board { window, crew } => {
            let mut view = open_view(&cfg, &window, None)?;
            view.load_crews().await;
            view.set_crew_filter(crew.map(CrewId)).await;
            view.refresh().await;
            print_board(view.window(), view.store());
            Ok(())
        }
        Command::Assign { job, day, window } => {
            let mut view = open_view(&cfg, &window, Some(day))?;
            view.refresh().await;
            let outcome = view.drop_on_day(&job, day).await;
            report_drop(outcome)?;
            print_board(view.window(), view.store());
            Ok(())
        }
        Command::Unassign { job, window } => {
            let mut view = open_view(&cfg, &window, None)?;
            view.refresh().await;
            let outcome = view.drop_on_unscheduled(&job).await;
            report_drop(outcome)?;
            print_board(view.window(), view.store());
            Ok(())
        }
        Command::Route {
            stops,
            standard,
            crew,
            date,
        } => {
            let file = load_stops_file(&stops)?;
            let model = StopModel::from_entries(cfg.depot.clone(), file.stop)?;
            info!(stops = model.len(), depot = %model.depot().name, "planning route");

            let provider = Arc::new(OsrmProvider::new(&cfg.routing)?);
            let mut session = RouteSession::with_stops(model, provider);
            session.set_context(crew, date);
            session.set_optimize(!standard);
            session.set_provider_ready(true);
            session.sync().await;
            print_route(&session);
            Ok(())
        }
    }
}

fn resolve_window(
    cfg: &ConfigFile,
    args: &WindowArgs,
    fallback_anchor: Option<NaiveDate>,
) -> (NaiveDate, Granularity) {
    let anchor = args
        .anchor
        .or(fallback_anchor)
        .unwrap_or_else(|| Local::now().date_naive());
    (anchor, args.view.unwrap_or(cfg.default_view))
}

fn open_view(
    cfg: &ConfigFile,
    args: &WindowArgs,
    fallback_anchor: Option<NaiveDate>,
) -> Result<CalendarView> {
    let (anchor, granularity) = resolve_window(cfg, args, fallback_anchor);
    let backend: Arc<dyn JobBackend> = Arc::new(HttpBackend::new(&cfg.backend)?);
    debug!(base_url = %cfg.backend.base_url, %anchor, %granularity, "opening calendar view");
    Ok(CalendarView::open(
        backend,
        ScheduleBus::new(),
        anchor,
        granularity,
        cfg.sync.debounce(),
    ))
}

fn report_drop(outcome: DropOutcome) -> Result<()> {
    match outcome {
        DropOutcome::Ignored => anyhow::bail!("job id must be a positive number"),
        DropOutcome::Settled {
            job,
            target,
            persisted: true,
        } => {
            println!("job {job} -> {target}");
            Ok(())
        }
        DropOutcome::Settled { job, target, .. } => {
            anyhow::bail!("backend rejected moving job {job} to {target}; board reloaded")
        }
    }
}

fn print_config(cfg: &ConfigFile) {
    println!("fieldsched config");
    println!("  backend.base_url = {}", cfg.backend.base_url);
    println!("  backend.timeout_ms = {}", cfg.backend.timeout_ms);
    println!("  routing.base_url = {}", cfg.routing.base_url);
    println!("  routing.profile = {}", cfg.routing.profile);
    println!(
        "  depot = {} ({}, {})",
        cfg.depot.name, cfg.depot.coordinate.latitude, cfg.depot.coordinate.longitude
    );
    println!("  sync.debounce_ms = {}", cfg.sync.debounce_ms);
    println!("  calendar.default_view = {}", cfg.default_view);
}

fn print_window(window: &CalendarWindow) {
    println!("{}", window.title());
    for day in window.days() {
        let marker = if day.muted { " (outside month)" } else { "" };
        println!("  {}{marker}", day.date.format("%a %Y-%m-%d"));
    }
}

fn print_board(window: &CalendarWindow, store: &JobPoolStore) {
    println!("{}", window.title());
    println!();
    println!("unscheduled ({}):", store.unscheduled().len());
    for job in store.unscheduled() {
        print_job(store, job);
    }
    println!();
    for day in window.days() {
        let jobs = store.bucket(day.date);
        if jobs.is_empty() && day.muted {
            continue;
        }
        println!("{} ({}):", day_key(day.date), jobs.len());
        for job in jobs {
            print_job(store, job);
        }
    }
}

fn print_job(store: &JobPoolStore, job: &Job) {
    let address = job.service_address.as_deref().unwrap_or("-");
    println!(
        "  - #{} [{}] {} @ {}",
        job.id,
        job.status,
        store.crew_name(job),
        address
    );
}

fn print_route(session: &RouteSession) {
    let depot = session.stops().depot();
    if let Some(label) = session.context_label() {
        println!("route: {label}");
    }
    println!("depot: {}", depot.name);
    match session.sequencer().current() {
        Some(result) => {
            println!("status: {}", result.status);
            if let Some(metrics) = result.metrics {
                println!(
                    "total: {} / {}",
                    metrics.distance_label(),
                    metrics.duration_label()
                );
            }
        }
        None => println!("status: not planned"),
    }
    if let Some(notice) = session.notice() {
        println!("{notice}");
    }
    for (pos, stop) in session.ordered_stops().into_iter().enumerate() {
        println!(
            "  {}. {} ({}) [{}] {}",
            pos + 1,
            stop.name,
            stop.address,
            stop.status,
            stop.id
        );
    }
}
