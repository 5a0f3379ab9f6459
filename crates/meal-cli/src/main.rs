//! `mealplan` CLI — mark free slots, find common availability, export meals.
//!
//! ## Usage
//!
//! ```sh
//! # Show your free slots on a date
//! mealplan --plan friends.toml slots --date 2025-10-22
//!
//! # Show a friend's free slots
//! mealplan --plan friends.toml slots --date 2025-10-22 --person 2
//!
//! # Mark 14:00 free (or busy again) and save the plan
//! mealplan --plan friends.toml toggle --date 2025-10-22 --hour 14
//!
//! # Slots free for you and friends 2 and 4
//! mealplan --plan friends.toml common --date 2025-10-22 --with 2,4
//!
//! # Commit a meal and write the .ics file into ./invites
//! mealplan --plan friends.toml export --date 2025-10-22 --hour 19 \
//!     --restaurant "The Blue Door" --with 2,4 --output-dir invites
//! ```
//!
//! Log output goes to stderr; set `MEALPLAN_LOG` (e.g. `debug`) or pass `-v`.

mod plan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeZone};
use clap::{Parser, Subcommand};
use meal_engine::{
    slot_label, EscapeMode, EventExporter, ExportedCalendar, MealEvent, MealPlanner, PersonId,
    Roster, TimeSlot,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::plan::PlanFile;

#[derive(Parser)]
#[command(
    name = "mealplan",
    version,
    about = "Find common free slots with friends and export meal invites"
)]
struct Cli {
    /// Plan file holding the roster and availability
    #[arg(long, global = true, default_value = "mealplan.toml")]
    plan: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List free slots for a person on a date
    Slots {
        /// Date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        /// Person id (defaults to yourself)
        #[arg(long)]
        person: Option<PersonId>,
    },
    /// Mark one of your slots free, or busy again, and save the plan
    Toggle {
        /// Date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        /// Hour of day (0-23)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23))]
        hour: TimeSlot,
    },
    /// List slots free for you and every listed participant
    Common {
        /// Date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        /// Comma-separated participant ids
        #[arg(long = "with", value_delimiter = ',')]
        participants: Vec<PersonId>,
    },
    /// Commit a meal and export it as an .ics calendar file
    Export {
        /// Date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        /// Start hour (0-23)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23))]
        hour: TimeSlot,
        /// Restaurant name
        #[arg(long)]
        restaurant: String,
        /// Comma-separated participant ids
        #[arg(long = "with", value_delimiter = ',')]
        participants: Vec<PersonId>,
        /// Directory to write the .ics file into (prints to stdout if omitted)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Write unescaped LF-separated output identical to the legacy export
        #[arg(long)]
        verbatim: bool,
        /// IANA timezone for the start time (overrides the plan file)
        #[arg(long)]
        timezone: Option<String>,
        /// Export even if the hour is not free for everyone
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Slots { date, person } => {
            let plan = PlanFile::load(&cli.plan)?;
            let store = plan.store();
            let person = person.unwrap_or(store.self_id());
            print_slots(&store.slots_for(person, date));
        }
        Commands::Toggle { date, hour } => {
            let mut plan = PlanFile::load_or_default(&cli.plan)?;
            let mut store = plan.store();
            let slots = store.toggle_slot(date, hour);
            store.prune_empty();
            plan.availability = store.records();
            plan.save(&cli.plan)?;
            info!(%date, hour, plan = %cli.plan.display(), "saved availability");
            print_slots(&slots);
        }
        Commands::Common { date, participants } => {
            let plan = PlanFile::load(&cli.plan)?;
            print_slots(&plan.store().common_slots(date, &participants));
        }
        Commands::Export {
            date,
            hour,
            restaurant,
            participants,
            output_dir,
            verbatim,
            timezone,
            force,
        } => {
            let plan = PlanFile::load(&cli.plan)?;
            let event = commit_event(&plan, date, hour, &restaurant, &participants, force)?;

            let escape = if verbatim {
                EscapeMode::Verbatim
            } else {
                plan.escape
            };
            let roster = plan.roster();
            let exported = match timezone.or_else(|| plan.timezone.clone()) {
                Some(name) => {
                    let tz = meal_engine::parse_timezone(&name)?;
                    export_in(EventExporter::new(tz), &plan, escape, &event, &roster)?
                }
                None => export_in(EventExporter::local(), &plan, escape, &event, &roster)?,
            };

            write_export(output_dir.as_deref(), &exported)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `MEALPLAN_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("MEALPLAN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    meal_engine::parse_date(s).map_err(|e| e.to_string())
}

/// Build the event, going through the planner's checks unless `force` is set.
fn commit_event(
    plan: &PlanFile,
    date: NaiveDate,
    hour: TimeSlot,
    restaurant: &str,
    participants: &[PersonId],
    force: bool,
) -> Result<MealEvent> {
    let mut selection: Vec<PersonId> = Vec::with_capacity(participants.len());
    for &id in participants {
        if !selection.contains(&id) {
            selection.push(id);
        }
    }

    if force {
        if restaurant.trim().is_empty() {
            anyhow::bail!("Restaurant name must not be empty");
        }
        return Ok(MealEvent::new(date, hour, restaurant, selection));
    }

    let mut planner = MealPlanner::new(plan.store());
    for &id in &selection {
        planner.toggle_participant(id);
    }
    let event = planner
        .commit(date, hour, restaurant)
        .context("Failed to schedule meal (use --force to export anyway)")?;
    Ok(event.clone())
}

fn export_in<Z: TimeZone>(
    exporter: EventExporter<Z>,
    plan: &PlanFile,
    escape: EscapeMode,
    event: &MealEvent,
    roster: &Roster,
) -> Result<ExportedCalendar> {
    let mut exporter = exporter.with_escape(escape);
    if let Some(product_id) = &plan.product_id {
        exporter = exporter.with_product_id(product_id.as_str());
    }
    exporter
        .export(event, roster)
        .context("Failed to export meal event")
}

fn write_export(output_dir: Option<&Path>, exported: &ExportedCalendar) -> Result<()> {
    match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            let path = dir.join(&exported.filename);
            std::fs::write(&path, &exported.document)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            info!(
                path = %path.display(),
                media_type = exported.media_type(),
                "wrote calendar file"
            );
            println!("{}", path.display());
        }
        None => {
            print!("{}", exported.document);
        }
    }
    Ok(())
}

fn print_slots(slots: &[TimeSlot]) {
    for &hour in slots {
        let label = slot_label(hour).unwrap_or_else(|| "-".to_string());
        println!("{}\t{}", hour, label);
    }
}
