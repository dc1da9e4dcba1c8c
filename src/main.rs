use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use periodical::calendar;
use periodical::config::Config;
use periodical::locale::{self, Language};
use periodical::models::{DayHighlight, ForecastTitle, MonthView};
use periodical::prediction;
use periodical::storage::JsonFileStore;
use periodical::validation;
use periodical::{Action, Tracker};

#[derive(Parser)]
#[command(name = "periodical", version, about = "Menstrual cycle tracker")]
struct Cli {
    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
    /// Marked-dates file to use instead of the configured one
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Countdown, pregnancy chance and next predicted period
    Status,
    /// Mark that a period started or continues today
    Mark,
    /// Replace all marked dates
    Set { dates: Vec<NaiveDate> },
    /// Add marked dates
    Add { dates: Vec<NaiveDate> },
    /// Remove marked dates
    Remove { dates: Vec<NaiveDate> },
    /// Remove every marked date
    Clear,
    /// Show a month with recorded and forecast days
    Calendar { year: Option<i32>, month: Option<u32> },
    /// Cycle statistics as JSON
    Stats,
    /// Full cycle history as JSON
    Export,
    /// Set the display language (en, ru)
    Language { language: Language },
    /// Delete the marked-dates file
    Wipe,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    // `language` and `wipe` must work even when the saved files are broken.
    let repairing = matches!(cli.command, Commands::Language { .. } | Commands::Wipe);
    let mut config = if repairing {
        Config::load_or_default()?
    } else {
        Config::load()?
    };

    let store = match cli.data_file.or_else(|| config.data_file.clone()) {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::at_default_location()?,
    };

    match cli.command {
        Commands::Language { language } => {
            config.language = language;
            config.save()?;
            println!("language set to {language}");
            Ok(())
        }
        Commands::Wipe => {
            store.wipe()?;
            println!("all data removed");
            Ok(())
        }
        command => {
            let tracker = Tracker::open(store, config.fill_policy)?;
            run_tracked(command, tracker, &config, today)
        }
    }
}

fn run_tracked(
    command: Commands,
    mut tracker: Tracker<JsonFileStore>,
    config: &Config,
    today: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let action = match command {
        Commands::Status => {
            print_status(&tracker, today, config.language);
            return Ok(());
        }
        Commands::Calendar { year, month } => {
            let year = year.unwrap_or(today.year());
            let month = month.unwrap_or(today.month());
            let view = calendar::month_view(year, month, today, tracker.history())
                .ok_or_else(|| format!("invalid month: {year}-{month}"))?;
            print_month(&view, config.language);
            return Ok(());
        }
        Commands::Stats => {
            let stats = prediction::cycle_stats(tracker.history());
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }
        Commands::Export => {
            println!("{}", serde_json::to_string_pretty(tracker.history())?);
            return Ok(());
        }
        Commands::Mark => Action::MarkToday,
        Commands::Set { dates } => Action::Replace(dates.into_iter().collect()),
        Commands::Add { dates } => Action::Add(dates.into_iter().collect()),
        Commands::Remove { dates } => Action::Remove(dates.into_iter().collect()),
        Commands::Clear => Action::Clear,
        Commands::Language { .. } | Commands::Wipe => {
            return Err("command does not use the cycle history".into());
        }
    };

    tracker.dispatch(action, today)?;
    print_status(&tracker, today, config.language);
    Ok(())
}

fn print_status(tracker: &Tracker<JsonFileStore>, today: NaiveDate, language: Language) {
    let history = tracker.history();
    let countdown = prediction::days_before_period(history, today);

    match countdown.title {
        ForecastTitle::NoData => println!("{}", countdown.title.as_str()),
        _ => println!("{}: {}", countdown.title.as_str(), countdown.days),
    }
    if history.is_empty() {
        return;
    }

    println!(
        "chance of getting pregnant: {}",
        prediction::pregnancy_chance(history, today).as_str()
    );
    if let Some(next) = prediction::predict(history) {
        println!(
            "next period: {} to {}",
            locale::format_date(next.predicted_start, language),
            locale::format_date(next.predicted_end, language)
        );
    }
    if validation::is_period_today(history, today) {
        println!("period marked today");
    }
}

fn print_month(view: &MonthView, language: Language) {
    if let Some(first) = view.days.first() {
        println!("{}", locale::format_month(first.date, language));
    }
    for day in &view.days {
        let marker = match day.highlight {
            Some(DayHighlight::RecordedPeriod) => "*",
            Some(DayHighlight::ForecastToday) | Some(DayHighlight::ForecastPeriod) => "~",
            None => " ",
        };
        let today = if day.is_today { "<" } else { "" };
        println!("{:>2}{marker}{today}", day.date.day());
    }
}
