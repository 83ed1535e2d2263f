mod plot;
mod table;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use trudge::display::{Column, Labels};
use trudge::{
    filter_by_prefix, lift_names, orm_per_lift, orm_series, sort_summary, write_summary, Formula,
    SetRecord, SortField,
};

use crate::plot::{render_orm_history, OrmChart};
use crate::table::{set_row, summary_row, Table};

#[derive(Parser, Debug)]
#[command(author, version, about = "Workout log one-rep-max tracker", long_about = None)]
struct Cli {
    /// Path to the CSV tracking file
    #[arg(short, long, env = "TRUDGE_LOG", value_hint = ValueHint::FilePath)]
    file: PathBuf,

    /// Weight unit shown in headers
    #[arg(long, global = true, env = "TRUDGE_WEIGHT_UNIT", default_value = "lb")]
    unit: String,

    /// Verbose logging
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all tracked lifts
    List,
    /// Show raw recorded data for lifts starting with a name
    Show(ShowArgs),
    /// Highest one-rep-max equivalent for each lift
    Orm(OrmArgs),
}

#[derive(Parser, Debug)]
struct ShowArgs {
    /// Lift name or name prefix (see `trudge list`)
    name: String,

    /// Use abbreviated column headers
    #[arg(long, action = ArgAction::SetTrue)]
    short: bool,
}

#[derive(Parser, Debug)]
struct OrmArgs {
    /// Estimation formula (Brzycki|Epley|Lander|Lombardi|Mayhew|OConner|Wathan)
    #[arg(long, global = true, default_value = "Brzycki")]
    formula: String,

    #[command(subcommand)]
    command: OrmCommand,
}

#[derive(Subcommand, Debug)]
enum OrmCommand {
    /// List the best 1RM for every lift
    List(OrmListArgs),
    /// Plot 1RM history for lifts starting with a name
    Plot(OrmPlotArgs),
}

#[derive(Parser, Debug)]
struct OrmListArgs {
    /// Column to sort by
    #[arg(long, value_enum, default_value_t = SortOpt::Orm)]
    sort: SortOpt,

    /// Sort ascending instead of descending
    #[arg(long, action = ArgAction::SetTrue)]
    asc: bool,

    /// Write to a file instead of printing (.csv or .json)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct OrmPlotArgs {
    /// Lift name or name prefix (see `trudge list`)
    name: String,

    /// Output figure path (.svg or .png)
    #[arg(short, long, default_value = "orm_plot.svg", value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SortOpt {
    Name,
    Time,
    Orm,
}

impl From<SortOpt> for SortField {
    fn from(value: SortOpt) -> Self {
        match value {
            SortOpt::Name => SortField::Name,
            SortOpt::Time => SortField::Time,
            SortOpt::Orm => SortField::Orm,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let labels = Labels::new(cli.unit.clone());
    let sets = trudge::load(&cli.file)
        .with_context(|| format!("failed to load {}", cli.file.display()))?;
    debug!("{} sets in {}", sets.len(), cli.file.display());

    match cli.command {
        Command::List => handle_list(&sets),
        Command::Show(args) => handle_show(&sets, &labels, args),
        Command::Orm(args) => {
            let formula: Formula = args.formula.parse()?;
            match args.command {
                OrmCommand::List(list) => handle_orm_list(&sets, &labels, formula, list),
                OrmCommand::Plot(plot) => handle_orm_plot(&sets, &labels, formula, plot),
            }
        }
    }
}

fn handle_list(sets: &[SetRecord]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for name in lift_names(sets) {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

fn handle_show(sets: &[SetRecord], labels: &Labels, args: ShowArgs) -> Result<()> {
    let selected = filter_by_prefix(sets, &args.name);
    if selected.is_empty() {
        warn!("No sets recorded for '{}'", args.name);
        return Ok(());
    }
    let mut table = Table::new(&Column::SET, labels, args.short);
    for idx in selected {
        table.push(set_row(&sets[idx]));
    }
    print!("{}", table.render());
    Ok(())
}

fn handle_orm_list(
    sets: &[SetRecord],
    labels: &Labels,
    formula: Formula,
    args: OrmListArgs,
) -> Result<()> {
    let orms = orm_series(sets, formula);
    let mut summary = orm_per_lift(sets, &orms)?;
    sort_summary(&mut summary, args.sort.into(), args.asc);

    if let Some(path) = args.output.as_ref() {
        write_summary(path, &summary, labels)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote {} lifts ({}): {}", summary.len(), formula, path.display());
        return Ok(());
    }

    let mut table = Table::new(&Column::SUMMARY, labels, false);
    for row in &summary {
        table.push(summary_row(row));
    }
    print!("{}", table.render());
    Ok(())
}

fn handle_orm_plot(
    sets: &[SetRecord],
    labels: &Labels,
    formula: Formula,
    args: OrmPlotArgs,
) -> Result<()> {
    let orms = orm_series(sets, formula);
    let selected = filter_by_prefix(sets, &args.name);
    if selected.is_empty() {
        return Err(anyhow!("no sets recorded for '{}'", args.name));
    }
    let picked_sets: Vec<SetRecord> = selected.iter().map(|&i| sets[i].clone()).collect();
    let picked_orms: Vec<f64> = selected.iter().map(|&i| orms[i]).collect();

    let chart = OrmChart::build(&picked_sets, &picked_orms)?;
    render_orm_history(&chart, &args.name, labels, &args.output)
        .with_context(|| format!("failed to render {}", args.output.display()))?;
    info!(
        "Wrote plot ({} sets, {}): {}",
        picked_sets.len(),
        formula,
        args.output.display()
    );
    Ok(())
}
