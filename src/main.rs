use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::{io, path::PathBuf};

use sales_ledger::{
    sorted_by_date, Codec, DateFormat, Error, Prompter, Report, SaleDate, Store, YearRange,
};

#[derive(Parser, Debug)]
#[command(version, about = "Records sales in a CSV ledger, and reports on them")]
struct Args {
    /// Path to the ledger file
    #[arg(long, global = true, default_value = "sales.csv")]
    data: PathBuf,

    /// Path for the date-sorted copy of the ledger
    #[arg(long, global = true, default_value = "temp.csv")]
    sorted: PathBuf,

    /// Path for the daily sales report
    #[arg(long, global = true, default_value = "report.txt")]
    report: PathBuf,

    /// How dates are written in the ledger
    #[arg(long, global = true, value_enum, default_value_t = DateFormat::Iso)]
    date_format: DateFormat,

    /// Earliest year accepted for a sale
    #[arg(long, global = true, default_value_t = YearRange::default().min)]
    min_year: i32,

    /// Latest year accepted for a sale
    #[arg(long, global = true, default_value_t = YearRange::default().max)]
    max_year: i32,

    /// Rewrite the ledger even if that drops rows that couldn't be read
    #[arg(long, global = true)]
    force: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enter new sales, then regenerate the sorted copy and report
    Add {
        /// Append the new sales to the ledger instead of rewriting it
        #[arg(long)]
        append: bool,
    },
    /// Replace the details of the sale with this ID
    Update { id: String },
    /// Remove every sale with this ID
    Delete { id: String },
    /// Print the ledger in the order sales were entered
    List,
    /// Write the date-sorted copy of the ledger
    Sort,
    /// Write the daily sales report
    Report,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sales_ledger=info")),
        )
        .init();

    let args = Args::parse();
    if args.min_year > args.max_year {
        bail!(
            "--min-year ({}) is after --max-year ({})",
            args.min_year,
            args.max_year
        );
    }
    let codec = Codec::new(
        args.date_format,
        YearRange {
            min: args.min_year,
            max: args.max_year,
        },
    );
    let (mut store, _) = Store::load(&args.data, &codec)
        .with_context(|| format!("loading {}", args.data.display()))?;

    match &args.command {
        Command::Add { append } => {
            let loaded = store.len();
            let mut prompter = Prompter::new(io::stdin().lock(), io::stdout(), codec);
            let added = prompter.add_sales(&mut store)?;
            if added == 0 {
                return Ok(());
            }
            if *append {
                store.persist_appended(&args.data, &codec, loaded)?;
            } else {
                persist(&args, &mut store, &codec)?;
            }
            regenerate(&args, &store, &codec)?;
        }
        Command::Update { id } => {
            let Some(current) = store.find(id) else {
                return Err(Error::IdNotFound(id.clone()).into());
            };
            println!(
                "Updating {}: {} x {} at {} on {}",
                current.id(),
                current.quantity(),
                current.item_name(),
                current.unit_price(),
                codec.format.format(current.date()),
            );
            let sale = Prompter::new(io::stdin().lock(), io::stdout(), codec).sale()?;
            store.update_or_err(id, sale)?;
            persist(&args, &mut store, &codec)?;
            regenerate(&args, &store, &codec)?;
        }
        Command::Delete { id } => {
            store.delete_or_err(id)?;
            persist(&args, &mut store, &codec)?;
            regenerate(&args, &store, &codec)?;
        }
        Command::List => print!("{}", codec.encode(store.all())?),
        Command::Sort => write_sorted(&args, &store, &codec)?,
        Command::Report => write_report(&args, &store)?,
    }
    Ok(())
}

fn persist(args: &Args, store: &mut Store, codec: &Codec) -> Result<()> {
    if args.force {
        store.persist_dropping_unread(&args.data, codec)?;
        return Ok(());
    }
    match store.persist(&args.data, codec) {
        Err(e @ Error::UnreadRows { .. }) => {
            bail!("{e}; fix them in {}, or pass --force", args.data.display())
        }
        other => Ok(other?),
    }
}

fn regenerate(args: &Args, store: &Store, codec: &Codec) -> Result<()> {
    write_sorted(args, store, codec)?;
    write_report(args, store)
}

fn write_sorted(args: &Args, store: &Store, codec: &Codec) -> Result<()> {
    codec.write_path(&args.sorted, &sorted_by_date(store.all()))?;
    info!(path = %args.sorted.display(), "wrote sorted ledger");
    Ok(())
}

fn write_report(args: &Args, store: &Store) -> Result<()> {
    Report::new(store.all(), SaleDate::today()).write_to(&args.report)?;
    info!(path = %args.report.display(), "wrote report");
    Ok(())
}
