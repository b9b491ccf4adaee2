//! A small command-line front-end for the ledger. All the real work happens
//! in the library; this binary only parses arguments, sets up logging, and
//! prints results.

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use tracing_subscriber::{
    EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt,
};

use pocket_ledger::{
    DatabaseID, DeleteMode, EntryFilter, FetchMode, LedgerEntry, LedgerStore, StoreConfig, Tag,
    summarize,
};

/// A personal transaction ledger over a local SQLite file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the ledger database. Created if absent.
    #[arg(long, default_value = ".pocket_ledger/DB")]
    db_dir: PathBuf,

    /// Name of the database file within the database directory.
    #[arg(long, default_value = "pocket_ledger.db")]
    db_name: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a new transaction, noted at the current date and time.
    Add {
        /// The person the money moved from.
        #[arg(long)]
        from: String,

        /// The person the money moved to.
        #[arg(long)]
        to: String,

        /// The amount of money moved.
        #[arg(long)]
        amount: f64,

        /// CREDIT or DEBIT.
        #[arg(long)]
        tag: Tag,

        /// What the transaction was for.
        #[arg(long, default_value = "")]
        description: String,
    },

    /// List recorded transactions, optionally filtered.
    List {
        /// Only show transactions from this person.
        #[arg(long)]
        from: Option<String>,

        /// Only show transactions to this person.
        #[arg(long)]
        to: Option<String>,

        /// Only show transactions with this tag.
        #[arg(long)]
        tag: Option<Tag>,

        /// Show at most this many transactions.
        #[arg(long, default_value_t = 10, conflicts_with = "all")]
        limit: u64,

        /// Show every matching transaction.
        #[arg(long)]
        all: bool,
    },

    /// Delete recorded transactions matching the given filter.
    Delete {
        /// Delete the transaction with this ID.
        #[arg(long)]
        id: Option<DatabaseID>,

        /// Delete transactions from this person.
        #[arg(long)]
        from: Option<String>,

        /// Delete transactions to this person.
        #[arg(long)]
        to: Option<String>,

        /// Delete transactions with this tag.
        #[arg(long)]
        tag: Option<Tag>,

        /// Delete every match instead of only the first.
        #[arg(long)]
        all: bool,
    },

    /// Print aggregate statistics over the whole ledger.
    Summary {
        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    let config = StoreConfig::new(args.db_dir, args.db_name);
    let store = match LedgerStore::open(&config) {
        Ok(store) => store,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };

    match args.command {
        Command::Add {
            from,
            to,
            amount,
            tag,
            description,
        } => {
            let draft = LedgerEntry::build(from, to, amount, tag).description(description);

            if !store.insert(draft) {
                eprintln!("could not record the transaction");
                return ExitCode::FAILURE;
            }

            println!("Recorded.");
        }

        Command::List {
            from,
            to,
            tag,
            limit,
            all,
        } => {
            let filter = EntryFilter {
                from_person: from,
                to_person: to,
                tag,
                ..Default::default()
            };
            let fetch = if all {
                FetchMode::All
            } else {
                FetchMode::Many(limit)
            };

            let entries = match store.query(&filter, fetch) {
                Ok(entries) => entries,
                Err(error) => {
                    eprintln!("{error}");
                    return ExitCode::FAILURE;
                }
            };

            for entry in entries {
                println!(
                    "#{} {} {} {:>10.2} {:>6} {} -> {} {}",
                    entry.id,
                    entry.noted_date,
                    entry.noted_time,
                    entry.amount,
                    entry.tag,
                    entry.from_person,
                    entry.to_person,
                    entry.description,
                );
            }
        }

        Command::Delete {
            id,
            from,
            to,
            tag,
            all,
        } => {
            let filter = EntryFilter {
                id,
                from_person: from,
                to_person: to,
                tag,
                ..Default::default()
            };
            let mode = if all { DeleteMode::All } else { DeleteMode::One };

            if !store.delete(&filter, mode) {
                eprintln!("nothing matched, nothing deleted");
                return ExitCode::FAILURE;
            }

            println!("Deleted.");
        }

        Command::Summary { json } => {
            let report = summarize(&store);

            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(rendered) => println!("{rendered}"),
                    Err(error) => {
                        eprintln!("could not render the report as JSON: {error}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print!("{report}");
            }
        }
    }

    ExitCode::SUCCESS
}

fn setup_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer().pretty().with_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            ),
        )
        .init();
}
