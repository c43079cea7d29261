use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use siteledger_core::{
    FinancialRecord, Project, ProjectType, RecordKind, extract_all_project_codes, parse_calendar_date,
    today_in,
};
use siteledger_finance::{
    Estimator, QuoteRequest, ReconcilePolicy, aggregate, aggregate_by_project, bulk_clear,
    projects_by_code, reconcile, summarize_with_window,
};
use siteledger_ingest::{Snapshot, parse_ledger_csv};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod report;
mod state;

use config::{Config, init_config, load_config};

#[derive(Parser, Debug)]
#[command(
    name = "siteledger",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SITELEDGER_BUILD_SHA"), ")"),
    about = "Project reconciliation, profitability and quoting"
)]
struct Cli {
    /// Config file (default: ~/.siteledger/config.toml)
    #[arg(long, global = true, env = "SITELEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Link invoices and bills to projects from the codes in their memos
    Reconcile {
        /// Snapshot directory (projects.json, invoices.json, bills.json)
        #[arg(long, default_value = ".")]
        snapshot: PathBuf,

        /// Persist changed assignments back into the snapshot
        #[arg(long, default_value_t = false)]
        write: bool,

        /// Keep manual links even when the memo says otherwise
        #[arg(long, default_value_t = false)]
        preserve_manual: bool,
    },

    /// Detach a project from every invoice and bill
    Detach {
        #[arg(long, default_value = ".")]
        snapshot: PathBuf,

        #[arg(long)]
        project: String,

        #[arg(long, default_value_t = false)]
        write: bool,
    },

    /// Revenue, cost and profit per project
    Totals {
        #[arg(long, default_value = ".")]
        snapshot: PathBuf,

        /// Only this project id
        #[arg(long)]
        project: Option<String>,
    },

    /// Overdue and due-this-week balances for open invoices and bills
    Aging {
        #[arg(long, default_value = ".")]
        snapshot: PathBuf,

        /// Evaluate as of this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Guess a project type from a description
    Classify {
        description: String,
    },

    /// Price a new project against closed projects in the snapshot
    Quote {
        /// Snapshot with project history; omit to quote from fallback rates only
        #[arg(long)]
        snapshot: Option<PathBuf>,

        description: String,

        /// Project type; inferred from the description when omitted
        #[arg(long = "type")]
        project_type: Option<ProjectType>,

        #[arg(long)]
        sqft: Option<f64>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        client: Option<String>,
    },

    /// Merge an accounting CSV export into the snapshot
    Import {
        #[arg(long, default_value = ".")]
        snapshot: PathBuf,

        #[arg(long)]
        csv: PathBuf,

        /// invoice or bill
        #[arg(long)]
        kind: RecordKind,
    },

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config file if none exists
    Init,
    /// Print the effective configuration
    Show,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config_override = cli.config.as_deref();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => init_config(config_override)?,
            ConfigCommand::Show => {
                let cfg = load_config(config_override)?;
                if cli.json {
                    report::print_json(&cfg)?;
                } else {
                    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                }
            }
        },

        Command::Reconcile {
            snapshot,
            write,
            preserve_manual,
        } => {
            let cfg = load_config(config_override)?;
            let policy = ReconcilePolicy {
                preserve_manual: preserve_manual || cfg.reconcile.preserve_manual,
            };
            run_reconcile(&snapshot, policy, write, cli.json)?;
        }

        Command::Detach {
            snapshot,
            project,
            write,
        } => {
            let mut snap = Snapshot::load(&snapshot)?;
            if snap.project(&project).is_none() {
                warn!(project = %project, "project id not in snapshot; clearing links anyway");
            }
            let result = bulk_clear(&mut snap, &project);
            if write {
                snap.save_records(&snapshot)?;
            }
            if cli.json {
                report::print_json(&result)?;
            } else {
                report::print_bulk_clear(&result);
            }
        }

        Command::Totals { snapshot, project } => {
            let snap = Snapshot::load(&snapshot)?;
            let totals = match project {
                Some(id) => {
                    if snap.project(&id).is_none() {
                        bail!("unknown project: {id}");
                    }
                    let t = aggregate(&id, &snap.invoices, &snap.bills);
                    BTreeMap::from([(id, t)])
                }
                None => aggregate_by_project(&snap.projects, &snap.invoices, &snap.bills),
            };
            if cli.json {
                report::print_json(&totals)?;
            } else {
                report::print_totals(&totals);
            }
        }

        Command::Aging { snapshot, as_of } => {
            let cfg = load_config(config_override)?;
            let snap = Snapshot::load(&snapshot)?;
            let as_of = resolve_as_of(as_of.as_deref(), &cfg)?;
            run_aging(&snap, as_of, &cfg, cli.json)?;
        }

        Command::Classify { description } => {
            let cfg = load_config(config_override)?;
            let project_type = cfg.classifier.classify(&description);
            if cli.json {
                let scores: BTreeMap<String, usize> = cfg
                    .classifier
                    .scores(&description)
                    .into_iter()
                    .map(|(t, n)| (t.to_string(), n))
                    .collect();
                report::print_json(&serde_json::json!({
                    "project_type": project_type,
                    "scores": scores,
                }))?;
            } else {
                println!("{project_type}");
            }
        }

        Command::Quote {
            snapshot,
            description,
            project_type,
            sqft,
            location,
            client,
        } => {
            let cfg = load_config(config_override)?;
            let history: Vec<Project> = match snapshot {
                Some(dir) => Snapshot::load(&dir)?.closed_projects().cloned().collect(),
                None => Vec::new(),
            };
            let request = QuoteRequest {
                project_type,
                description,
                square_footage: sqft,
                location,
                client_code: client,
            };
            let estimator = Estimator::new(cfg.estimator, cfg.classifier);
            let quote = estimator.estimate(&request, &history);
            if cli.json {
                report::print_json(&quote)?;
            } else {
                report::print_quote(&quote);
            }
        }

        Command::Import {
            snapshot,
            csv,
            kind,
        } => {
            let mut snap = Snapshot::load(&snapshot)?;
            let records = parse_ledger_csv(&csv, kind)?;
            let total = records.len();
            let inserted = snap.upsert_records(records);
            snap.save_records(&snapshot)?;
            println!(
                "Imported {} {} records from {} ({} new, {} updated)",
                total,
                kind,
                csv.display(),
                inserted,
                total - inserted
            );
        }
    }

    Ok(())
}

fn run_reconcile(dir: &Path, policy: ReconcilePolicy, write: bool, json: bool) -> Result<()> {
    let mut snap = Snapshot::load(dir)?;
    let lookup = projects_by_code(&snap.projects);

    for r in snap.invoices.iter().chain(snap.bills.iter()) {
        flag_ambiguous_memo(r);
    }

    let mut outcomes = reconcile(&snap.invoices, &lookup, policy);
    outcomes.extend(reconcile(&snap.bills, &lookup, policy));

    if write {
        let (inv_out, bill_out) = outcomes.split_at(snap.invoices.len());
        for (rec, o) in snap.invoices.iter_mut().zip(inv_out) {
            o.apply(rec);
        }
        for (rec, o) in snap.bills.iter_mut().zip(bill_out) {
            o.apply(rec);
        }
        snap.save_records(dir)?;
        info!(changed = outcomes.iter().filter(|o| o.changed).count(), "wrote assignments");
    }

    if json {
        report::print_json(&outcomes)?;
    } else {
        report::print_reconcile(&outcomes);
        if !write {
            println!("(dry run; pass --write to persist)");
        }
    }
    Ok(())
}

fn flag_ambiguous_memo(record: &FinancialRecord) {
    let Some(memo) = record.memo.as_deref() else {
        return;
    };
    let codes = extract_all_project_codes(memo);
    if codes.len() > 1 {
        warn!(
            record = %record.id,
            first = %codes[0],
            count = codes.len(),
            "memo mentions several project codes; using the first"
        );
    }
}

fn resolve_as_of(explicit: Option<&str>, cfg: &Config) -> Result<NaiveDate> {
    match explicit {
        Some(raw) => parse_calendar_date(raw).with_context(|| format!("--as-of {raw}")),
        None => today_in(&cfg.aging.timezone),
    }
}

fn run_aging(snap: &Snapshot, as_of: NaiveDate, cfg: &Config, json: bool) -> Result<()> {
    let window = cfg.aging.due_soon_days;
    let open = |records: &[FinancialRecord]| -> Vec<FinancialRecord> {
        records.iter().filter(|r| r.is_open()).cloned().collect()
    };
    let receivables = summarize_with_window(&open(&snap.invoices), as_of, window);
    let payables = summarize_with_window(&open(&snap.bills), as_of, window);

    if json {
        report::print_json(&serde_json::json!({
            "as_of": as_of,
            "receivables": receivables,
            "payables": payables,
        }))?;
    } else {
        println!("As of {as_of}\n");
        report::print_aging("Receivables (open invoices)", &receivables);
        println!();
        report::print_aging("Payables (open bills)", &payables);
    }
    Ok(())
}
