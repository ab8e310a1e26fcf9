//! unstmt CLI - bank statement transaction extraction tool

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use colored::Colorize;

use unstmt::{
    detect_layout, layout_from_filename, load_tree, sort_by_transaction_date, to_narrative_csv,
    to_tabular_csv, Extractor, NarrativeTransaction, Statement, StatementLayout, TabularRow,
};

const CREDIT_OUTPUT: &str = "credit_transactions.csv";
const CHEQUING_OUTPUT: &str = "chequing_transactions.csv";
const SAVINGS_OUTPUT: &str = "savings_transactions.csv";

#[derive(Parser)]
#[command(name = "unstmt")]
#[command(version)]
#[command(about = "Convert bank statement layout files to transaction CSVs", long_about = None)]
struct Cli {
    /// Input layout files (.xml or .json). Discovered in the current
    /// directory when omitted.
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Output directory for the CSV files
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Force a layout instead of classifying inputs
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Suppress per-file progress output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    /// Free-running transaction lines (credit-card statements)
    Narrative,
    /// Five-column transaction grid (chequing and savings statements)
    Tabular,
}

impl From<LayoutArg> for StatementLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Narrative => StatementLayout::Narrative,
            LayoutArg::Tabular => StatementLayout::Tabular,
        }
    }
}

/// Input files split by output target.
#[derive(Default)]
struct Targets {
    credit: Vec<PathBuf>,
    chequing: Vec<PathBuf>,
    savings: Vec<PathBuf>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> unstmt::Result<()> {
    let files = if cli.files.is_empty() {
        discover_inputs()?
    } else {
        cli.files.clone()
    };

    if files.is_empty() {
        println!(
            "{}",
            "No input files given and no .xml/.json layout files found here.".yellow()
        );
        println!("Usage: unstmt [FILES]... (see --help)");
        return Ok(());
    }

    let targets = classify(files, cli.layout.map(Into::into));

    process_narrative(&targets.credit, &cli.out_dir.join(CREDIT_OUTPUT), &cli)?;
    process_tabular(&targets.chequing, &cli.out_dir.join(CHEQUING_OUTPUT), &cli)?;
    process_tabular(&targets.savings, &cli.out_dir.join(SAVINGS_OUTPUT), &cli)?;

    Ok(())
}

/// Find layout files in the current directory, deduplicated
/// case-insensitively and sorted for a stable processing order.
fn discover_inputs() -> io::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(".")? {
        let path = entry?.path();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if !matches!(extension.as_deref(), Some("xml") | Some("json")) {
            continue;
        }
        let key = path.to_string_lossy().to_ascii_lowercase();
        if seen.insert(key) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Split inputs into output targets by filename, probing the tree
/// structure for files whose names give nothing away.
fn classify(files: Vec<PathBuf>, forced: Option<StatementLayout>) -> Targets {
    let mut targets = Targets::default();

    for file in files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let layout = forced.or_else(|| layout_from_filename(&file));
        let layout = match layout {
            Some(layout) => layout,
            None => match load_tree(&file).and_then(|tree| detect_layout(&tree)) {
                Ok(layout) => layout,
                Err(e) => {
                    println!(
                        "{} {} ({e})",
                        "Skipping unrecognized file".yellow(),
                        file.display()
                    );
                    continue;
                }
            },
        };

        log::debug!("classified {} as {layout}", file.display());
        match layout {
            StatementLayout::Narrative => targets.credit.push(file),
            StatementLayout::Tabular => {
                // Savings statements share the tabular layout but get
                // their own output file.
                if name.contains("savings") {
                    targets.savings.push(file)
                } else {
                    targets.chequing.push(file)
                }
            }
        }
    }

    targets
}

fn process_narrative(files: &[PathBuf], output: &Path, cli: &Cli) -> unstmt::Result<()> {
    if files.is_empty() {
        return Ok(());
    }

    let mut transactions: Vec<NarrativeTransaction> = Vec::new();
    for file in files {
        if !cli.quiet {
            println!("Processing {}...", file.display());
        }
        let statement = Extractor::new()
            .with_layout(StatementLayout::Narrative)
            .extract_path(file)?;
        if let Statement::Narrative(batch) = statement {
            transactions.extend(batch);
        }
    }

    sort_by_transaction_date(&mut transactions);
    match to_narrative_csv(&transactions)? {
        Some(content) => write_csv(output, &content, transactions.len(), cli.quiet)?,
        None => println!(
            "No credit transactions detected. Not creating '{}'.",
            output.display()
        ),
    }
    Ok(())
}

fn process_tabular(files: &[PathBuf], output: &Path, cli: &Cli) -> unstmt::Result<()> {
    if files.is_empty() {
        return Ok(());
    }

    let mut rows: Vec<TabularRow> = Vec::new();
    for file in files {
        if !cli.quiet {
            println!("Processing {}...", file.display());
        }
        let statement = Extractor::new()
            .with_layout(StatementLayout::Tabular)
            .extract_path(file)?;
        if let Statement::Tabular(batch) = statement {
            rows.extend(batch);
        }
    }

    match to_tabular_csv(&rows)? {
        Some(content) => write_csv(output, &content, rows.len(), cli.quiet)?,
        None => println!(
            "No transactions detected. Not creating '{}'.",
            output.display()
        ),
    }
    Ok(())
}

fn write_csv(path: &Path, content: &str, records: usize, quiet: bool) -> io::Result<()> {
    write_with_retry(path, content)?;
    if !quiet {
        println!(
            "{} {} records to {}",
            "Wrote".green().bold(),
            records,
            path.display()
        );
    }
    Ok(())
}

/// Write the file, prompting to retry while the target is locked by
/// another program (spreadsheets keep CSVs open exclusively).
fn write_with_retry(path: &Path, content: &str) -> io::Result<()> {
    loop {
        match fs::write(path, content) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                println!(
                    "Cannot write to '{}' because it's open in another program.",
                    path.display()
                );
                print!("Please close the file, then press Enter to retry...");
                io::stdout().flush()?;
                let mut line = String::new();
                io::stdin().read_line(&mut line)?;
            }
            Err(e) => return Err(e),
        }
    }
}
