use clap::{Parser, Subcommand};
use env_logger::Env;
use fermidle::config::TableConfig;
use fermidle::ingest;
use fermidle::units::{ConversionTable, Quantity, TableEntry, Units};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fermidle")]
#[command(about = "Unit standardization and measurement catalog tool", long_about = None)]
struct Cli {
    /// Conversion table file (default: built-in table)
    #[arg(short, long, global = true)]
    table: Option<PathBuf>,

    /// Log every rewrite step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Standardize a quantity to base units (e.g., "60 mi/h")
    Standardize {
        expr: String,

        /// Print the {value, units} record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a unit expression without standardizing it
    Parse { expr: String },

    /// Compare two quantities after standardization
    Compare {
        a: String,
        b: String,

        /// Relative tolerance
        #[arg(long, default_value_t = 1e-3)]
        eps: f64,
    },

    /// Parse a comma-separated measurement field (e.g., "max: 10.9 km, 1 mi")
    Cell { text: String },

    /// Process a TOML catalog file or directory and export it as JSON
    Catalog {
        path: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print unit frequencies to stderr
        #[arg(long)]
        summary: bool,
    },

    /// List the conversion table
    Table,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_table(cli.table.as_deref())?;

    match cli.command {
        Commands::Standardize { expr, json } => standardize(&table, &expr, json),
        Commands::Parse { expr } => parse(&table, &expr),
        Commands::Compare { a, b, eps } => compare(&table, &a, &b, eps),
        Commands::Cell { text } => cell(&table, &text),
        Commands::Catalog {
            path,
            output,
            summary,
        } => catalog(&table, &path, output.as_deref(), summary),
        Commands::Table => list_table(&table),
    }
}

fn load_table(path: Option<&Path>) -> Result<ConversionTable, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => TableConfig::load_from_file(path)?,
        None => TableConfig::builtin()?,
    };
    Ok(config.build_table()?)
}

fn standardize(
    table: &ConversionTable,
    expr: &str,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let quantity = table.standardize(&table.parse_quantity(expr)?)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&quantity.to_record())?);
    } else {
        println!("{}", quantity);
    }
    Ok(())
}

fn parse(table: &ConversionTable, expr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let units = table.parse_units(expr)?;
    println!("{}", units);
    for unit in units.simplify().iter() {
        let known = if table.contains(&unit.name) { "" } else { " (unknown)" };
        println!(
            "  {} power={} magnitude={}{}",
            unit.name, unit.power, unit.magnitude, known
        );
    }
    Ok(())
}

fn compare(
    table: &ConversionTable,
    a: &str,
    b: &str,
    eps: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let a = table.standardize(&table.parse_quantity(a)?)?;
    let b = table.standardize(&table.parse_quantity(b)?)?;

    println!("{}", a);
    println!("{}", b);
    if a.units != b.units {
        println!("incompatible units: {} vs {}", a.units, b.units);
        return Ok(());
    }
    println!("ratio: {}", (&a / &b).to_string_precision(4));
    println!("close: {}", a.close(&b, eps));
    Ok(())
}

fn cell(table: &ConversionTable, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = ingest::parse_field(text, "", "", table)?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

fn catalog(
    table: &ConversionTable,
    path: &Path,
    output: Option<&Path>,
    summary: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (things, validation) = if path.is_dir() {
        ingest::load_catalog_from_directory(path, table)?
    } else {
        ingest::load_catalog_from_file(path, table)?
    };

    if validation.has_issues() {
        eprintln!("{}", validation);
    }
    if summary {
        eprintln!("Units:");
        for (units, count) in ingest::unit_frequencies(&things) {
            let label = if units.is_empty() { "(dimensionless)" } else { units.as_str() };
            eprintln!("  {:>6}  {}", count, label);
        }
    }

    let json = serde_json::to_string_pretty(&things)?;
    if let Some(output_path) = output {
        std::fs::write(output_path, json)?;
        println!("Catalog exported to {}", output_path.display());
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn list_table(table: &ConversionTable) -> Result<(), Box<dyn std::error::Error>> {
    for (name, entry) in table.entries() {
        match entry {
            TableEntry::Base => println!("{:<10} base", name),
            TableEntry::Equivalence(per_unit) => {
                // Stored per unit; multiply back to show "1 name = ..."
                let one = Quantity::new(1.0, Units::unit(name));
                println!("{:<10} = {}", name, per_unit * &one);
            }
            TableEntry::Affine(conversion) => println!(
                "{:<10} -> {} = ({} + {}) * {}",
                name, conversion.to, name, conversion.offset, conversion.ratio
            ),
        }
    }
    Ok(())
}
