use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};

use snowsurvey_client::{SnowflakeClient, WarehouseClient};
use snowsurvey_core::Config;
use snowsurvey_export::{
    definition_preview, definitions_workbook, grants_workbook, parameters_workbook,
    selected_definitions_workbook,
};
use snowsurvey_harvest::{
    harvest_definitions, harvest_grants, harvest_parameters, DefinitionRequest, ExcludedTarget,
    GrantSelection, HarvestFailure, HarvestResult, ParameterLevel, ParameterRequest, Selection,
    SkippedBranch, TableDefinitions,
};

/// snowsurvey - account metadata harvesting for Snowflake
#[derive(Parser)]
#[command(name = "snowsurvey")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: snowsurvey.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump configuration parameters per scope into a workbook
    Parameters {
        /// Scope levels to fetch, in order
        #[arg(short, long, value_enum, value_delimiter = ',',
              default_values_t = vec![LevelArg::Account, LevelArg::Session])]
        levels: Vec<LevelArg>,

        /// Databases to include: names, or ALL
        #[arg(long, value_delimiter = ',', default_value = "ALL")]
        databases: Vec<String>,

        /// Warehouses to include: names, or ALL
        #[arg(long, value_delimiter = ',', default_value = "ALL")]
        warehouses: Vec<String>,

        /// Output workbook path
        #[arg(short, long, default_value = "snowflake_parameters.xlsx")]
        output: PathBuf,
    },

    /// Crawl table definitions and sample rows
    Tables {
        /// Databases to crawl: names, or ALL
        #[arg(long, value_delimiter = ',', default_value = "ALL")]
        databases: Vec<String>,

        /// Print a preview (hierarchy graph + definitions) instead of
        /// writing a workbook
        #[arg(long)]
        preview: bool,

        /// Emit the preview as JSON
        #[arg(long, requires = "preview")]
        json: bool,

        /// Restrict the workbook to these fully qualified tables
        #[arg(long, value_delimiter = ',', conflicts_with = "preview")]
        tables: Vec<String>,

        /// Output workbook path
        #[arg(short, long, default_value = "table_definitions.xlsx")]
        output: PathBuf,
    },

    /// List access grants at database/schema/table level
    Grants {
        /// Databases to include: names, or ALL
        #[arg(long, value_delimiter = ',', default_value = "ALL")]
        databases: Vec<String>,

        /// Qualified database.schema names to include, or ALL
        #[arg(long, value_delimiter = ',')]
        schemas: Vec<String>,

        /// Qualified database.schema.table names to include, or ALL
        #[arg(long, value_delimiter = ',')]
        tables: Vec<String>,

        /// Output workbook path
        #[arg(short, long, default_value = "object_grants_by_level.xlsx")]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LevelArg {
    Account,
    Session,
    Database,
    Warehouse,
}

impl std::fmt::Display for LevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Account => "account",
            Self::Session => "session",
            Self::Database => "database",
            Self::Warehouse => "warehouse",
        };
        write!(f, "{}", s)
    }
}

impl From<LevelArg> for ParameterLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Account => ParameterLevel::Account,
            LevelArg::Session => ParameterLevel::Session,
            LevelArg::Database => ParameterLevel::Database,
            LevelArg::Warehouse => ParameterLevel::Warehouse,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("snowsurvey.toml").exists() {
        Config::from_file(Path::new("snowsurvey.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };
    config.connection = config.connection.with_env_fallbacks();

    let client = build_client(&config)?;

    if cli.verbose {
        eprintln!("{} {}...", "Connecting to".cyan(), client.name());
    }
    client
        .test_connection()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to warehouse: {}", e))?;
    if cli.verbose {
        eprintln!("{}", "✓ Connection successful".green());
    }

    match cli.command {
        Commands::Parameters {
            levels,
            databases,
            warehouses,
            output,
        } => {
            run_parameters(&client, levels, databases, warehouses, &output, cli.verbose).await
        }
        Commands::Tables {
            databases,
            preview,
            json,
            tables,
            output,
        } => {
            run_tables(
                &client,
                &config,
                databases,
                preview,
                json,
                tables,
                &output,
                cli.verbose,
            )
            .await
        }
        Commands::Grants {
            databases,
            schemas,
            tables,
            output,
        } => run_grants(&client, databases, schemas, tables, &output, cli.verbose).await,
    }
}

/// Build the Snowflake client from config
fn build_client(config: &Config) -> Result<SnowflakeClient> {
    let connection = &config.connection;

    if connection.account.is_empty() {
        anyhow::bail!(
            "No account configured. Set [connection] account in snowsurvey.toml \
             or the SNOWSURVEY_ACCOUNT environment variable."
        );
    }
    if connection.user.is_empty() {
        anyhow::bail!("No user configured. Set [connection] user or SNOWSURVEY_USER.");
    }
    let password = connection
        .password
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("No password configured. Set SNOWSURVEY_PASSWORD."))?;

    let mut builder = SnowflakeClient::with_password(&connection.account, &connection.user, password);
    if let Some(role) = &connection.role {
        builder = builder.with_role(role);
    }
    if let Some(warehouse) = &connection.warehouse {
        builder = builder.with_warehouse(warehouse);
    }

    builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create Snowflake client: {}", e))
}

/// Parameters command
async fn run_parameters(
    client: &dyn WarehouseClient,
    levels: Vec<LevelArg>,
    databases: Vec<String>,
    warehouses: Vec<String>,
    output: &Path,
    verbose: bool,
) -> Result<()> {
    let request = ParameterRequest {
        levels: levels.into_iter().map(ParameterLevel::from).collect(),
        databases: Selection::from_values(&databases),
        warehouses: Selection::from_values(&warehouses),
    };

    if verbose {
        eprintln!("{}", "Harvesting parameters...".cyan());
    }
    let result = harvest_parameters(client, &request).await;

    let bytes = parameters_workbook(&result)?;
    std::fs::write(output, bytes)?;

    print_harvest_summary("Parameter Harvest", &result, Some(output));
    exit_for(&result.failures);
    Ok(())
}

/// Tables command
#[allow(clippy::too_many_arguments)]
async fn run_tables(
    client: &dyn WarehouseClient,
    config: &Config,
    databases: Vec<String>,
    preview: bool,
    json: bool,
    tables: Vec<String>,
    output: &Path,
    verbose: bool,
) -> Result<()> {
    let request = DefinitionRequest {
        databases: Selection::from_values(&databases),
    };

    if verbose {
        eprintln!("{}", "Crawling table definitions...".cyan());
    }
    let defs = harvest_definitions(client, &request, &config.harvest).await;

    if preview {
        let preview = definition_preview(&defs);
        if json {
            println!("{}", serde_json::to_string_pretty(&preview)?);
        } else {
            print_definition_preview(&preview);
        }
    } else if tables.is_empty() {
        let bytes = definitions_workbook(&defs)?;
        std::fs::write(output, bytes)?;
    } else {
        let bytes = selected_definitions_workbook(&defs, &tables)?;
        std::fs::write(output, bytes)?;
    }

    if !json {
        print_definitions_summary(&defs, if preview { None } else { Some(output) });
    }
    exit_for(&defs.failures);
    Ok(())
}

/// Grants command
async fn run_grants(
    client: &dyn WarehouseClient,
    databases: Vec<String>,
    schemas: Vec<String>,
    tables: Vec<String>,
    output: &Path,
    verbose: bool,
) -> Result<()> {
    let selection = GrantSelection {
        databases: Selection::from_values(&databases),
        schemas: Selection::from_values(&schemas),
        tables: Selection::from_values(&tables),
    };

    if verbose {
        eprintln!("{}", "Harvesting grants...".cyan());
    }
    let result = harvest_grants(client, &selection).await;

    let outcome = grants_workbook(&result)?;
    std::fs::write(output, outcome.bytes)?;

    for warning in &outcome.warnings {
        eprintln!(
            "{} sheet {} could not be written: {}",
            "⚠".yellow(),
            warning.sheet.yellow(),
            warning.message
        );
    }

    print_harvest_summary("Grant Harvest", &result, Some(output));
    exit_for(&result.failures);
    Ok(())
}

/// Exit nonzero when targets failed; everything is already on screen.
fn exit_for(failures: &[HarvestFailure]) {
    if !failures.is_empty() {
        std::process::exit(1);
    }
}

/// Print the success/failure banner plus itemized failure lists
fn print_harvest_summary(title: &str, result: &HarvestResult, output: Option<&Path>) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", title.bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Targets fetched: {}", result.success_count());
    if let Some(path) = output {
        println!("Workbook: {}", path.display());
    }
    println!();

    if result.is_clean() {
        println!("{}", "✓ All targets harvested".green().bold());
    } else {
        print_failures(&result.failures);
        print_excluded(&result.excluded);
        print_skipped(&result.skipped);
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

fn print_definitions_summary(defs: &TableDefinitions, output: Option<&Path>) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Table Definition Harvest".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Tables harvested: {}", defs.tables().len());
    println!("Definition rows: {}", defs.rows.row_count());
    if let Some(path) = output {
        println!("Workbook: {}", path.display());
    }
    println!();

    let clean = defs.failures.is_empty() && defs.excluded.is_empty() && defs.skipped.is_empty();
    if clean {
        println!("{}", "✓ All tables harvested".green().bold());
    } else {
        print_failures(&defs.failures);
        print_excluded(&defs.excluded);
        print_skipped(&defs.skipped);
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

fn print_failures(failures: &[HarvestFailure]) {
    if failures.is_empty() {
        return;
    }
    println!("{}", "Failed targets:".yellow().bold());
    for failure in failures {
        println!("  {} {}: {}", "✗".red(), failure.target, failure.error);
    }
}

fn print_excluded(excluded: &[ExcludedTarget]) {
    if excluded.is_empty() {
        return;
    }
    println!("{}", "Excluded (invalid names, never fetched):".yellow().bold());
    for target in excluded {
        println!("  {} {:?}: {}", "⊘".yellow(), target.name, target.reason);
    }
}

fn print_skipped(skipped: &[SkippedBranch]) {
    if skipped.is_empty() {
        return;
    }
    println!("{}", "Skipped branches (listing failed):".yellow().bold());
    for branch in skipped {
        println!("  {} {}: {}", "⚠".yellow(), branch.parent, branch.error);
    }
}

/// Text rendering of the definitions preview
fn print_definition_preview(preview: &snowsurvey_export::DefinitionPreview) {
    println!("{}", "Hierarchy (Graphviz DOT):".bold());
    println!("{}", preview.hierarchy_dot);
    println!();

    for table in &preview.tables {
        println!("{}", table.table.fqn().bold().cyan());
        for row in &table.definition.rows {
            let text: Vec<String> = row
                .iter()
                .map(|cell| cell.clone().unwrap_or_default())
                .collect();
            println!("  {}", text.join(" | "));
        }
        match (&table.sample, &table.sample_error) {
            (Some(sample), _) => println!("  {} sample rows", sample.row_count()),
            (None, Some(error)) => {
                println!("  {} sample fetch failed: {}", "⚠".yellow(), error)
            }
            (None, None) => {}
        }
        println!();
    }
}
