use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use log::{debug, warn};
use rusqlite::Connection;
use serde::Serialize;

use crate::cli::error::{parse_instant, parse_kind, parse_trait_type, validate_field_name, UserError};
use crate::cli::import::{import_dataset, read_dataset};
use crate::cli::output::{format_table, get_terminal_width, is_tty, sql_clause_to_json, TableRow};
use crate::config::Config;
use crate::db::DbConnection;
use crate::filter::{filter_in_memory, FilterSpecification, QueryAssembler, Searchable};
use crate::models::{EntityKind, FieldDefinition, TraitType};
use crate::repo::{FieldDefinitionRepo, Record, SearchRepo};
use crate::search::{IssueQuery, SearchParser, SearchQuery, TestCaseQuery, TestCaseRunQuery, TestRunQuery};
use crate::utils::{FixedClock, SystemClock, TimeSource};

#[derive(Parser)]
#[command(name = "testlens")]
#[command(about = "Search test cases, test runs and issues with a keyword query language")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load field definitions and entities from a JSON file
    Import {
        /// Dataset file
        file: PathBuf,
    },
    /// Custom field catalog commands
    Fields {
        #[command(subcommand)]
        subcommand: FieldCommands,
    },
    /// Show how a query is parsed and the WHERE clause it produces
    Parse {
        /// Entity kind (test-case, test-case-run, issue, test-run)
        #[arg(value_parser = parse_kind)]
        kind: EntityKind,
        #[command(flatten)]
        scope: ScopeArgs,
        /// Resolve relative times against this instant instead of now (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        now: Option<DateTime<Utc>>,
        /// Query text (e.g. "state:Ongoing since:2w login")
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Run a query
    Search {
        /// Entity kind (test-case, test-case-run, issue, test-run)
        #[arg(value_parser = parse_kind)]
        kind: EntityKind,
        #[command(flatten)]
        scope: ScopeArgs,
        /// Skip this many results
        #[arg(long)]
        offset: Option<usize>,
        /// Return at most this many results
        #[arg(long)]
        count: Option<usize>,
        /// Evaluate filters in memory instead of in SQL
        #[arg(long)]
        in_memory: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Query text (e.g. "result:failed metric:duration>5")
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum FieldCommands {
    /// List field definitions
    List {
        /// Only definitions visible in this project
        #[arg(long)]
        project: Option<i64>,
        /// Only definitions for this entity kind
        #[arg(long, value_parser = parse_kind)]
        kind: Option<EntityKind>,
        /// Tenant (defaults to tenant.id from the rc file)
        #[arg(long)]
        tenant: Option<String>,
    },
    /// Add a field definition
    Add {
        /// Field name, used as the query keyword
        #[arg(long, value_parser = validate_field_name)]
        name: String,
        /// Entity kind the field applies to
        #[arg(long, value_parser = parse_kind)]
        kind: EntityKind,
        /// Restrict the field to one project
        #[arg(long)]
        project: Option<i64>,
        /// Semantic trait (Custom, Priority, Milestone, Release, Component, Feature, Tag)
        #[arg(long = "trait", value_parser = parse_trait_type, default_value = "Custom")]
        trait_type: TraitType,
        /// Tenant (defaults to tenant.id from the rc file)
        #[arg(long)]
        tenant: Option<String>,
    },
}

/// Tenant and project scope of a query
#[derive(Args, Debug, Clone)]
pub struct ScopeArgs {
    /// Tenant (defaults to tenant.id from the rc file)
    #[arg(long)]
    pub tenant: Option<String>,
    /// Restrict results to one project and load its field catalog
    #[arg(long)]
    pub project: Option<i64>,
}

impl ScopeArgs {
    fn tenant<'a>(&'a self, config: &'a Config) -> &'a str {
        self.tenant.as_deref().unwrap_or(&config.tenant_id)
    }
}

/// Options of the `search` command that do not depend on the kind
struct SearchOptions {
    scope: ScopeArgs,
    offset: Option<usize>,
    count: Option<usize>,
    in_memory: bool,
    json: bool,
    text: String,
}

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                e.print()?;
                return Ok(());
            }
            _ => {
                e.print()?;
                std::process::exit(1);
            }
        },
    };

    let config = Config::load().map_err(|e| UserError::new(format!("{:#}", e)))?;
    init_logging(&config);
    for warning in &config.warnings {
        warn!("{}", warning);
    }

    handle_command(cli, &config)
}

/// Initialise env_logger; RUST_LOG wins over log.level, which wins over `warn`
fn init_logging(config: &Config) {
    let default_filter = config.log_level.as_deref().unwrap_or("warn");
    // A logger may already be installed when run() is driven from tests
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init()
        .ok();
}

fn handle_command(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Import { file } => handle_import(config, &file),
        Commands::Fields { subcommand } => handle_fields(config, subcommand),
        Commands::Parse { kind, scope, now, query } => {
            let conn = DbConnection::connect(config)
                .context("Failed to connect to database")?;
            let clock: Box<dyn TimeSource> = match now {
                Some(instant) => Box::new(FixedClock(instant)),
                None => Box::new(SystemClock),
            };
            let text = query.join(" ");
            match kind {
                EntityKind::TestCase => parse_kind_query::<TestCaseQuery>(&conn, config, &scope, clock.as_ref(), &text),
                EntityKind::TestCaseRun => parse_kind_query::<TestCaseRunQuery>(&conn, config, &scope, clock.as_ref(), &text),
                EntityKind::Issue => parse_kind_query::<IssueQuery>(&conn, config, &scope, clock.as_ref(), &text),
                EntityKind::TestRun => parse_kind_query::<TestRunQuery>(&conn, config, &scope, clock.as_ref(), &text),
            }
        }
        Commands::Search { kind, scope, offset, count, in_memory, json, query } => {
            let conn = DbConnection::connect(config)
                .context("Failed to connect to database")?;
            let options = SearchOptions {
                scope,
                offset,
                count,
                in_memory,
                json,
                text: query.join(" "),
            };
            match kind {
                EntityKind::TestCase => search_kind::<TestCaseQuery>(&conn, config, &options),
                EntityKind::TestCaseRun => search_kind::<TestCaseRunQuery>(&conn, config, &options),
                EntityKind::Issue => search_kind::<IssueQuery>(&conn, config, &options),
                EntityKind::TestRun => search_kind::<TestRunQuery>(&conn, config, &options),
            }
        }
    }
}

fn handle_import(config: &Config, file: &std::path::Path) -> Result<()> {
    let dataset = read_dataset(file)?;
    let conn = DbConnection::connect(config)
        .context("Failed to connect to database")?;
    let summary = import_dataset(&conn, &dataset)?;
    println!(
        "Imported {} field definitions, {} test cases, {} test case runs, {} issues, {} test runs.",
        summary.field_definitions,
        summary.test_cases,
        summary.test_case_runs,
        summary.issues,
        summary.test_runs
    );
    Ok(())
}

fn handle_fields(config: &Config, cmd: FieldCommands) -> Result<()> {
    let conn = DbConnection::connect(config)
        .context("Failed to connect to database")?;

    match cmd {
        FieldCommands::List { project, kind, tenant } => {
            let tenant = tenant.as_deref().unwrap_or(&config.tenant_id);
            let mut definitions = FieldDefinitionRepo::list_all(&conn, tenant, kind)?;
            if let Some(project_id) = project {
                definitions.retain(|d| d.project_id.is_none() || d.project_id == Some(project_id));
            }
            if definitions.is_empty() {
                println!("No field definitions found.");
            } else {
                print!("{}", format_table(&definitions, get_terminal_width(), is_tty()));
            }
        }
        FieldCommands::Add { name, kind, project, trait_type, tenant } => {
            let mut definition = FieldDefinition::new(0, &name, kind);
            definition.trait_type = trait_type;
            definition.project_id = project;
            definition.tenant_id = tenant.unwrap_or_else(|| config.tenant_id.clone());
            let created = FieldDefinitionRepo::create(&conn, &definition)?;
            println!(
                "Created field definition {} '{}' for {}.",
                created.id, created.name, created.target
            );
        }
    }

    Ok(())
}

/// Catalog for the query's tenant, project and kind
fn load_catalog<Q: SearchQuery>(
    conn: &Connection,
    config: &Config,
    scope: &ScopeArgs,
) -> Result<Vec<FieldDefinition>> {
    FieldDefinitionRepo::list_for(
        conn,
        scope.tenant(config),
        scope.project,
        <Q::Entity as Searchable>::KIND,
    )
}

/// Mandatory scope filters followed by the query's own filters
fn scoped_specifications<Q: SearchQuery>(
    config: &Config,
    scope: &ScopeArgs,
    query: &Q,
) -> Vec<FilterSpecification<Q::Entity>> {
    let mut assembler = QueryAssembler::<Q::Entity>::new().tenant(scope.tenant(config));
    if let Some(project_id) = scope.project {
        assembler = assembler.project(project_id);
    }
    assembler.build(query)
}

fn parse_kind_query<Q>(
    conn: &Connection,
    config: &Config,
    scope: &ScopeArgs,
    clock: &dyn TimeSource,
    text: &str,
) -> Result<()>
where
    Q: SearchQuery + Serialize,
{
    let catalog = load_catalog::<Q>(conn, config, scope)?;
    let query: Q = SearchParser::new(&catalog).with_clock(clock).parse(text);
    let specs = scoped_specifications(config, scope, &query);
    let clause = FilterSpecification::all(specs).to_sql();

    let output = serde_json::json!({
        "query": query,
        "where": sql_clause_to_json(&clause),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn search_kind<Q>(conn: &Connection, config: &Config, options: &SearchOptions) -> Result<()>
where
    Q: SearchQuery + Serialize,
    Q::Entity: Record + TableRow + Serialize,
{
    let catalog = load_catalog::<Q>(conn, config, &options.scope)?;
    let mut query: Q = SearchParser::new(&catalog).parse(&options.text);
    let (default_offset, default_count) = query.page();
    query.set_page(
        options.offset.unwrap_or(default_offset),
        options.count.unwrap_or(default_count),
    );
    let (offset, count) = query.page();

    let specs = scoped_specifications(config, &options.scope, &query);
    debug!("{} specifications for '{}'", specs.len(), options.text);

    let results: Vec<Q::Entity> = if options.in_memory {
        filter_in_memory(SearchRepo::list_all::<Q::Entity>(conn)?, &specs)
            .into_iter()
            .skip(offset)
            .take(count)
            .collect()
    } else {
        SearchRepo::search(conn, &specs, offset, count)?
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No results found.");
    } else {
        print!("{}", format_table(&results, get_terminal_width(), is_tty()));
    }

    Ok(())
}
