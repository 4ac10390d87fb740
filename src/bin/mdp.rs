//! MDP command line client
//!
//! Drives the same console state machines as the desktop app against a live
//! backend, or against the seeded in-memory backend with `--offline`.
//!
//! # Usage
//!
//! ```bash
//! # List functions with their bound object type
//! mdp functions list
//!
//! # Create a function through the wizard steps
//! mdp functions create --api-name order_total --display-name "Order Total" \
//!     --param order_id:string --param currency:string:optional --output NUMBER
//!
//! # Dry run with inputs
//! mdp --offline functions dry-run fn-seed-1 --input order_id='"o-1"'
//!
//! # Faceted search
//! mdp --offline search --facet object_type_id=ot-customer --page-size 10
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use mdp_client::{HttpClient, InMemoryClient, MdpClient};
use mdp_types::{ActionType, ExecutionLog, FunctionDefinition, LinkType, ObjectType, OutputType, ParamType};

use mdp_console::function::{FunctionEditor, FunctionWizard};
use mdp_console::list::{object_type_label, ListState};
use mdp_console::logging::init_tracing;
use mdp_console::{ConsoleConfig, FacetSearch, Notice, Severity};

#[derive(Parser)]
#[command(name = "mdp")]
#[command(version)]
#[command(about = "MDP Platform console: function definitions, ontology metadata and search")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use the in-memory backend seeded with sample data
    #[arg(long, global = true)]
    offline: bool,

    /// Backend base URL (overrides MDP_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Project attached to created functions (overrides MDP_PROJECT_ID)
    #[arg(long, global = true)]
    project: Option<String>,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Function definitions
    Functions {
        #[command(subcommand)]
        command: FunctionCommands,
    },

    /// Object types
    ObjectTypes {
        #[command(subcommand)]
        command: ListCommand,
    },

    /// Link types
    LinkTypes {
        #[command(subcommand)]
        command: ListCommand,
    },

    /// Action types
    ActionTypes {
        #[command(subcommand)]
        command: ListCommand,
    },

    /// Execution logs
    Logs,

    /// Faceted object search
    Search(SearchArgs),
}

#[derive(Subcommand)]
enum ListCommand {
    /// List all entries
    List,
}

#[derive(Subcommand)]
enum FunctionCommands {
    /// List function definitions
    List,

    /// Create a function definition
    Create(CreateArgs),

    /// Update an existing function definition
    Update {
        id: String,

        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Replace the implementation with this file's contents
        #[arg(long)]
        code_file: Option<PathBuf>,
    },

    /// Delete a function definition
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Simulate a run locally; nothing is sent to the backend
    DryRun {
        id: String,

        /// Test input as name=json (bare text is taken as a string)
        #[arg(long = "input", value_name = "NAME=JSON")]
        inputs: Vec<String>,
    },
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    api_name: String,

    #[arg(long)]
    display_name: String,

    #[arg(long)]
    description: Option<String>,

    /// Parameter as name:type[:optional]
    #[arg(long = "param", value_name = "NAME:TYPE[:optional]")]
    params: Vec<String>,

    /// Output type (STRING, INTEGER, NUMBER, BOOLEAN, DATE, ARRAY, OBJECT, VOID)
    #[arg(long, default_value = "STRING")]
    output: OutputType,

    /// Implementation source; a stub is generated when omitted
    #[arg(long)]
    code_file: Option<PathBuf>,

    /// Object type the function is bound to
    #[arg(long)]
    bind: Option<String>,
}

#[derive(Args)]
struct SearchArgs {
    #[arg(long)]
    text: Option<String>,

    /// Query vector, comma or space separated
    #[arg(long)]
    vector: Option<String>,

    /// Facet selection as field=key (repeatable)
    #[arg(long = "facet", value_name = "FIELD=KEY")]
    facets: Vec<String>,

    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long)]
    page_size: Option<u32>,
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing("warn,mdp_console=info");
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ConsoleConfig::from_env().context("invalid configuration")?;
    if let Some(url) = cli.base_url {
        config.api_base_url = url;
    }
    if cli.project.is_some() {
        config.project_id = cli.project;
    }

    let client: Box<dyn MdpClient> = if cli.offline {
        tracing::debug!("using seeded in-memory backend");
        Box::new(InMemoryClient::seeded())
    } else {
        Box::new(
            HttpClient::with_timeout(&config.api_base_url, config.request_timeout)
                .with_context(|| format!("invalid base URL '{}'", config.api_base_url))?,
        )
    };
    let client = client.as_ref();
    let json = cli.json;

    match cli.command {
        Commands::Functions { command } => match command {
            FunctionCommands::List => cmd_function_list(client, json).await,
            FunctionCommands::Create(args) => {
                cmd_function_create(client, args, config.project_id.as_deref(), json).await
            }
            FunctionCommands::Update {
                id,
                display_name,
                description,
                code_file,
            } => cmd_function_update(client, &id, display_name, description, code_file, json).await,
            FunctionCommands::Delete { id, yes } => cmd_function_delete(client, &id, yes).await,
            FunctionCommands::DryRun { id, inputs } => cmd_dry_run(client, &id, &inputs).await,
        },
        Commands::ObjectTypes { command: ListCommand::List } => {
            let rows = load_list::<ObjectType>(client).await;
            print_rows(json, &rows, |t: &ObjectType| {
                vec![t.id.clone(), t.api_name.clone(), t.display_name.clone()]
            })
        }
        Commands::LinkTypes { command: ListCommand::List } => {
            let rows = load_list::<LinkType>(client).await;
            let types = load_list::<ObjectType>(client).await;
            print_rows(json, &rows, |l: &LinkType| {
                vec![
                    l.id.clone(),
                    l.display_name.clone(),
                    format!(
                        "{} -> {}",
                        object_type_label(Some(l.source_object_type_id.as_str()), &types),
                        object_type_label(Some(l.target_object_type_id.as_str()), &types)
                    ),
                ]
            })
        }
        Commands::ActionTypes { command: ListCommand::List } => {
            let rows = load_list::<ActionType>(client).await;
            print_rows(json, &rows, |a: &ActionType| {
                vec![
                    a.id.clone(),
                    a.display_name.clone(),
                    a.backing_function_id.clone().unwrap_or_else(|| "-".into()),
                ]
            })
        }
        Commands::Logs => {
            let rows = load_list::<ExecutionLog>(client).await;
            print_rows(json, &rows, |l: &ExecutionLog| {
                vec![
                    l.id.clone(),
                    l.status.clone(),
                    l.function_id.clone().unwrap_or_else(|| "-".into()),
                    l.duration_ms.map(|d| format!("{d}ms")).unwrap_or_else(|| "-".into()),
                ]
            })
        }
        Commands::Search(args) => cmd_search(client, args, config.page_size, json).await,
    }
}

// =============================================================================
// FUNCTIONS
// =============================================================================

async fn cmd_function_list(client: &dyn MdpClient, json: bool) -> Result<()> {
    let functions = load_list::<FunctionDefinition>(client).await;
    let types = load_list::<ObjectType>(client).await;
    print_rows(json, &functions, |f: &FunctionDefinition| {
        vec![
            f.id.clone(),
            f.api_name.clone(),
            f.display_name.clone(),
            f.output_type.to_string(),
            object_type_label(f.bound_object_type_id.as_deref(), &types),
        ]
    })
}

async fn cmd_function_create(
    client: &dyn MdpClient,
    args: CreateArgs,
    project_id: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut wizard = FunctionWizard::new();
    wizard.basic.api_name = args.api_name;
    wizard.basic.display_name = args.display_name;
    wizard.basic.description = args.description.unwrap_or_default();
    wizard.basic.bound_object_type_id = args.bind;
    wizard.next()?;

    for raw in &args.params {
        let (name, param_type, required) = parse_param(raw)?;
        let idx = wizard.add_param();
        wizard.set_param_name(idx, name);
        wizard.set_param_type(idx, Some(param_type));
        wizard.set_param_required(idx, required);
    }
    wizard.output_type = args.output;
    wizard.next()?;

    if let Some(path) = args.code_file {
        wizard.code_content = read_file(&path)?;
    }

    let result = wizard.submit(client, project_id).await;
    let notice = FunctionWizard::submit_notice(&result);
    let Ok(created) = result else {
        bail!(notice.message);
    };
    report(notice);
    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!("  id: {}", created.id.cyan());
    }
    Ok(())
}

async fn cmd_function_update(
    client: &dyn MdpClient,
    id: &str,
    display_name: Option<String>,
    description: Option<String>,
    code_file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let target = find_function(client, id).await?;
    let mut editor = FunctionEditor::new();
    editor.sync(Some(&target));

    if let Some(name) = display_name {
        editor.display_name = name;
    }
    if let Some(description) = description {
        editor.description = description;
    }
    if let Some(path) = code_file {
        editor.code_content = read_file(&path)?;
    }

    let result = editor.save(client).await;
    let notice = FunctionEditor::save_notice(&result);
    let Ok(updated) = result else {
        bail!(notice.message);
    };
    report(notice);
    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    }
    Ok(())
}

async fn cmd_function_delete(client: &dyn MdpClient, id: &str, yes: bool) -> Result<()> {
    let mut list: ListState<FunctionDefinition> = ListState::new();
    if let Some(notice) = list.load(client).await {
        report(notice);
    }
    let message = list
        .request_delete(id)
        .ok_or_else(|| anyhow!("function {} not found", id))?
        .message();

    if !yes && !prompt_yes_no(&message)? {
        list.cancel_delete();
        println!("Cancelled");
        return Ok(());
    }

    let notices = list.delete_confirmed(client).await;
    let failed = notices.iter().any(|n| n.severity == Severity::Error);
    notices.into_iter().for_each(report);
    if failed {
        bail!("delete failed");
    }
    Ok(())
}

async fn cmd_dry_run(client: &dyn MdpClient, id: &str, inputs: &[String]) -> Result<()> {
    let target = find_function(client, id).await?;
    let mut editor = FunctionEditor::new();
    editor.sync(Some(&target));

    for input in inputs {
        let (name, raw) = input
            .split_once('=')
            .ok_or_else(|| anyhow!("input '{}' must be NAME=JSON", input))?;
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        editor.set_test_input(name, value);
    }

    let result = editor.run_dry_run();
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

async fn find_function(client: &dyn MdpClient, id: &str) -> Result<FunctionDefinition> {
    client
        .list_functions()
        .await
        .context("failed to load functions")?
        .into_iter()
        .find(|f| f.id == id)
        .ok_or_else(|| anyhow!("function {} not found", id))
}

fn parse_param(raw: &str) -> Result<(String, ParamType, bool)> {
    let mut parts = raw.split(':');
    let name = parts.next().unwrap_or_default().trim();
    let param_type = parts
        .next()
        .ok_or_else(|| anyhow!("parameter '{}' must be NAME:TYPE", raw))?
        .parse::<ParamType>()
        .map_err(|e| anyhow!(e))?;
    let required = match parts.next() {
        None => true,
        Some("optional") => false,
        Some(other) => bail!("unknown parameter flag '{}' (expected 'optional')", other),
    };
    Ok((name.to_string(), param_type, required))
}

// =============================================================================
// SEARCH
// =============================================================================

async fn cmd_search(
    client: &dyn MdpClient,
    args: SearchArgs,
    default_page_size: u32,
    json: bool,
) -> Result<()> {
    let mut search = FacetSearch::with_page_size(args.page_size.unwrap_or(default_page_size));
    search.query_input = args.text.unwrap_or_default();
    search.vector_input = args.vector.unwrap_or_default();
    search.submit()?;
    for facet in &args.facets {
        let (field, key) = facet
            .split_once('=')
            .ok_or_else(|| anyhow!("facet '{}' must be FIELD=KEY", facet))?;
        search.toggle_facet(field, key);
    }
    search.set_page(args.page);

    if let Some(notice) = search.refresh(client).await {
        report(notice);
        bail!("search failed");
    }

    if json {
        if let Some(response) = search.response() {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
        return Ok(());
    }

    println!(
        "{} hit(s), page {}/{}",
        search.total().to_string().bold(),
        search.page(),
        search.page_count()
    );
    for hit in search.hits() {
        println!(
            "  {}  {}  {}",
            hit.id.cyan(),
            hit.title.as_deref().unwrap_or("-"),
            hit.object_type_id.as_deref().unwrap_or("-").dimmed()
        );
    }
    for (field, buckets) in search.facets() {
        println!("{}:", field.yellow());
        for bucket in buckets {
            let mark = if search.is_selected(field, &bucket.key) { "x" } else { " " };
            println!("  [{}] {} ({})", mark, bucket.key, bucket.doc_count);
        }
    }
    Ok(())
}

// =============================================================================
// OUTPUT
// =============================================================================

async fn load_list<R: mdp_console::Resource + serde::Serialize>(client: &dyn MdpClient) -> Vec<R> {
    let mut list: ListState<R> = ListState::new();
    if let Some(notice) = list.load(client).await {
        report(notice);
    }
    list.items().to_vec()
}

fn print_rows<R: serde::Serialize>(
    json: bool,
    rows: &[R],
    columns: impl Fn(&R) -> Vec<String>,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("{}", "(none)".dimmed());
    }
    for row in rows {
        println!("  {}", columns(row).join("  "));
    }
    Ok(())
}

fn report(notice: Notice) {
    let label = match notice.severity {
        Severity::Success => "OK".green().bold(),
        Severity::Info => "info".cyan(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Error => "error".red().bold(),
    };
    eprintln!("{} {}", label, notice.message);
}

fn prompt_yes_no(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn read_file(path: &PathBuf) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
