//! Techplan CLI
//!
//! Command-line front end for the proposal service:
//! - Create, fetch and list projects
//! - Upload reference documents and analyze URLs
//! - Check backend health
//! - Resolve client-side routes
//! - Generate a default config file and check the build output

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

use techplan::app::{create_app, AppContext, LogErrorHandler, MOUNT_ANCHOR};
use techplan::client::{ApiClient, ClientError, FileUpload};
use techplan::config::{generate_default_config, Config};
use techplan::models::{ModelType, Project, ProjectId, ProjectRequest};
use techplan::router::{MemoryTitle, RouteName, RouteTable, Router, TitleGuard, ViewRegistry};

#[derive(Parser)]
#[command(name = "techplan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the Technical Proposal AI service")]
#[command(long_about = "Techplan talks to the proposal backend.\nCreate projects from a topic, attach reference documents and read back the generated proposal.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/techplan/techplan.toml, /etc/techplan/techplan.toml, ./techplan.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL, overrides the config file and TECHPLAN_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a proposal project
    Create {
        /// Project title
        title: String,
        /// Research topic
        topic: String,
        /// Longer description of what the proposal should cover
        #[arg(short, long)]
        description: Option<String>,
        /// Model (default, lite, pro, reader)
        #[arg(short, long, default_value = "default")]
        model: ModelType,
        /// Number of papers to retrieve (1-10)
        #[arg(long, default_value = "5")]
        max_papers: u8,
        /// Extra search keywords
        #[arg(short, long)]
        keyword: Vec<String>,
    },

    /// Show a project
    Get {
        /// Project id
        id: String,
    },

    /// List recent projects
    List {
        /// Number of projects (default: 10)
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Upload a reference document
    Upload {
        /// File to upload
        path: PathBuf,
        /// Attach the file to a project
        #[arg(short, long)]
        project_id: Option<String>,
    },

    /// Analyze a web page
    Analyze {
        /// Page URL
        url: String,
    },

    /// Check backend health
    Health,

    /// Resolve a path against the route table
    Route {
        /// Location, e.g. /project/42?tab=papers
        path: String,
    },

    /// Check the build output and remove disabled source maps
    Dist,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Printing a default config must work even when the current one is broken
    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default()?,
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
        config.validate()?;
    }

    techplan::logging::init(&config.logging, &[])?;

    let client = ApiClient::new(&config.api)?;
    let (app, title) = bootstrap(client)?;
    let json = cli.format == OutputFormat::Json;

    match cli.command {
        Commands::Create {
            title,
            topic,
            description,
            model,
            max_papers,
            keyword,
        } => {
            let mut request = ProjectRequest::new(title, topic)
                .model_type(model)
                .max_papers(max_papers);
            if let Some(description) = description {
                request = request.description(description);
            }
            if !keyword.is_empty() {
                request = request.keywords(keyword);
            }

            let created = exit_on_error(app.client().projects().create(&request).await, &config);
            if json {
                print_json(&created)?;
            } else {
                let id = created.get("project_id").map(display_value).unwrap_or_default();
                println!("Created project {}", id);
                if let Some(message) = created.get("message").and_then(Value::as_str) {
                    println!("  {}", message);
                }
                if !id.is_empty() {
                    println!();
                    println!("Follow progress with:");
                    println!("  techplan get {}", id);
                }
            }
        }

        Commands::Get { id } => {
            let project = exit_on_error(app.client().projects().get(id).await, &config);
            if json {
                print_json(&project)?;
            } else {
                print_project(&project);
            }
        }

        Commands::List { limit } => {
            let projects = exit_on_error(app.client().projects().list(limit).await, &config);
            if json {
                print_json(&projects)?;
            } else {
                print_project_table(&projects);
            }
        }

        Commands::Upload { path, project_id } => {
            let file = FileUpload::from_path(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let project_id = project_id.map(ProjectId::from);

            let uploaded = exit_on_error(
                app.client().upload().file(file, project_id.as_ref()).await,
                &config,
            );
            if json {
                print_json(&uploaded)?;
            } else {
                let name = uploaded
                    .get("filename")
                    .map(display_value)
                    .unwrap_or_else(|| path.display().to_string());
                println!("Uploaded {}", name);
                if let Some(stored) = uploaded.get("file_path").and_then(Value::as_str) {
                    println!("  Stored at: {}", stored);
                }
            }
        }

        Commands::Analyze { url } => {
            let analysis = exit_on_error(app.client().url().analyze(&url).await, &config);
            if json {
                print_json(&analysis)?;
            } else {
                println!("Analysis of {}", url);
                println!();
                print_fields(analysis.get("result").unwrap_or(&analysis));
            }
        }

        Commands::Health => match app.client().health().await {
            Ok(health) => {
                if json {
                    print_json(&health)?;
                } else {
                    println!("Techplan v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("API: {}", app.client().base_url());
                    println!(
                        "Status: {}",
                        health.get("status").map(display_value).unwrap_or_default()
                    );
                    if let Some(message) = health.get("message").and_then(Value::as_str) {
                        println!("Message: {}", message);
                    }
                }
            }
            Err(e) => {
                eprintln!("Cannot reach the proposal service at {}", app.client().base_url());
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },

        Commands::Route { path } => {
            let (route, view) = {
                let mut router = app.router_mut();
                let active = router.navigate(&path)?;
                (active.route.clone(), active.view.clone())
            };
            let title = title.get().unwrap_or_default();

            if json {
                print_json(&serde_json::json!({
                    "name": route.name.as_str(),
                    "path": route.path,
                    "params": route.params,
                    "title": title,
                    "view": view,
                }))?;
            } else {
                println!("{:<10} {}", "Route:", route.name);
                println!("{:<10} {}", "Path:", route.path);
                println!("{:<10} {}", "Title:", title);
                println!("{:<10} {}", "View:", view);
                if !route.params.is_empty() {
                    let mut params: Vec<_> = route.params.iter().collect();
                    params.sort();
                    println!("Params:");
                    for (key, value) in params {
                        println!("  {} = {}", key, value);
                    }
                }
            }
        }

        Commands::Dist => {
            let report = techplan::dist::finalize(&config.build)?;
            println!("Build output: {}", config.build.output_dir.display());
            println!("  Files: {}", report.files);
            println!("  Assets: {}", report.assets);
            println!("  Size: {}", format_bytes(report.total_bytes));
            if !report.removed_source_maps.is_empty() {
                println!("  Removed source maps: {}", report.removed_source_maps.len());
            }
        }

        // Written before the config was loaded
        Commands::Config { .. } => {}
    }

    Ok(())
}

/// The CLI runs the same bootstrap as the browser, rendering views as text
fn bootstrap(client: ApiClient) -> anyhow::Result<(AppContext<ApiClient, String>, MemoryTitle)> {
    let registry = ViewRegistry::new()
        .register(RouteName::Home, |_| "Create a new proposal project".to_string())
        .register(RouteName::Project, |route| {
            format!("Details of project {}", route.param("id").unwrap_or("?"))
        })
        .register(RouteName::History, |_| "Recent projects".to_string())
        .register(RouteName::NotFound, |route| format!("Nothing at {}", route.path));

    let title = MemoryTitle::new();
    let mut router = Router::new(RouteTable::standard()?, registry)?;
    router.before_each(TitleGuard::new(title.clone()));

    let app = create_app(client)
        .use_router(router)
        .error_handler(LogErrorHandler)
        .mount(MOUNT_ANCHOR, |_, _| Ok::<(), std::convert::Infallible>(()))?;
    Ok((app, title))
}

/// The client already logged the failure; explain it and stop
fn exit_on_error<T>(result: Result<T, ClientError>, config: &Config) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: {}", e);
            if matches!(e, ClientError::Unavailable(_)) {
                eprintln!();
                eprintln!("Make sure the proposal service is running at {}", config.api.resolved_base_url());
            }
            std::process::exit(1);
        }
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn print_fields(value: &Value) {
    match value.as_object() {
        Some(map) => {
            for (key, value) in map {
                println!("{:<20} {}", format!("{}:", key), display_value(value));
            }
        }
        None => println!("{}", display_value(value)),
    }
}

fn print_project(value: &Value) {
    let project: Project = match serde_json::from_value(value.clone()) {
        Ok(project) => project,
        Err(_) => {
            print_fields(value);
            return;
        }
    };

    println!("Project {}", project.id);
    println!();
    println!("{:<12} {}", "Title:", project.title);
    println!("{:<12} {}", "Topic:", project.topic);
    println!("{:<12} {}", "Status:", project.status.label());
    println!("{:<12} {}", "Created:", format_timestamp(&project.created_at));
    if let Some(message) = &project.status_message {
        println!("{:<12} {}", "Progress:", message);
    }
    if let Some(error) = &project.error {
        println!("{:<12} {}", "Error:", error);
    }

    if let Some(result) = &project.result {
        println!();
        println!("Proposal:");
        println!("{}", result.technical_proposal);
        if !result.references.is_empty() {
            println!();
            println!("References:");
            for paper in &result.references {
                println!("  - {} ({})", paper.title, paper.authors.join(", "));
            }
        }
    } else if !project.status.is_terminal() {
        println!();
        println!("The proposal is still being generated.");
    }
}

fn print_project_table(value: &Value) {
    let projects: Vec<Project> = match serde_json::from_value(value.clone()) {
        Ok(projects) => projects,
        Err(_) => {
            print_fields(value);
            return;
        }
    };

    if projects.is_empty() {
        println!("No projects yet.");
        println!();
        println!("Create your first project with:");
        println!("  techplan create \"Bridge Plan\" \"structural health monitoring\"");
        return;
    }

    println!("{:<38} {:<30} {:<12} {}", "ID", "Title", "Status", "Created");
    println!("{}", "-".repeat(100));
    for project in projects {
        println!(
            "{:<38} {:<30} {:<12} {}",
            project.id,
            truncate(&project.title, 30),
            project.status.label(),
            format_timestamp(&project.created_at)
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// The backend sends naive ISO timestamps without an offset
fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    match chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_defaults_to_table() {
        let cli = Cli::try_parse_from(["techplan", "health"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn test_format_json_is_global() {
        let cli = Cli::try_parse_from(["techplan", "list", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = Cli::try_parse_from(["techplan", "--format", "xml", "health"]).err();
        assert_eq!(err.map(|e| e.kind()), Some(clap::error::ErrorKind::InvalidValue));
    }
}
