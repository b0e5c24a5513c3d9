use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codethesaurus::config::Config;
use codethesaurus::models::ThesaurusMetaInfo;
use codethesaurus::store::{FsStore, SharedStore};
use codethesaurus::validate::{Severity, ValidationReport};
use codethesaurus::{api, db, templates, validate};

#[derive(Parser)]
#[command(name = "thesaurus")]
#[command(about = "Polyglot concept dictionary: look up and compare language concepts")]
struct Cli {
    /// Content root holding meta_info.json (overrides THESAURUS_CONTENT_DIR)
    #[arg(long, global = true)]
    content_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the lookup API
    Serve {
        /// Port for HTTP API (overrides THESAURUS_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Lookup log database (overrides THESAURUS_DB_PATH)
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Do not record visits or lookups
        #[arg(long)]
        no_db: bool,
    },
    /// Check every concept file for shape problems
    #[command(name = "validate-entries", alias = "validatelanginfofiles")]
    ValidateEntries,
    /// Check meta_info.json against the directory layout
    #[command(name = "validate-meta", alias = "validatemetainfofile")]
    ValidateMeta,
    /// Print a skeleton file for new content
    Template {
        #[command(subcommand)]
        kind: TemplateKind,
    },
}

#[derive(Subcommand)]
enum TemplateKind {
    /// Concept file for an entry, listing every concept of a structure
    Entry {
        structure: String,
        entry: String,
        #[arg(long)]
        version: Option<String>,
    },
    /// Structure catalog for `_meta`
    Meta { structure: String, name: String },
}

/// Initialize tracing with output to stderr (for report commands) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "codethesaurus=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // Keep stdout for the report itself
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn print_findings(report: &ValidationReport) {
    for finding in &report.findings {
        let label = format!("[{}]", finding.severity.as_str());
        let label = match finding.severity {
            Severity::Error => label.red().bold(),
            Severity::Warning => label.yellow().bold(),
        };
        println!("{} {}", label, finding.message);
    }
}

fn open_database(config: &Config) -> Option<db::Database> {
    let opened = match &config.db_path {
        Some(path) => db::Database::open(path.clone()),
        None => db::Database::open_default(),
    }
    .and_then(|db| db.migrate().map(|()| db));

    match opened {
        Ok(db) => Some(db),
        Err(e) => {
            tracing::error!("Lookup log disabled: {e:#}");
            None
        }
    }
}

async fn serve(
    mut config: Config,
    port: Option<u16>,
    db_path: Option<PathBuf>,
    no_db: bool,
) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.port = port;
    }
    if db_path.is_some() {
        config.db_path = db_path;
    }

    tracing::info!(
        "Starting thesaurus server on port {} (content: {})",
        config.port,
        config.content_dir.display()
    );

    let store: SharedStore = Arc::new(FsStore::new(&config.content_dir));
    ThesaurusMetaInfo::load(store.clone())?;

    let db = if no_db { None } else { open_database(&config) };
    let app = api::create_router(api::AppState::new(store, db), &config);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", config.port)).await?;
    tracing::info!(
        "Thesaurus server listening on http://127.0.0.1:{}",
        config.port
    );

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = !matches!(cli.command, None | Some(Commands::Serve { .. }));
    init_tracing(use_stderr);

    let mut config = Config::from_env();
    if let Some(dir) = cli.content_dir {
        config.content_dir = dir;
    }

    match cli.command {
        Some(Commands::Serve {
            port,
            db_path,
            no_db,
        }) => serve(config, port, db_path, no_db).await?,
        None => serve(config, None, None, false).await?,
        Some(Commands::ValidateEntries) => {
            let store = FsStore::new(&config.content_dir);
            let report = validate::validate_entry_files(&store)?;
            print_findings(&report);

            if report.has_errors() {
                anyhow::bail!("{} errors found.", report.error_count());
            }
            if report.warning_count() > 0 {
                println!(
                    "{}",
                    format!("{} warnings found.", report.warning_count()).yellow()
                );
            } else {
                println!("{}", "No issues found.".green());
            }
        }
        Some(Commands::ValidateMeta) => {
            let store: SharedStore = Arc::new(FsStore::new(&config.content_dir));
            let report = validate::validate_meta_info(&store)?;
            print_findings(&report);

            if report.has_errors() {
                anyhow::bail!("{} errors found.", report.error_count());
            }
            println!("{}", "No errors found in meta_info.json.".green());
        }
        Some(Commands::Template { kind }) => match kind {
            TemplateKind::Entry {
                structure,
                entry,
                version,
            } => {
                let store: SharedStore = Arc::new(FsStore::new(&config.content_dir));
                let meta = ThesaurusMetaInfo::load(store)?;
                let template = templates::generate_entry_template(
                    &meta,
                    &entry,
                    &structure,
                    version.as_deref(),
                )?;
                println!("{template}");
            }
            TemplateKind::Meta { structure, name } => {
                println!("{}", templates::generate_meta_template(&structure, &name)?);
            }
        },
    }

    Ok(())
}
