use anyhow::Result;
use clap::{Parser, Subcommand};
use nexu::cache::StaticCache;
use nexu::content::{ContentService, SqliteContentService};
use nexu::db::{migrate, Db};
use nexu::error::NexuError;
use nexu::parsers::ParserRegistry;
use nexu::relations::{RelatedDocumentResolver, RelationService, SqliteRelationService};
use nexu::Config;
use serde_json::Value;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "nexu")]
#[command(about = "Inspect content links and related documents", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the linked documents from a property value
    Links {
        /// Property editor alias, e.g. Umbraco.ContentPicker2
        #[arg(long)]
        alias: String,
        /// Stored value: JSON, or plain text such as a document UDI
        #[arg(long)]
        value: String,
    },
    /// List the documents that link to a content item
    Related {
        /// Id of the linked (child) content item
        #[arg(long)]
        child: i32,
        /// Relation type alias (defaults to relations.document_relation_type)
        #[arg(long, conflicts_with = "all_types")]
        relation_type: Option<String>,
        /// Include relations of every type
        #[arg(long)]
        all_types: bool,
    },
    /// Verify the database schema
    Verify,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.nexu.log_level.as_str()),
    )
    .init();

    log::debug!("Database path: {}", config.db_path().display());

    let db = Db::new(config.db_path());
    let applied = db.with_connection(|conn| migrate::run_migrations(conn, config.migrations_dir()))?;
    if applied > 0 {
        log::info!("Applied {} migrations", applied);
    }

    match args.command {
        Command::Links { alias, value } => run_links(&db, &config, &alias, &value),
        Command::Related {
            child,
            relation_type,
            all_types,
        } => run_related(&db, &config, child, relation_type, all_types),
        Command::Verify => verify_database_schema(&db),
    }
}

/// CLI values are JSON when they parse as JSON, plain strings otherwise
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn run_links(db: &Db, config: &Config, alias: &str, raw: &str) -> Result<()> {
    if alias.trim().is_empty() {
        return Err(NexuError::InvalidInput("--alias must not be empty".to_string()).into());
    }

    let content = Arc::new(SqliteContentService::open(db)?);
    let cache = Arc::new(StaticCache::<Option<i32>>::new(config.cache.capacity));
    let registry = ParserRegistry::with_core_parsers(content, cache);

    if !registry.has_parser_for(Some(alias)) {
        log::warn!("No parser registered for property editor {}", alias);
    }

    let value = parse_value(raw);
    let entities = registry.linked_entities(Some(alias), Some(&value))?;
    log::info!("Found {} linked entities", entities.len());

    println!("{}", serde_json::to_string_pretty(&entities)?);
    Ok(())
}

fn run_related(
    db: &Db,
    config: &Config,
    child: i32,
    relation_type: Option<String>,
    all_types: bool,
) -> Result<()> {
    let content = Arc::new(SqliteContentService::open(db)?);
    let relations = SqliteRelationService::open(db)?;

    match content.get_by_id(child)? {
        Some(item) => log::info!("Related documents for {} ({})", item.name, item.id),
        None => log::warn!("Content item {} does not exist; resolving stored relations anyway", child),
    }

    let relation_type = if all_types {
        None
    } else {
        Some(relation_type.unwrap_or_else(|| config.relations.document_relation_type.clone()))
    };

    let records = relations.get_by_child_id(child, relation_type.as_deref())?;
    let resolver = RelatedDocumentResolver::new(content);
    let documents = resolver.resolve(Some(records.as_slice()))?;

    if documents.len() < records.len() {
        log::debug!(
            "{} relations collapsed or dropped during resolution",
            records.len() - documents.len()
        );
    }

    println!("{}", serde_json::to_string_pretty(&documents)?);
    Ok(())
}

/// Verify that all expected database objects exist
fn verify_database_schema(db: &Db) -> Result<()> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
        let tables: Vec<String> = stmt.query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

        for table in ["content", "relations", "schema_migrations"] {
            if !tables.iter().any(|t| t == table) {
                return Err(NexuError::Config(format!("Missing table: {}", table)));
            }
            log::debug!("✓ Table exists: {}", table);
        }

        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%' ORDER BY name")?;
        let indexes: Vec<String> = stmt.query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

        for index_name in [
            "idx_content_unique_key",
            "idx_relations_child_type",
            "idx_relations_parent_type",
        ] {
            if indexes.iter().any(|i| i == index_name) {
                log::debug!("✓ Index exists: {}", index_name);
            } else {
                log::warn!("Index not found: {}", index_name);
            }
        }

        let applied = migrate::applied_migrations(conn)?;
        if let Some((version, name)) = applied.last() {
            log::debug!("✓ {} migrations applied, latest {} (version {})", applied.len(), name, version);
        }

        let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
        if journal_mode.to_uppercase() != "WAL" {
            return Err(NexuError::Config(format!("Journal mode is not WAL: {}", journal_mode)));
        }

        let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if integrity != "ok" {
            return Err(NexuError::Config(format!("Database integrity check failed: {}", integrity)));
        }
        log::info!("✓ Database integrity: OK");

        Ok(())
    })?;

    log::info!("✓ Database schema verification complete");
    Ok(())
}
