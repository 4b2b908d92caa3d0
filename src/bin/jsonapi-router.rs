//! JSON:API Router CLI
//!
//! Command-line interface for composing JSON:API URLs from query documents.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use jsonapi_router::{
    load_query, load_schema_registry, FieldDefinition, KeyFormat, ResourceRef, ResourceSchema,
    Router, SchemaRegistry,
};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "jsonapi-router")]
#[command(about = "Compose JSON:API URLs from typed query documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RouterArgs {
    /// Base URL of the JSON:API server
    #[arg(long)]
    base_url: String,

    /// Schema registry document: file path or URL (http:// or https://)
    #[arg(long)]
    schema: String,

    /// Key casing policy: as-is, dasherized, or underscored
    #[arg(long, default_value = "as-is")]
    key_format: KeyFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the URL for a query document
    Url {
        #[command(flatten)]
        router: RouterArgs,

        /// Query document (JSON)
        #[arg(long)]
        query: PathBuf,
    },

    /// Compose the URL of a resource's relationship
    Relationship {
        #[command(flatten)]
        router: RouterArgs,

        /// Resource type of the owning resource
        #[arg(long = "type")]
        resource_type: String,

        /// Relationship name as declared in the schema
        #[arg(long)]
        relationship: String,

        /// Id of the owning resource
        #[arg(long)]
        id: Option<String>,

        /// Server-supplied URL of the owning resource
        #[arg(long)]
        resource_url: Option<String>,

        /// Server-supplied self link of the relationship (returned as-is)
        #[arg(long)]
        self_url: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Url { router, query } => run_url(&router, &query),
        Commands::Relationship {
            router,
            resource_type,
            relationship,
            id,
            resource_url,
            self_url,
        } => run_relationship(
            &router,
            RelationshipArgs {
                resource_type,
                relationship,
                id,
                resource_url,
                self_url,
            },
        ),
    };

    match result {
        Ok(url) => {
            println!("{}", url);
            ExitCode::SUCCESS
        }
        Err(code) => ExitCode::from(code),
    }
}

fn build_router(args: &RouterArgs) -> Result<(Router, SchemaRegistry), u8> {
    let schema = load_schema_registry(&args.schema).map_err(|e| {
        eprintln!("Error loading schema: {}", e);
        e.exit_code() as u8
    })?;

    let base_url = parse_url(&args.base_url)?;
    let router = Router::new(base_url, schema.clone())
        .map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?
        .key_formatter(args.key_format);

    Ok((router, schema))
}

fn parse_url(raw: &str) -> Result<Url, u8> {
    Url::parse(raw).map_err(|e| {
        eprintln!("Error: invalid URL '{}': {}", raw, e);
        2u8
    })
}

fn run_url(args: &RouterArgs, query_path: &Path) -> Result<Url, u8> {
    let (router, _) = build_router(args)?;

    let query = load_query(query_path).map_err(|e| {
        eprintln!("Error loading query: {}", e);
        e.exit_code() as u8
    })?;

    router.url_for_query(&query).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

struct RelationshipArgs {
    resource_type: String,
    relationship: String,
    id: Option<String>,
    resource_url: Option<String>,
    self_url: Option<String>,
}

fn run_relationship(args: &RouterArgs, rel: RelationshipArgs) -> Result<Url, u8> {
    let (router, schema) = build_router(args)?;

    let relationship = match schema.field_named(&rel.resource_type, &rel.relationship) {
        Some(FieldDefinition::Relationship(relationship)) => relationship.clone(),
        Some(FieldDefinition::Attribute(_)) => {
            eprintln!(
                "Error: \"{}\" on \"{}\" is an attribute, not a relationship",
                rel.relationship, rel.resource_type
            );
            return Err(2);
        }
        None => {
            eprintln!(
                "Error: resource type \"{}\" has no relationship \"{}\"",
                rel.resource_type, rel.relationship
            );
            return Err(2);
        }
    };

    let mut resource = ResourceRef::new(rel.resource_type);
    if let Some(id) = rel.id {
        resource = resource.with_id(id);
    }
    if let Some(raw) = &rel.resource_url {
        resource = resource.with_url(parse_url(raw)?);
    }
    if let Some(raw) = &rel.self_url {
        resource = resource.with_relationship_url(&relationship.name, parse_url(raw)?);
    }

    router
        .url_for_relationship(&relationship, &resource)
        .map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })
}
