//! OpenAPI Resource Analyzer CLI
//!
//! Command-line interface for inspecting the Terraform-style resources
//! derived from Swagger 2.0 documents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use openapi_resource_analyzer_common::{AnalyzerConfig, PropertyDescriptor, ResourceDescriptor};
use openapi_resource_analyzer_parser::SwaggerParser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi-resource-analyzer")]
#[command(version, about = "Derive Terraform-style resources from Swagger 2.0 documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logs, including skipped paths)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the resources found in a Swagger document
    #[command(after_help = "EXAMPLES:\n  \
        # Show resources with their properties\n  \
        openapi-resource-analyzer resources --spec cdn-service.yaml\n\n  \
        # Dump the resource model as JSON\n  \
        openapi-resource-analyzer resources --spec cdn-service.json --output json\n\n  \
        # Use an analyser configuration file\n  \
        openapi-resource-analyzer resources --spec cdn-service.yaml --config analyzer.yaml")]
    Resources {
        /// Path to the Swagger 2.0 document (.json, .yaml or .yml)
        #[arg(short, long)]
        spec: PathBuf,

        /// Analyser configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        output: OutputFormat,
    },

    /// Print the collection or instance URL of a resource
    #[command(after_help = "EXAMPLES:\n  \
        # Collection URL of a sub-resource\n  \
        openapi-resource-analyzer url --spec cdn-service.yaml \\\n    \
        --resource cdns_v1_firewalls_v1 --parent-id cdn-1\n\n  \
        # Instance URL of a multi-region resource\n  \
        openapi-resource-analyzer url --spec cdn-service.yaml \\\n    \
        --resource lbs_v1_dub1 --id lb-1")]
    Url {
        /// Path to the Swagger 2.0 document (.json, .yaml or .yml)
        #[arg(short, long)]
        spec: PathBuf,

        /// Analyser configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Resource name (multi-region resources carry a region suffix)
        #[arg(short, long)]
        resource: String,

        /// Parent identifiers, outermost first
        #[arg(long = "parent-id")]
        parent_ids: Vec<String>,

        /// Resource identifier; prints the instance URL when given
        #[arg(long)]
        id: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human readable listing
    Table,
    /// Resource model as JSON
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Resources {
            spec,
            config,
            output,
        } => {
            resources_command(spec.as_path(), config.as_deref(), output)?;
        }
        Commands::Url {
            spec,
            config,
            resource,
            parent_ids,
            id,
        } => {
            url_command(UrlRequest {
                spec_path: spec.as_path(),
                config_path: config.as_deref(),
                resource: &resource,
                parent_ids: &parent_ids,
                id: id.as_deref(),
            })?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the verbose flag
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_resources(
    spec_path: &Path,
    config_path: Option<&Path>,
) -> Result<(SwaggerParser, Vec<ResourceDescriptor>)> {
    let config = match config_path {
        Some(path) => AnalyzerConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    tracing::debug!("Analyser configuration: {:?}", config);

    let parser = SwaggerParser::from_file(spec_path)
        .with_context(|| format!("Failed to load Swagger document {}", spec_path.display()))?
        .with_config(config);
    let resources = parser
        .parse()
        .context("Failed to analyse Swagger document")?;

    Ok((parser, resources))
}

fn resources_command(
    spec_path: &Path,
    config_path: Option<&Path>,
    output: OutputFormat,
) -> Result<()> {
    let (_, resources) = load_resources(spec_path, config_path)?;

    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&resources)
                .context("Failed to serialise resources")?;
            println!("{}", json);
        }
        OutputFormat::Table => print_resources(spec_path, &resources),
    }

    Ok(())
}

fn print_resources(spec_path: &Path, resources: &[ResourceDescriptor]) {
    println!(
        "{} {} resources in {}",
        "✓".green(),
        resources.len().to_string().bold(),
        spec_path.display()
    );

    for resource in resources {
        println!(
            "\n{} ({})",
            resource.name.cyan().bold(),
            crud_letters(resource)
        );
        println!("  Root:     {}", resource.root_path);
        println!("  Instance: {}", resource.instance_path);
        if let Some(host) = &resource.host {
            println!("  Host:     {}", host);
        }
        if let Some(region) = &resource.region {
            println!("  Region:   {} of [{}]", region.yellow(), resource.regions.join(", "));
        }
        if resource.is_sub_resource() {
            println!("  Parents:  {}", resource.parent_resource_names.join(", "));
        }

        for property in &resource.schema.properties {
            println!(
                "    • {} {} {}",
                property.preferred_name,
                property.property_type.name().dimmed(),
                property_flags(property).yellow()
            );
        }

        for polling in &resource.polling {
            println!(
                "  Polling:  {:?} {} pending [{}] target [{}]",
                polling.operation,
                polling.status_code,
                polling.pending_statuses.join(", "),
                polling.target_statuses.join(", ")
            );
        }

        let timeouts = &resource.timeouts;
        for (label, timeout) in [
            ("create", timeouts.create),
            ("read", timeouts.read),
            ("update", timeouts.update),
            ("delete", timeouts.delete),
        ] {
            if let Some(timeout) = timeout {
                println!("  Timeout:  {} {:?}", label, timeout);
            }
        }
    }
}

fn crud_letters(resource: &ResourceDescriptor) -> String {
    let mut ops = vec!["C", "R"];
    if resource.operations.update.is_some() {
        ops.push("U");
    }
    if resource.operations.delete.is_some() {
        ops.push("D");
    }
    ops.join("")
}

fn property_flags(property: &PropertyDescriptor) -> String {
    let flags = [
        (property.required, "required"),
        (property.read_only, "read-only"),
        (property.computed, "computed"),
        (property.force_new, "force-new"),
        (property.sensitive, "sensitive"),
        (property.immutable, "immutable"),
        (property.is_identifier, "id"),
        (property.is_status_identifier, "status"),
        (property.parent_property, "parent"),
    ];

    flags
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(" ")
}

struct UrlRequest<'a> {
    spec_path: &'a Path,
    config_path: Option<&'a Path>,
    resource: &'a str,
    parent_ids: &'a [String],
    id: Option<&'a str>,
}

fn url_command(request: UrlRequest) -> Result<()> {
    let (parser, resources) = load_resources(request.spec_path, request.config_path)?;
    let resource = select_resource(&resources, request.resource)?;

    let endpoint = parser.spec().endpoint();
    let parent_ids: Vec<&str> = request.parent_ids.iter().map(String::as_str).collect();
    let url = match request.id {
        Some(id) => resource.resource_instance_url(&endpoint, &parent_ids, id),
        None => resource.resource_url(&endpoint, &parent_ids),
    }
    .with_context(|| format!("Failed to build URL for {}", resource.name))?;

    println!("{}", url);
    Ok(())
}

fn select_resource<'a>(
    resources: &'a [ResourceDescriptor],
    name: &str,
) -> Result<&'a ResourceDescriptor> {
    resources
        .iter()
        .find(|r| r.name == name)
        .with_context(|| {
            let known: Vec<&str> = resources.iter().map(|r| r.name.as_str()).collect();
            format!(
                "Resource '{}' not found. Available resources: {}",
                name,
                known.join(", ")
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use openapi_resource_analyzer_common::{
        HttpMethod, OperationRef, ResourceOperations, SchemaDefinition, Timeouts,
    };

    fn descriptor(name: &str, region: Option<&str>) -> ResourceDescriptor {
        ResourceDescriptor {
            name: name.to_string(),
            root_path: "/v1/lbs".to_string(),
            instance_path: "/v1/lbs/{id}".to_string(),
            schema: SchemaDefinition::default(),
            operations: ResourceOperations {
                create: OperationRef::new("/v1/lbs", HttpMethod::Post),
                read: OperationRef::new("/v1/lbs/{id}", HttpMethod::Get),
                update: None,
                delete: Some(OperationRef::new("/v1/lbs/{id}", HttpMethod::Delete)),
            },
            polling: vec![],
            timeouts: Timeouts::default(),
            parent_resource_names: vec![],
            host: None,
            is_multi_region: region.is_some(),
            region: region.map(str::to_string),
            regions: if region.is_some() {
                vec!["rst1".to_string(), "dub1".to_string()]
            } else {
                vec![]
            },
        }
    }

    #[test]
    fn test_select_resource() {
        let resources = vec![
            descriptor("cdns_v1", None),
            descriptor("lbs_v1_rst1", Some("rst1")),
            descriptor("lbs_v1_dub1", Some("dub1")),
        ];

        assert_eq!(select_resource(&resources, "cdns_v1").unwrap().name, "cdns_v1");
        assert_eq!(
            select_resource(&resources, "lbs_v1_dub1")
                .unwrap()
                .region
                .as_deref(),
            Some("dub1")
        );

        let err = select_resource(&resources, "lbs_v1").unwrap_err();
        assert!(err
            .to_string()
            .contains("Available resources: cdns_v1, lbs_v1_rst1, lbs_v1_dub1"));
    }

    #[test]
    fn test_crud_letters() {
        assert_eq!(crud_letters(&descriptor("lbs_v1", None)), "CRD");
    }
}
