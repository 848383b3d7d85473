use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use entityql::entity_catalog::{EntityNamesResolver, PropertyHelper};
use entityql::hql_parser::{
    self,
    ast::{BooleanExpression, HqlStatement, Operand},
};
use entityql::search_query_generator::to_search_request;
use entityql::{
    EngineConfig, EntityCatalog, EntityType, JsonPredicateFactory, PropertyValue,
    QueryDelegates, QueryParser,
};

/// entityql - compile an entity query into a JSON search request
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML entity schema
    #[arg(long)]
    schema: PathBuf,

    /// Query text, e.g. "from Book b where b.id = :id"
    #[arg(long)]
    query: String,

    /// Named parameter as name=value; repeatable
    #[arg(long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,

    /// YAML engine configuration; ENTITYQL_* environment variables otherwise
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the parsing result instead of the assembled search request
    #[arg(long)]
    raw: bool,
}

fn split_param(param: &str) -> anyhow::Result<(&str, &str)> {
    param
        .split_once('=')
        .map(|(name, value)| (name.trim().trim_start_matches(':'), value))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| anyhow!("invalid parameter '{}', expected NAME=VALUE", param))
}

/// Property segments each named parameter is compared against, relative to
/// the target entity. Parameters used in several places keep the first one.
fn parameter_targets(statement: &HqlStatement<'_>) -> HashMap<String, Vec<String>> {
    let roots: Vec<&str> = statement
        .from_clause
        .persister_spaces
        .iter()
        .map(|space| space.alias.unwrap_or(space.entity_name))
        .collect();

    let mut joins: HashMap<&str, Vec<String>> = HashMap::new();
    for join in &statement.from_clause.joins {
        if let Some(path) = relative_path(&join.path.segments, &roots, &joins) {
            joins.entry(join.alias).or_insert(path);
        }
    }

    let mut targets = HashMap::new();
    let mut visit = |path: &Operand<'_>, operands: &[&Operand<'_>]| {
        let Operand::Path(path) = path else {
            return;
        };
        let Some(segments) = relative_path(&path.segments, &roots, &joins) else {
            return;
        };
        for operand in operands {
            if let Operand::NamedParameter(name) = operand {
                targets
                    .entry(name.to_string())
                    .or_insert_with(|| segments.clone());
            }
        }
    };

    let mut pending: Vec<&BooleanExpression<'_>> =
        statement.where_clause.iter().map(|w| &w.conditions).collect();
    while let Some(expression) = pending.pop() {
        match expression {
            BooleanExpression::And(children) | BooleanExpression::Or(children) => {
                pending.extend(children.iter())
            }
            BooleanExpression::Not(child) => pending.push(child),
            BooleanExpression::Comparison { left, right, .. } => {
                visit(left, &[right]);
                visit(right, &[left]);
            }
            BooleanExpression::Between {
                operand,
                lower,
                upper,
                ..
            } => visit(operand, &[lower, upper]),
            BooleanExpression::In {
                operand, values, ..
            } => visit(operand, &values.iter().collect::<Vec<_>>()),
            BooleanExpression::Like { .. } | BooleanExpression::IsNull { .. } => {}
        }
    }
    targets
}

fn relative_path(
    segments: &[&str],
    roots: &[&str],
    joins: &HashMap<&str, Vec<String>>,
) -> Option<Vec<String>> {
    let (first, rest) = segments.split_first()?;
    let mut path = if roots.contains(first) {
        Vec::new()
    } else if let Some(join) = joins.get(first) {
        join.clone()
    } else {
        vec![first.to_string()]
    };
    path.extend(rest.iter().map(|s| s.to_string()));
    (!path.is_empty()).then_some(path)
}

fn target_entity(statement: &HqlStatement<'_>, catalog: &EntityCatalog) -> Option<EntityType> {
    let space = statement.from_clause.persister_spaces.first()?;
    catalog.resolve_entity_type(space.entity_name)
}

/// Type each `--param` by the property it is compared against; values whose
/// target cannot be determined stay strings.
fn typed_parameters(
    cli: &Cli,
    catalog: &EntityCatalog,
) -> anyhow::Result<HashMap<String, PropertyValue>> {
    let statement = hql_parser::parse_query(&cli.query).ok();
    let entity = statement
        .as_ref()
        .and_then(|statement| target_entity(statement, catalog));
    let targets = statement
        .as_ref()
        .map(parameter_targets)
        .unwrap_or_default();

    let mut parameters = HashMap::new();
    for param in &cli.params {
        let (name, value) = split_param(param)?;
        let typed = match (&entity, targets.get(name)) {
            (Some(entity), Some(path)) if catalog.has_property(entity, path) => catalog
                .convert_to_property_type(entity, path, value)
                .with_context(|| format!("parameter ':{}'", name))?,
            _ => PropertyValue::String(value.to_string()),
        };
        log::debug!("Parameter :{} = {:?}", name, typed);
        parameters.insert(name.to_string(), typed);
    }
    Ok(parameters)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::from_env().context("reading ENTITYQL_* environment")?,
    };

    let catalog = EntityCatalog::from_yaml_file(&cli.schema)
        .with_context(|| format!("loading schema {}", cli.schema.display()))?;
    let parameters = typed_parameters(&cli, &catalog)?;

    let factory = JsonPredicateFactory::new();
    let delegates = QueryDelegates::new(&catalog, &factory, &parameters);
    let result = QueryParser::new(config)
        .parse(&cli.query, &delegates)
        .map_err(|e| anyhow!("{} [{}]", e, e.code()))?;

    let output = if cli.raw {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string_pretty(&to_search_request(&result))?
    };
    println!("{}", output);
    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();
    // Defaults to WARN level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
