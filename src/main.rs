use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::Parser;

use hql2sql::config::{SqlDialectKind, TranslatorConfig};
use hql2sql::entity_catalog::load_catalog;
use hql2sql::Translator;

/// hql2sql - translate object queries into SQL
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the entity mapping YAML file
    #[arg(long, short = 'm')]
    mapping: PathBuf,

    /// Query text to translate
    query: Option<String>,

    /// Read the query from a file instead of the command line
    #[arg(long, conflicts_with = "query")]
    query_file: Option<PathBuf>,

    /// Target SQL dialect (generic, postgres, mysql); overrides HQL2SQL_DIALECT
    #[arg(long)]
    dialect: Option<String>,

    /// Emit the result as JSON (sql, parameters, shape)
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let query = match (&cli.query, &cli.query_file) {
        (Some(q), _) => q.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read query file {}", path.display()))?,
        (None, None) => bail!("provide a query argument or --query-file"),
    };

    let mut config = TranslatorConfig::from_env().context("invalid environment configuration")?;
    if let Some(dialect) = &cli.dialect {
        config.dialect = SqlDialectKind::from_str(dialect).context("invalid --dialect")?;
    }

    let catalog = load_catalog(&cli.mapping)
        .with_context(|| format!("failed to load mapping {}", cli.mapping.display()))?;
    let translator = Translator::new(catalog, config);

    let translation = translator.translate(query.trim())?;

    if cli.json {
        let out = serde_json::json!({
            "sql": translation.statement.sql,
            "parameters": translation.statement.parameters,
            "shape": translation.shape,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", translation.statement.sql);
        for (i, param) in translation.statement.parameters.iter().enumerate() {
            println!("-- ${}: {}", i + 1, param.source);
        }
    }

    Ok(())
}
