//! hql2sql - Object query language to SQL translator
//!
//! This crate translates object-oriented query strings into plain SQL through:
//! - Entity mapping catalogs loaded from YAML
//! - A nom-based query parser
//! - Schema-aware path and expression resolution
//! - Dialect-specific SQL generation with ordered parameter lists

pub mod config;
pub mod entity_catalog;
pub mod execution;
pub mod hql_parser;
pub mod query_resolver;
pub mod sql_generator;
pub mod translation_cache;

use log::debug;
use thiserror::Error;

use config::TranslatorConfig;
use entity_catalog::EntityCatalog;
use execution::ResultShape;
use hql_parser::ParseError;
use query_resolver::{ResolvedStatement, ResolverError};
use sql_generator::{SqlGeneratorError, SqlStatement};
use translation_cache::{CacheKey, CacheMetrics, TranslationCache};

/// Any failure along the translation pipeline, tagged by stage.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("resolver error: {0}")]
    Resolve(#[from] ResolverError),
    #[error("generation error: {0}")]
    Generate(#[from] SqlGeneratorError),
}

/// A finished translation: the SQL statement plus the row shape the select
/// clause produced. Bulk statements report no shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub statement: SqlStatement,
    pub shape: Option<ResultShape>,
}

/// Front door of the crate: owns a catalog, a configuration, and a
/// translation cache, and turns query strings into [`Translation`]s.
pub struct Translator {
    catalog: EntityCatalog,
    config: TranslatorConfig,
    cache: TranslationCache,
}

impl Translator {
    pub fn new(catalog: EntityCatalog, config: TranslatorConfig) -> Self {
        let cache = TranslationCache::from_config(&config);
        Translator {
            catalog,
            config,
            cache,
        }
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translates a query string, consulting the cache first. Identical
    /// query text under the same dialect and flags yields the cached
    /// translation without re-parsing; concurrent callers for the same
    /// uncached key share one translation run.
    pub fn translate(&self, query: &str) -> Result<Translation, TranslationError> {
        let key = CacheKey::new(
            query,
            self.config.dialect,
            self.config.collection_join_subquery,
            &self.catalog.version,
        );
        self.cache
            .get_or_translate(key, || self.translate_uncached(query))
    }

    /// Full pipeline run with no cache involvement.
    pub fn translate_uncached(&self, query: &str) -> Result<Translation, TranslationError> {
        let parsed = hql_parser::parse(query)?;
        let plan = query_resolver::resolve(&parsed, &self.catalog, &self.config)?;
        let shape = match &plan.statement {
            ResolvedStatement::Select(q) => Some(q.result_shape.clone()),
            ResolvedStatement::Update(_) | ResolvedStatement::Delete(_) => None,
        };
        let statement = sql_generator::generate_with(
            &plan,
            self.config.dialect,
            &self.config.function_overrides,
        )?;
        debug!(
            "translated {} chars of query text into {} chars of sql",
            query.len(),
            statement.sql.len()
        );
        Ok(Translation { statement, shape })
    }

    pub fn cache_metrics(&self) -> CacheMetrics {
        self.cache.metrics()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
