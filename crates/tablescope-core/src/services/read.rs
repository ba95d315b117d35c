//! The table read service: describe, scan, query, and client-side filter.

use std::sync::Arc;

use tracing::debug;

use tablescope_model::TableInfo;

use crate::config::Config;
use crate::expression::{CompileError, Expr, ParseError, compile, parse};
use crate::provider::{ProviderError, TableProvider};
use crate::resultset::ResultSet;

/// Errors produced by read operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// The filter text failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The parsed expression failed to compile against the table.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// The store provider reported a failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Orchestrates describe/scan/query calls through a store provider and
/// materializes result sets.
#[derive(Debug)]
pub struct TableReadService<P> {
    provider: Arc<P>,
    config: Config,
}

impl<P: TableProvider> TableReadService<P> {
    /// Creates a read service over the given provider.
    pub fn new(provider: Arc<P>, config: Config) -> Self {
        Self { provider, config }
    }

    /// List the names of all tables.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Provider`] on store failure.
    pub async fn list_tables(&self) -> Result<Vec<String>, ReadError> {
        Ok(self.provider.list_tables().await?)
    }

    /// Fetch key schema and sampled attribute names for a table.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Provider`] if the table does not exist or
    /// access is denied.
    pub async fn describe(&self, table: &str) -> Result<TableInfo, ReadError> {
        debug!(table, "describing table");
        Ok(self.provider.describe_table(table).await?)
    }

    /// Unconditionally scan the table into a fresh result set with no query
    /// recorded.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Provider`] on store failure.
    pub async fn scan(&self, info: Arc<TableInfo>) -> Result<ResultSet, ReadError> {
        let items = self
            .provider
            .scan_items(&info.name, None, Some(self.config.max_scan_items))
            .await?;
        debug!(table = %info.name, count = items.len(), "scan complete");
        Ok(ResultSet::new(info, None, items))
    }

    /// Compile `expr` and execute the resulting plan, recording the
    /// expression on the result set for later re-execution.
    ///
    /// Today every plan runs as a filtered scan; items are re-filtered
    /// client-side so result contents do not depend on how much filtering
    /// the provider performed.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Compile`] on an ill-typed expression, or
    /// [`ReadError::Provider`] on store failure.
    pub async fn scan_or_query(
        &self,
        info: Arc<TableInfo>,
        expr: Expr,
    ) -> Result<ResultSet, ReadError> {
        let plan = compile(&expr, &info)?;
        debug!(table = %info.name, query = %expr, can_query = plan.can_query, "executing plan");

        let items = self
            .provider
            .scan_items(
                &info.name,
                Some(&plan.condition),
                Some(self.config.max_scan_items),
            )
            .await?;
        let items = items
            .into_iter()
            .filter(|item| plan.condition.matches(item))
            .collect();

        Ok(ResultSet::new(info, Some(expr), items))
    }

    /// Narrow an already-fetched result set without touching the store:
    /// parse and compile `filter`, keep the items that match, and preserve
    /// their existing per-item state.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Parse`] or [`ReadError::Compile`] on bad filter
    /// text. No provider access occurs.
    pub fn filter(&self, result_set: &ResultSet, filter: &str) -> Result<ResultSet, ReadError> {
        let expr = parse(filter)?;
        let plan = compile(&expr, result_set.table_info())?;

        let entries = result_set
            .entries()
            .filter(|(item, _)| plan.condition.matches(item))
            .map(|(item, state)| (item.clone(), state))
            .collect();

        Ok(ResultSet::with_states(
            result_set.table_info().clone(),
            result_set.query().cloned(),
            entries,
        ))
    }
}
