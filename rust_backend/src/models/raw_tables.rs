//! The per-batch result mapping.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{DateRange, Table, TableName};

/// Outcome of loading one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableFetch {
    Loaded { table: Table },
    Failed { reason: String },
}

impl TableFetch {
    pub fn is_loaded(&self) -> bool {
        matches!(self, TableFetch::Loaded { .. })
    }

    pub fn table(&self) -> Option<&Table> {
        match self {
            TableFetch::Loaded { table } => Some(table),
            TableFetch::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            TableFetch::Loaded { .. } => None,
            TableFetch::Failed { reason } => Some(reason),
        }
    }

    /// Rows loaded; a failed fetch counts as zero.
    pub fn row_count(&self) -> usize {
        self.table().map(Table::len).unwrap_or(0)
    }

    /// Collapse to a table, substituting an empty one for a failure.
    pub fn into_table(self) -> Table {
        match self {
            TableFetch::Loaded { table } => table,
            TableFetch::Failed { .. } => Table::empty(),
        }
    }
}

/// All nine tables of one batch, keyed by [`TableName`].
///
/// Built only by [`RawTables::new`], which fills every key missing from the
/// input with a failure, so the mapping always holds exactly the nine keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTables {
    range: DateRange,
    tables: BTreeMap<TableName, TableFetch>,
}

impl RawTables {
    pub fn new(range: DateRange, fetched: impl IntoIterator<Item = (TableName, TableFetch)>) -> Self {
        let mut tables: BTreeMap<_, _> = fetched.into_iter().collect();
        for name in TableName::ALL {
            tables.entry(name).or_insert_with(|| TableFetch::Failed {
                reason: "table was not fetched".to_string(),
            });
        }
        Self { range, tables }
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn get(&self, name: TableName) -> &TableFetch {
        // every key is present, see `new`
        &self.tables[&name]
    }

    /// Loaded table for `name`, `None` if its query failed.
    pub fn table(&self, name: TableName) -> Option<&Table> {
        self.get(name).table()
    }

    pub fn row_count(&self, name: TableName) -> usize {
        self.get(name).row_count()
    }

    pub fn keys(&self) -> impl Iterator<Item = TableName> + '_ {
        self.tables.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TableName, &TableFetch)> + '_ {
        self.tables.iter().map(|(name, fetch)| (*name, fetch))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables whose query failed, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = (TableName, &str)> + '_ {
        self.tables
            .iter()
            .filter_map(|(name, fetch)| fetch.failure().map(|reason| (*name, reason)))
    }

    /// True when all nine queries succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Plain `name -> table` view; failures become empty tables.
    pub fn into_tables(self) -> BTreeMap<TableName, Table> {
        self.tables
            .into_iter()
            .map(|(name, fetch)| (name, fetch.into_table()))
            .collect()
    }
}
