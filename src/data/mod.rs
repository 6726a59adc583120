//! Data module - CSV loading, column catalog and table summaries

mod columns;
mod loader;
mod table;

pub use columns::{
    ColumnCatalog, ColumnTag, Granularity, Month, Season, TemporalPeriod, UnknownMonth,
    VariableCategory, VariableSet, STATIC_COLUMNS,
};
pub use loader::{load_table, DatasetStore, LoaderError};
pub use table::{
    ConsistencyReport, FamilyCount, ObservationTable, ZoneCount, FAMILY_COL, PRESENCE_COL,
    ZONE_COL,
};

#[cfg(test)]
pub(crate) use table::tests::sample_table;
