//! Column-oriented capture of simulation events.
//!
//! A `tracing` subscriber that turns every info-level event into a row of the
//! table named by the event's target. Columns appear the first time a field
//! is seen, so the schema follows whatever the simulation emits.
//!
//! # Usage
//!
//! ```ignore
//! // In simulation code:
//! tracing::info!(target: "world_tick", tick, total_food, pollution);
//!
//! // In a test:
//! let recorder = instrument::record(|| run_ticks(100));
//! let food = recorder.table("world_tick").unwrap().f64_column("total_food");
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use polars::prelude::*;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Metadata, Subscriber};

/// A column of typed values.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedColumn {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl TypedColumn {
    pub fn len(&self) -> usize {
        match self {
            TypedColumn::U64(v) => v.len(),
            TypedColumn::I64(v) => v.len(),
            TypedColumn::F64(v) => v.len(),
            TypedColumn::Bool(v) => v.len(),
            TypedColumn::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extend with default values until the column holds `rows` entries.
    fn pad_to(&mut self, rows: usize) {
        let missing = rows.saturating_sub(self.len());
        if missing == 0 {
            return;
        }
        match self {
            TypedColumn::U64(v) => v.resize(rows, 0),
            TypedColumn::I64(v) => v.resize(rows, 0),
            TypedColumn::F64(v) => v.resize(rows, 0.0),
            TypedColumn::Bool(v) => v.resize(rows, false),
            TypedColumn::Str(v) => v.resize(rows, String::new()),
        }
    }
}

/// Conversion of a recorded scalar into its column variant.
trait ColumnValue: Sized {
    fn empty_column(rows: usize) -> TypedColumn;
    fn push_into(self, column: &mut TypedColumn);
}

macro_rules! column_value {
    ($ty:ty, $variant:ident, $default:expr) => {
        impl ColumnValue for $ty {
            fn empty_column(rows: usize) -> TypedColumn {
                TypedColumn::$variant(vec![$default; rows])
            }

            fn push_into(self, column: &mut TypedColumn) {
                if let TypedColumn::$variant(v) = column {
                    v.push(self);
                }
            }
        }
    };
}

column_value!(u64, U64, 0);
column_value!(i64, I64, 0);
column_value!(f64, F64, 0.0);
column_value!(bool, Bool, false);
column_value!(String, Str, String::new());

/// A table with dynamically-typed columns.
#[derive(Debug, Clone, Default)]
pub struct DynamicTable {
    pub columns: HashMap<String, TypedColumn>,
    pub row_count: usize,
}

impl DynamicTable {
    /// Pad every column to the current row count so columns stay aligned
    /// when an event omits some fields.
    fn pad_columns_to_row_count(&mut self) {
        let rows = self.row_count;
        for col in self.columns.values_mut() {
            col.pad_to(rows);
        }
    }

    /// Append `value` to column `name`, creating it pre-padded if new.
    fn push<V: ColumnValue>(&mut self, name: &str, value: V) {
        let rows = self.row_count;
        let col = self
            .columns
            .entry(name.to_string())
            .or_insert_with(|| V::empty_column(rows));
        value.push_into(col);
    }

    pub fn f64_column(&self, name: &str) -> Option<&[f64]> {
        match self.columns.get(name)? {
            TypedColumn::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn u64_column(&self, name: &str) -> Option<&[u64]> {
        match self.columns.get(name)? {
            TypedColumn::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn str_column(&self, name: &str) -> Option<&[String]> {
        match self.columns.get(name)? {
            TypedColumn::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Convert this table to a polars DataFrame.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut names: Vec<&String> = self.columns.keys().collect();
        names.sort();

        let columns: Vec<Column> = names
            .into_iter()
            .map(|name| match &self.columns[name] {
                TypedColumn::U64(v) => Column::new(name.into(), v),
                TypedColumn::I64(v) => Column::new(name.into(), v),
                TypedColumn::F64(v) => Column::new(name.into(), v),
                TypedColumn::Bool(v) => Column::new(name.into(), v),
                TypedColumn::Str(v) => Column::new(name.into(), v),
            })
            .collect();

        DataFrame::new(columns)
    }
}

/// Collection of tables, keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub tables: HashMap<String, DynamicTable>,
}

impl Recorder {
    pub fn table(&self, target: &str) -> Option<&DynamicTable> {
        self.tables.get(target)
    }

    /// Rows recorded under `target`, zero if nothing was emitted there.
    pub fn rows(&self, target: &str) -> usize {
        self.table(target).map_or(0, |t| t.row_count)
    }

    /// Convert all tables to polars DataFrames.
    pub fn to_dataframes(&self) -> HashMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}

thread_local! {
    static RECORDER: RefCell<Recorder> = RefCell::default();
}

/// Visitor that writes event fields into one row of a table.
struct RowVisitor<'a> {
    table: &'a mut DynamicTable,
}

impl Visit for RowVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.table.push(field.name(), value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.table.push(field.name(), value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.table.push(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.table.push(field.name(), value);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.table.push(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.table.push(field.name(), format!("{:?}", value));
    }
}

/// Tracing subscriber that collects events into column-oriented tables.
pub struct DataFrameSubscriber;

impl Subscriber for DataFrameSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        // Info and above only; debug chatter stays out of the tables
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let target = event.metadata().target().to_string();

        RECORDER.with(|r| {
            let mut recorder = r.borrow_mut();
            let table = recorder.tables.entry(target).or_default();

            table.pad_columns_to_row_count();
            event.record(&mut RowVisitor {
                table: &mut *table,
            });
            table.row_count += 1;
            table.pad_columns_to_row_count();
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Drain all recorded data from the thread-local recorder.
pub fn drain() -> Recorder {
    RECORDER.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

/// Clear all recorded data without returning it.
pub fn clear() {
    RECORDER.with(|r| *r.borrow_mut() = Recorder::default());
}

/// Run `f` with a scoped DataFrameSubscriber and return what it emitted.
///
/// Safe to use from parallel tests: both the subscriber and the recorder
/// are per-thread.
pub fn record(f: impl FnOnce()) -> Recorder {
    clear();
    tracing::subscriber::with_default(DataFrameSubscriber, f);
    drain()
}
