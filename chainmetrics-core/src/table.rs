//! Tabular form of a reshaped metric.
//!
//! A [`MetricTable`] is a time column followed by named value columns. Rows
//! keep the order the API returned them in; filtering produces a fresh table
//! whose rows are numbered from zero again. Tuple-valued columns only exist
//! between reshaping and [`MetricTable::split_tuple_column`].

use crate::error::MetricsError;
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Name of the time column in every table the client produces.
pub const TIME_COLUMN: &str = "time";

/// Values of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Scalar(Vec<f64>),
    Tuple(Vec<Vec<f64>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Scalar(values) => values.len(),
            ColumnData::Tuple(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_scalar(&self) -> Option<&[f64]> {
        match self {
            ColumnData::Scalar(values) => Some(values),
            ColumnData::Tuple(_) => None,
        }
    }

    /// Gather rows by index, in the order given.
    fn take(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Scalar(values) => {
                ColumnData::Scalar(rows.iter().map(|&i| values[i]).collect())
            }
            ColumnData::Tuple(tuples) => {
                ColumnData::Tuple(rows.iter().map(|&i| tuples[i].clone()).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub name: String,
    pub data: ColumnData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    time_name: String,
    times: Vec<NaiveDateTime>,
    columns: Vec<TableColumn>,
}

impl MetricTable {
    /// A table with only its time column.
    pub fn new(time_name: impl Into<String>, times: Vec<NaiveDateTime>) -> Self {
        Self {
            time_name: time_name.into(),
            times,
            columns: Vec::new(),
        }
    }

    pub fn with_column(
        mut self,
        name: impl Into<String>,
        data: ColumnData,
    ) -> Result<Self, MetricsError> {
        self.push_column(name, data)?;
        Ok(self)
    }

    /// Append a column; its length must match the time column and its name
    /// must be unused.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        data: ColumnData,
    ) -> Result<(), MetricsError> {
        let name = name.into();
        if data.len() != self.times.len() {
            return Err(MetricsError::Shape(format!(
                "column '{name}' has {} rows, table has {}",
                data.len(),
                self.times.len()
            )));
        }
        if name == self.time_name || self.column(&name).is_some() {
            return Err(MetricsError::InvalidArgument(format!(
                "duplicate column name '{name}'"
            )));
        }
        self.columns.push(TableColumn { name, data });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn time_name(&self) -> &str {
        &self.time_name
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    /// All column names, time column first.
    pub fn column_names(&self) -> Vec<&str> {
        std::iter::once(self.time_name.as_str())
            .chain(self.columns.iter().map(|c| c.name.as_str()))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.data)
    }

    /// Values of a scalar column.
    pub fn scalar(&self, name: &str) -> Option<&[f64]> {
        self.column(name).and_then(ColumnData::as_scalar)
    }

    /// Swap the data of an existing column in place, keeping its position.
    pub fn replace_column(&mut self, name: &str, data: ColumnData) -> Result<(), MetricsError> {
        if data.len() != self.times.len() {
            return Err(MetricsError::Shape(format!(
                "replacement for '{name}' has {} rows, table has {}",
                data.len(),
                self.times.len()
            )));
        }
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| MetricsError::Shape(format!("no column named '{name}'")))?;
        column.data = data;
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Option<ColumnData> {
        let pos = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(pos).data)
    }

    /// Keep the rows whose time satisfies `keep`, preserving order.
    pub fn filter_by_time(&self, keep: impl Fn(&NaiveDateTime) -> bool) -> MetricTable {
        let rows: Vec<usize> = self
            .times
            .iter()
            .enumerate()
            .filter(|(_, t)| keep(t))
            .map(|(i, _)| i)
            .collect();
        self.take_rows(&rows)
    }

    fn take_rows(&self, rows: &[usize]) -> MetricTable {
        MetricTable {
            time_name: self.time_name.clone(),
            times: rows.iter().map(|&i| self.times[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| TableColumn {
                    name: c.name.clone(),
                    data: c.data.take(rows),
                })
                .collect(),
        }
    }

    /// Project a tuple column into scalar columns by position.
    ///
    /// The new columns are appended in `names` order and the tuple column is
    /// dropped. Every row must carry exactly `names.len()` fields, except a
    /// missing row (a single NaN) which becomes NaN in every new column. A
    /// column of missing values only, or an empty one, may still be scalar.
    pub fn split_tuple_column(&mut self, name: &str, names: &[&str]) -> Result<(), MetricsError> {
        let width = names.len();
        let tuples: Vec<Vec<f64>> = match self.column(name) {
            Some(ColumnData::Tuple(rows)) => rows
                .iter()
                .map(|row| match row.as_slice() {
                    [v] if v.is_nan() => vec![f64::NAN; width],
                    _ => row.clone(),
                })
                .collect(),
            Some(ColumnData::Scalar(values)) if values.iter().all(|v| v.is_nan()) => {
                vec![vec![f64::NAN; width]; values.len()]
            }
            Some(ColumnData::Scalar(_)) => {
                return Err(MetricsError::Shape(format!(
                    "column '{name}' holds single values, not tuples"
                )))
            }
            None => return Err(MetricsError::Shape(format!("no column named '{name}'"))),
        };

        if let Some((row, bad)) = tuples.iter().enumerate().find(|(_, t)| t.len() != width) {
            return Err(MetricsError::Shape(format!(
                "row {row} of '{name}' has {} fields, expected {width}",
                bad.len()
            )));
        }

        let mut seen = HashSet::new();
        if let Some(clash) = names.iter().find(|n| {
            !seen.insert(**n)
                || **n == self.time_name
                || (**n != name && self.columns.iter().any(|c| c.name == **n))
        }) {
            return Err(MetricsError::InvalidArgument(format!(
                "duplicate column name '{clash}'"
            )));
        }

        let split: Vec<ColumnData> = (0..width)
            .map(|pos| ColumnData::Scalar(tuples.iter().map(|t| t[pos]).collect()))
            .collect();

        self.remove_column(name);
        for (new_name, data) in names.iter().zip(split) {
            self.push_column(*new_name, data)?;
        }
        Ok(())
    }

    /// Inner join on the time column.
    ///
    /// Left row order is kept; a time present several times on the right
    /// yields one row per match. Value columns whose names clash get `_x`
    /// (left) and `_y` (right) suffixes.
    pub fn inner_join(&self, right: &MetricTable) -> MetricTable {
        let mut index: HashMap<NaiveDateTime, Vec<usize>> = HashMap::new();
        for (j, t) in right.times.iter().enumerate() {
            index.entry(*t).or_default().push(j);
        }

        let mut left_rows = Vec::new();
        let mut right_rows = Vec::new();
        for (i, t) in self.times.iter().enumerate() {
            if let Some(matches) = index.get(t) {
                for &j in matches {
                    left_rows.push(i);
                    right_rows.push(j);
                }
            }
        }

        let left_names: HashSet<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        let right_names: HashSet<&str> = right.columns.iter().map(|c| c.name.as_str()).collect();

        let left_columns = self.columns.iter().map(|c| TableColumn {
            name: if right_names.contains(c.name.as_str()) {
                format!("{}_x", c.name)
            } else {
                c.name.clone()
            },
            data: c.data.take(&left_rows),
        });
        let right_columns = right.columns.iter().map(|c| TableColumn {
            name: if left_names.contains(c.name.as_str()) {
                format!("{}_y", c.name)
            } else {
                c.name.clone()
            },
            data: c.data.take(&right_rows),
        });

        MetricTable {
            time_name: self.time_name.clone(),
            times: left_rows.iter().map(|&i| self.times[i]).collect(),
            columns: left_columns.chain(right_columns).collect(),
        }
    }

    /// Convert to a Polars DataFrame.
    ///
    /// The time column becomes `Datetime(ms)`; tuple columns are spread into
    /// `name.0`, `name.1`, ... by position.
    pub fn to_dataframe(&self) -> Result<DataFrame, MetricsError> {
        let millis: Vec<i64> = self
            .times
            .iter()
            .map(|t| t.and_utc().timestamp_millis())
            .collect();

        let mut columns = vec![Column::new(self.time_name.as_str().into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .map_err(|e| MetricsError::Export(format!("time cast: {e}")))?];

        for column in &self.columns {
            match &column.data {
                ColumnData::Scalar(values) => {
                    columns.push(Column::new(column.name.as_str().into(), values.clone()));
                }
                ColumnData::Tuple(rows) => {
                    let arity = rows.iter().map(Vec::len).max().unwrap_or(0);
                    for pos in 0..arity {
                        let values: Vec<Option<f64>> =
                            rows.iter().map(|r| r.get(pos).copied()).collect();
                        columns.push(Column::new(
                            format!("{}.{pos}", column.name).into(),
                            values,
                        ));
                    }
                }
            }
        }

        DataFrame::new(columns)
            .map_err(|e| MetricsError::Export(format!("dataframe creation: {e}")))
    }

    /// Write the table as CSV with a header row.
    pub fn write_csv(&self, path: &Path) -> Result<(), MetricsError> {
        let mut df = self.to_dataframe()?;
        let file = fs::File::create(path)
            .map_err(|e| MetricsError::Export(format!("create {}: {e}", path.display())))?;
        CsvWriter::new(file)
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| MetricsError::Export(format!("write csv: {e}")))
    }

    /// Write the table as a Parquet file.
    pub fn write_parquet(&self, path: &Path) -> Result<(), MetricsError> {
        let mut df = self.to_dataframe()?;
        let file = fs::File::create(path)
            .map_err(|e| MetricsError::Export(format!("create {}: {e}", path.display())))?;
        ParquetWriter::new(file)
            .finish(&mut df)
            .map_err(|e| MetricsError::Export(format!("write parquet: {e}")))?;
        Ok(())
    }
}
