//! Storage backend (Arrow/Parquet)
//!
//! Observations live in Arrow record batches with two columns:
//! - `group`: group label (`Utf8`, non-null)
//! - `strength`: measurement (`Float64`, non-null)
//!
//! **Append-only**: batches are added whole and never updated in place.
//! The statistics layer never touches Arrow directly; it receives
//! [`GroupedSamples`] built by [`StorageEngine::groups`].

use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, Float64Array, RecordBatch, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::Arc;

/// Name of the group label column
pub const GROUP_COLUMN: &str = "group";

/// Name of the measurement column
pub const VALUE_COLUMN: &str = "strength";

/// Canonical schema for observation tables
#[must_use]
pub fn observation_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(GROUP_COLUMN, DataType::Utf8, false),
        Field::new(VALUE_COLUMN, DataType::Float64, false),
    ]))
}

/// Storage engine for Arrow/Parquet observation tables
#[derive(Debug, Clone, Default)]
pub struct StorageEngine {
    batches: Vec<RecordBatch>,
}

impl StorageEngine {
    /// Create a new storage engine from existing batches
    #[must_use]
    pub fn new(batches: Vec<RecordBatch>) -> Self {
        Self { batches }
    }

    /// Build a single-batch table from `(label, value)` rows
    ///
    /// # Errors
    /// Returns error if the batch cannot be assembled
    pub fn from_observations(rows: &[(&str, f64)]) -> Result<Self> {
        let labels: ArrayRef =
            Arc::new(StringArray::from_iter_values(rows.iter().map(|(g, _)| *g)));
        let values: ArrayRef =
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|(_, v)| *v)));
        let batch = RecordBatch::try_new(observation_schema(), vec![labels, values])?;
        Ok(Self::new(vec![batch]))
    }

    /// Load table from Parquet file
    ///
    /// The file must contain `group` and `strength` columns; other columns
    /// are carried along and ignored by the analysis.
    ///
    /// # Errors
    /// - [`Error::Io`] if the file cannot be opened
    /// - [`Error::StorageError`] if it cannot be parsed as Parquet
    pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
        use std::fs::File;

        let file = File::open(path.as_ref())?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
            Error::StorageError(format!("Failed to parse Parquet file: {e}"))
        })?;

        let reader = builder.build().map_err(|e| {
            Error::StorageError(format!("Failed to create Parquet reader: {e}"))
        })?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| {
                Error::StorageError(format!("Failed to read record batch: {e}"))
            })?;
            batches.push(batch);
        }

        tracing::debug!(
            path = %path.as_ref().display(),
            batches = batches.len(),
            "loaded parquet table"
        );
        Ok(Self { batches })
    }

    /// Get all record batches
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total number of rows across batches
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Append batches to storage
    ///
    /// # Errors
    ///
    /// Returns error if batch schema doesn't match existing batches
    pub fn append_batch(&mut self, batch: RecordBatch) -> Result<()> {
        if let Some(first) = self.batches.first() {
            let existing_schema = first.schema();
            if batch.schema() != existing_schema {
                return Err(Error::StorageError(format!(
                    "Schema mismatch: expected {:?}, got {:?}",
                    existing_schema,
                    batch.schema()
                )));
            }
        }

        self.batches.push(batch);
        Ok(())
    }

    /// Partition rows into groups, ordered by first appearance
    ///
    /// The label column may be any string-like type and the value column any
    /// numeric type; both are cast before reading.
    ///
    /// # Errors
    ///
    /// - [`Error::StorageError`] when a column is missing, cannot be cast, or
    ///   contains nulls
    /// - [`Error::InvalidInput`] when a value is not finite or the table is empty
    pub fn groups(&self) -> Result<GroupedSamples> {
        let mut grouped = GroupedSamples::default();

        for batch in &self.batches {
            let labels = column_as(batch, GROUP_COLUMN, &DataType::Utf8)?;
            let labels = labels
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| Error::Other("Failed to downcast to StringArray".to_string()))?;

            let values = column_as(batch, VALUE_COLUMN, &DataType::Float64)?;
            let values = values
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| Error::Other("Failed to downcast to Float64Array".to_string()))?;

            if labels.null_count() > 0 || values.null_count() > 0 {
                return Err(Error::StorageError(format!(
                    "Null values in '{GROUP_COLUMN}' or '{VALUE_COLUMN}' are not supported"
                )));
            }

            for (label, value) in labels.iter().flatten().zip(values.values().iter()) {
                if !value.is_finite() {
                    return Err(Error::InvalidInput(format!(
                        "Non-finite measurement {value} in group '{label}'"
                    )));
                }
                grouped.push(label, *value);
            }
        }

        if grouped.is_empty() {
            return Err(Error::InvalidInput("No data in storage".to_string()));
        }

        Ok(grouped)
    }
}

/// Look up a column by name and cast it to `target`
fn column_as(batch: &RecordBatch, name: &str, target: &DataType) -> Result<ArrayRef> {
    let index = batch
        .schema()
        .index_of(name)
        .map_err(|_| Error::StorageError(format!("Column not found: {name}")))?;
    let column = batch.column(index);
    if column.data_type() == target {
        return Ok(Arc::clone(column));
    }
    cast(column, target).map_err(|e| {
        Error::StorageError(format!(
            "Column '{name}' of type {:?} cannot be read as {target:?}: {e}",
            column.data_type()
        ))
    })
}

/// Observations of one group
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Group label
    pub label: String,
    /// Measurements in row order
    pub values: Vec<f64>,
}

/// Observations partitioned by group label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedSamples {
    groups: Vec<Group>,
    index: FxHashMap<String, usize>,
}

impl GroupedSamples {
    /// Build from `(label, value)` pairs, groups in first-appearance order
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut grouped = Self::default();
        for (label, value) in pairs {
            grouped.push(label, value);
        }
        grouped
    }

    fn push(&mut self, label: &str, value: f64) {
        if let Some(&i) = self.index.get(label) {
            self.groups[i].values.push(value);
        } else {
            self.index.insert(label.to_string(), self.groups.len());
            self.groups.push(Group {
                label: label.to_string(),
                values: vec![value],
            });
        }
    }

    /// Groups in their current order
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Observations of one group
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&[f64]> {
        self.index
            .get(label)
            .map(|&i| self.groups[i].values.as_slice())
    }

    /// Number of groups
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total observations across groups
    #[must_use]
    pub fn total_observations(&self) -> usize {
        self.groups.iter().map(|g| g.values.len()).sum()
    }

    /// Borrow each group's observations, in group order
    #[must_use]
    pub fn as_slices(&self) -> Vec<&[f64]> {
        self.groups.iter().map(|g| g.values.as_slice()).collect()
    }

    /// Copy with groups ordered lexicographically by label
    #[must_use]
    pub fn sorted_by_label(&self) -> Self {
        let mut groups = self.groups.clone();
        groups.sort_by(|a, b| a.label.cmp(&b.label));
        let index = groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.label.clone(), i))
            .collect();
        Self { groups, index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float32Array, Int32Array};

    fn sample_rows() -> Vec<(&'static str, f64)> {
        vec![
            ("b", 1.0),
            ("a", 2.0),
            ("b", 3.0),
            ("c", 4.0),
            ("a", 5.0),
        ]
    }

    #[test]
    fn test_from_observations_schema() {
        let storage = StorageEngine::from_observations(&sample_rows()).unwrap();
        assert_eq!(storage.batches().len(), 1);
        assert_eq!(storage.num_rows(), 5);
        assert_eq!(storage.batches()[0].schema(), observation_schema());
    }

    #[test]
    fn test_groups_first_appearance_order() {
        let storage = StorageEngine::from_observations(&sample_rows()).unwrap();
        let grouped = storage.groups().unwrap();
        let labels: Vec<_> = grouped.groups().iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
        assert_eq!(grouped.get("b"), Some(&[1.0, 3.0][..]));
        assert_eq!(grouped.get("a"), Some(&[2.0, 5.0][..]));
        assert_eq!(grouped.get("missing"), None);
        assert_eq!(grouped.total_observations(), 5);
    }

    #[test]
    fn test_sorted_by_label() {
        let grouped = GroupedSamples::from_pairs(sample_rows());
        let sorted = grouped.sorted_by_label();
        let labels: Vec<_> = sorted.groups().iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
        assert_eq!(sorted.get("c"), Some(&[4.0][..]));
    }

    #[test]
    fn test_groups_across_batches() {
        let mut storage = StorageEngine::from_observations(&[("x", 1.0), ("y", 2.0)]).unwrap();
        let more = StorageEngine::from_observations(&[("y", 3.0), ("x", 4.0)]).unwrap();
        storage.append_batch(more.batches()[0].clone()).unwrap();

        let grouped = storage.groups().unwrap();
        assert_eq!(grouped.get("x"), Some(&[1.0, 4.0][..]));
        assert_eq!(grouped.get("y"), Some(&[2.0, 3.0][..]));
    }

    #[test]
    fn test_append_batch_schema_validation() {
        let mut storage = StorageEngine::from_observations(&sample_rows()).unwrap();

        let incompatible_schema = Schema::new(vec![Field::new("different_field", DataType::Int32, false)]);
        let incompatible_batch = RecordBatch::try_new(
            Arc::new(incompatible_schema),
            vec![Arc::new(Int32Array::from(vec![1, 2, 3]))],
        )
        .unwrap();

        let result = storage.append_batch(incompatible_batch);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Schema mismatch"));
    }

    #[test]
    fn test_missing_column() {
        let schema = Schema::new(vec![Field::new(GROUP_COLUMN, DataType::Utf8, false)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(StringArray::from(vec!["a"]))],
        )
        .unwrap();
        let err = StorageEngine::new(vec![batch]).groups().unwrap_err();
        assert!(err.to_string().contains("Column not found: strength"));
    }

    #[test]
    fn test_numeric_columns_are_cast() {
        let schema = Schema::new(vec![
            Field::new(GROUP_COLUMN, DataType::Utf8, false),
            Field::new(VALUE_COLUMN, DataType::Float32, false),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec!["a", "a"])),
                Arc::new(Float32Array::from(vec![1.5, 2.5])),
            ],
        )
        .unwrap();
        let grouped = StorageEngine::new(vec![batch]).groups().unwrap();
        assert_eq!(grouped.get("a"), Some(&[1.5, 2.5][..]));
    }

    #[test]
    fn test_nulls_rejected() {
        let schema = Schema::new(vec![
            Field::new(GROUP_COLUMN, DataType::Utf8, true),
            Field::new(VALUE_COLUMN, DataType::Float64, true),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec![Some("a"), Some("b")])),
                Arc::new(Float64Array::from(vec![Some(1.0), None])),
            ],
        )
        .unwrap();
        let err = StorageEngine::new(vec![batch]).groups().unwrap_err();
        assert!(matches!(err, Error::StorageError(_)));
    }

    #[test]
    fn test_non_finite_rejected() {
        let storage = StorageEngine::from_observations(&[("a", 1.0), ("a", f64::NAN)]).unwrap();
        assert!(matches!(storage.groups(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_empty_storage() {
        let storage = StorageEngine::new(vec![]);
        assert!(matches!(storage.groups(), Err(Error::InvalidInput(_))));
    }
}
