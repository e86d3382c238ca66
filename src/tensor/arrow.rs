// src/tensor/arrow.rs

use arrow::{
    array::{ArrayRef, Float64Array, UInt32Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use ndarray::Array2;
use std::sync::Arc;

use super::DerivedTensors;
use crate::error::ReportResult;

/// Build the Arrow schema for a floors × egg-budget matrix:
/// - `floors`          → UInt32 (row key)
/// - `e1`, `e2`, ...   → Float64, one column per egg budget
pub fn build_arrow_schema(eggs: &[u32]) -> Arc<Schema> {
    let fields: Vec<Field> = std::iter::once(Field::new("floors", DataType::UInt32, false))
        .chain(
            eggs.iter()
                .map(|e| Field::new(format!("e{}", e), DataType::Float64, false)),
        )
        .collect();

    Arc::new(Schema::new(fields))
}

/// One record batch per matrix, rows keyed by floor count.
pub fn matrix_to_batch(floors: &[u32], eggs: &[u32], m: &Array2<f64>) -> ReportResult<RecordBatch> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(eggs.len() + 1);
    columns.push(Arc::new(UInt32Array::from(floors.to_vec())));
    for col in m.columns() {
        columns.push(Arc::new(Float64Array::from(col.to_vec())));
    }
    Ok(RecordBatch::try_new(build_arrow_schema(eggs), columns)?)
}

/// `min_max`, `average` and `access_frequency`, in that order, with their names.
pub fn to_record_batches(t: &DerivedTensors) -> ReportResult<Vec<(&'static str, RecordBatch)>> {
    Ok(vec![
        ("min_max", matrix_to_batch(&t.floors, &t.eggs, &t.min_max)?),
        ("average", matrix_to_batch(&t.floors, &t.eggs, &t.average)?),
        (
            "access_frequency",
            matrix_to_batch(&t.floors, &t.eggs, &t.access_frequency)?,
        ),
    ])
}
