use common::{MaterializeResult, MetadataValue};

/// A minimal dataset: three integers.
pub fn raw_numbers() -> MaterializeResult<Vec<i64>> {
    let data = vec![1, 2, 3];
    let preview = MetadataValue::json(data.clone());
    MaterializeResult::new(data)
        .with_metadata("count", 3usize)
        .with_metadata("preview", preview)
}

pub fn sum_numbers(numbers: &[i64]) -> MaterializeResult<i64> {
    let total: i64 = numbers.iter().sum();
    MaterializeResult::new(total)
        .with_metadata("input_count", numbers.len())
        .with_metadata("result", total)
}
