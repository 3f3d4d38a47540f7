//! Scalar summary metrics over a [`RecordSet`].

use crate::error::{PipelineError, PipelineResult};
use crate::types::{RecordSet, SummaryMetrics};

/// Total sales, total quantity and mean unit price.
///
/// Fails with [`PipelineError::EmptyInput`] for an empty set, since the mean is undefined.
pub fn summarize(records: &RecordSet) -> PipelineResult<SummaryMetrics> {
    if records.is_empty() {
        return Err(PipelineError::EmptyInput {
            context: "summary metrics".to_string(),
        });
    }

    let (total_sales, total_quantity, price_sum) = records.iter().fold(
        (0.0_f64, 0_u64, 0.0_f64),
        |(sales, qty, prices), r| (sales + r.line_total(), qty.saturating_add(r.quantity()), prices + r.unit_price()),
    );

    Ok(SummaryMetrics {
        total_sales,
        total_quantity,
        mean_unit_price: price_sum / records.len() as f64,
        record_count: records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::summarize;
    use crate::error::ErrorKind;
    use crate::types::{RecordSet, SalesRecord};
    use chrono::NaiveDate;

    #[test]
    fn summarize_totals_and_mean_price() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rs = RecordSet::new(vec![
            SalesRecord::new(day, "A", "North", 2, 5.0),
            SalesRecord::new(day, "B", "South", 1, 10.0),
        ]);

        let m = summarize(&rs).unwrap();
        assert_eq!(m.total_sales, 20.0);
        assert_eq!(m.total_quantity, 3);
        assert_eq!(m.mean_unit_price, 7.5);
        assert_eq!(m.record_count, 2);
    }

    #[test]
    fn summarize_rejects_empty_set() {
        let err = summarize(&RecordSet::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
    }
}
