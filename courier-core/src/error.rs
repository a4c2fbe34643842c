//! Row-level normalization errors
//!
//! Rows are numbered from 1 in data order (the header line is not counted).

use thiserror::Error;

/// A row that could not be coerced into an [`OrderRecord`](crate::record::OrderRecord).
///
/// Missing-data sentinels are never reported here; rows carrying them are
/// filtered out and counted in the normalization summary instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("row {row} (order {order_id}): invalid delivery person age {value:?}")]
    InvalidAge {
        row: usize,
        order_id: String,
        value: String,
    },

    #[error("row {row} (order {order_id}): invalid delivery person rating {value:?}")]
    InvalidRating {
        row: usize,
        order_id: String,
        value: String,
    },

    #[error("row {row} (order {order_id}): order date {value:?} is not DD-MM-YYYY")]
    InvalidDate {
        row: usize,
        order_id: String,
        value: String,
    },

    #[error("row {row} (order {order_id}): invalid multiple deliveries count {value:?}")]
    InvalidMultipleDeliveries {
        row: usize,
        order_id: String,
        value: String,
    },

    #[error("row {row} (order {order_id}): minute count in time taken {value:?} is out of range")]
    InvalidTimeTaken {
        row: usize,
        order_id: String,
        value: String,
    },

    #[error("row {row} (order {order_id}): time taken {value:?} contains no minute count")]
    EmptyTimeTaken {
        row: usize,
        order_id: String,
        value: String,
    },
}

impl NormalizeError {
    /// 1-based data row the error refers to
    pub fn row(&self) -> usize {
        match self {
            NormalizeError::InvalidAge { row, .. }
            | NormalizeError::InvalidRating { row, .. }
            | NormalizeError::InvalidDate { row, .. }
            | NormalizeError::InvalidMultipleDeliveries { row, .. }
            | NormalizeError::InvalidTimeTaken { row, .. }
            | NormalizeError::EmptyTimeTaken { row, .. } => *row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_row_and_order() {
        let err = NormalizeError::InvalidAge {
            row: 7,
            order_id: "0x4607".to_string(),
            value: "abc".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 7"));
        assert!(msg.contains("0x4607"));
        assert!(msg.contains("\"abc\""));
        assert_eq!(err.row(), 7);
    }
}
