//! Record - the row written to the sink

use serde::{Deserialize, Serialize};

use crate::{PositionSample, TemperatureSample};

/// Placeholder written in place of a failed temperature reading
pub const TEMPERATURE_SENTINEL: f64 = 0.0;

/// Fixed header of the CSV output
pub const RECORD_HEADER: &str = "time,x,y,ambient_temp,obj_temp";

/// Number of columns of every row
pub const RECORD_COLUMNS: usize = 5;

/// One output row
///
/// Always carries all five fields; failed readings hold the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: u64,
    pub x: f64,
    pub y: f64,
    pub ambient_c: f64,
    pub object_c: f64,
}

impl Record {
    /// Merge a position and a temperature sample
    pub fn assemble(position: PositionSample, temperature: TemperatureSample) -> Self {
        Self {
            timestamp: position.timestamp,
            x: position.x,
            y: position.y,
            ambient_c: temperature.ambient_c.unwrap_or(TEMPERATURE_SENTINEL),
            object_c: temperature.object_c.unwrap_or(TEMPERATURE_SENTINEL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_reading_becomes_sentinel() {
        let record = Record::assemble(
            PositionSample::new(7, 1.5, -2.5),
            TemperatureSample {
                ambient_c: Some(19.25),
                object_c: None,
            },
        );
        assert_eq!(record.timestamp, 7);
        assert_eq!(record.ambient_c, 19.25);
        assert_eq!(record.object_c, TEMPERATURE_SENTINEL);
    }

    #[test]
    fn test_header_has_all_columns() {
        assert_eq!(RECORD_HEADER.split(',').count(), RECORD_COLUMNS);
    }

    #[test]
    fn test_record_json_shape() {
        let record = Record::assemble(PositionSample::new(1, 0.0, 0.0), Default::default());
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json.as_object().unwrap().len(), RECORD_COLUMNS);
    }
}
