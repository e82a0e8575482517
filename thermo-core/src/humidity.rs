use crate::error::ForecastError;

/// Relative humidity (%) observed per hour of day in the monitored building.
pub const HUMIDITY_BY_HOUR: HumidityTable = HumidityTable::new(&[
    (0, 25.0),
    (1, 21.0),
    (2, 21.0),
    (3, 21.0),
    (4, 21.0),
    (5, 21.0),
    (6, 21.0),
    (7, 22.0),
    (8, 23.0),
    (9, 25.0),
    (10, 26.0),
    (11, 28.0),
    (12, 30.0),
    (13, 30.0),
    (14, 32.0),
    (15, 34.0),
    (16, 37.0),
    (17, 40.0),
    (18, 42.0),
    (19, 42.0),
    (20, 42.0),
    (21, 37.0),
    (22, 33.0),
    (23, 30.0),
]);

/// Read-only hour → relative humidity lookup.
#[derive(Debug, Clone, Copy)]
pub struct HumidityTable {
    entries: &'static [(u32, f64)],
}

impl HumidityTable {
    pub const fn new(entries: &'static [(u32, f64)]) -> Self {
        Self { entries }
    }

    pub fn get(&self, hour: u32) -> Option<f64> {
        self.entries.iter().find(|(h, _)| *h == hour).map(|(_, rh)| *rh)
    }

    /// Arithmetic mean of every entry, `None` for an empty table.
    pub fn mean(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        let sum: f64 = self.entries.iter().map(|(_, rh)| rh).sum();
        Some(sum / self.entries.len() as f64)
    }

    /// Humidity for `hour`, falling back to the table mean when the hour is missing.
    pub fn lookup(&self, hour: u32) -> Result<f64, ForecastError> {
        if let Some(rh) = self.get(hour) {
            return Ok(rh);
        }

        let mean = self.mean().ok_or_else(|| {
            ForecastError::FeatureEngineering(format!(
                "no humidity value for hour {hour} and no fallback available"
            ))
        })?;

        tracing::warn!(hour, fallback = mean, "hour missing from humidity table, using mean");
        Ok(mean)
    }
}
