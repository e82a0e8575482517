//! Feature engineering for the temperature model.
//!
//! Every future timestamp becomes one [`FeatureRow`]. The model only sees a
//! subset of it, in the column order given by [`MODEL_SCHEMA`].

use std::f64::consts::TAU;

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::{error::ForecastError, humidity::HumidityTable};

/// How a model column is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Numeric,
    Categorical,
}

/// Model input columns, in the order the model was trained on.
pub const MODEL_SCHEMA: [(&str, FeatureKind); 12] = [
    ("year", FeatureKind::Numeric),
    ("day", FeatureKind::Numeric),
    ("zone_name", FeatureKind::Categorical),
    ("rh", FeatureKind::Numeric),
    ("hour_sin", FeatureKind::Numeric),
    ("hour_cos", FeatureKind::Numeric),
    ("minute_sin", FeatureKind::Numeric),
    ("minute_cos", FeatureKind::Numeric),
    ("dow_sin", FeatureKind::Numeric),
    ("dow_cos", FeatureKind::Numeric),
    ("month_sin", FeatureKind::Numeric),
    ("month_cos", FeatureKind::Numeric),
];

pub const HOURS_PER_DAY: u32 = 24;
pub const MINUTES_PER_HOUR: u32 = 60;
pub const DAYS_PER_WEEK: u32 = 7;
pub const MONTHS_PER_YEAR: u32 = 12;

/// A sine/cosine pair placing a periodic value on the unit circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cyclical {
    pub sin: f64,
    pub cos: f64,
}

impl Cyclical {
    pub fn encode(value: u32, period: u32) -> Self {
        let angle = TAU * f64::from(value) / f64::from(period);
        Self {
            sin: angle.sin(),
            cos: angle.cos(),
        }
    }

    /// Recover the linear value in `[0, period)`.
    pub fn decode(&self, period: u32) -> f64 {
        let angle = self.sin.atan2(self.cos).rem_euclid(TAU);
        angle * f64::from(period) / TAU
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Numeric(f64),
    Categorical(&'a str),
}

/// Features derived for one future timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub timestamp: NaiveDateTime,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    /// 0 = Monday … 6 = Sunday.
    pub day_of_week: u32,
    pub zone_name: String,
    pub relative_humidity: f64,
    pub hour_cyc: Cyclical,
    pub minute_cyc: Cyclical,
    pub day_of_week_cyc: Cyclical,
    pub month_cyc: Cyclical,
}

impl FeatureRow {
    pub fn derive(
        timestamp: NaiveDateTime,
        zone_name: &str,
        humidity: &HumidityTable,
    ) -> Result<Self, ForecastError> {
        let hour = timestamp.hour();
        let minute = timestamp.minute();
        let day_of_week = timestamp.weekday().num_days_from_monday();
        let month = timestamp.month();

        Ok(Self {
            timestamp,
            year: timestamp.year(),
            month,
            day: timestamp.day(),
            hour,
            minute,
            day_of_week,
            zone_name: zone_name.to_string(),
            relative_humidity: humidity.lookup(hour)?,
            hour_cyc: Cyclical::encode(hour, HOURS_PER_DAY),
            minute_cyc: Cyclical::encode(minute, MINUTES_PER_HOUR),
            day_of_week_cyc: Cyclical::encode(day_of_week, DAYS_PER_WEEK),
            month_cyc: Cyclical::encode(month, MONTHS_PER_YEAR),
        })
    }

    /// Model input for this row, aligned with [`MODEL_SCHEMA`].
    ///
    /// Raw timestamp, hour, minute, day of week and month are intermediate
    /// only and never reach the model.
    pub fn model_features(&self) -> [(&'static str, FeatureValue<'_>); 12] {
        use FeatureValue::{Categorical, Numeric};

        [
            (MODEL_SCHEMA[0].0, Numeric(f64::from(self.year))),
            (MODEL_SCHEMA[1].0, Numeric(f64::from(self.day))),
            (MODEL_SCHEMA[2].0, Categorical(&self.zone_name)),
            (MODEL_SCHEMA[3].0, Numeric(self.relative_humidity)),
            (MODEL_SCHEMA[4].0, Numeric(self.hour_cyc.sin)),
            (MODEL_SCHEMA[5].0, Numeric(self.hour_cyc.cos)),
            (MODEL_SCHEMA[6].0, Numeric(self.minute_cyc.sin)),
            (MODEL_SCHEMA[7].0, Numeric(self.minute_cyc.cos)),
            (MODEL_SCHEMA[8].0, Numeric(self.day_of_week_cyc.sin)),
            (MODEL_SCHEMA[9].0, Numeric(self.day_of_week_cyc.cos)),
            (MODEL_SCHEMA[10].0, Numeric(self.month_cyc.sin)),
            (MODEL_SCHEMA[11].0, Numeric(self.month_cyc.cos)),
        ]
    }
}
