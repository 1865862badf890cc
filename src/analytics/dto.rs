use std::collections::BTreeMap;

use serde::Serialize;

use crate::nutrition::Nutrients;

/// Summary statistics over a set of glucose readings. All three statistics
/// are zero when no readings exist; `readings_count` disambiguates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlucoseSummary {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub readings_count: usize,
}

#[derive(Debug, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub nutrition: Nutrients,
    pub glucose: GlucoseSummary,
    pub meals_count: usize,
}

/// One per-day bucket inside a weekly summary.
#[derive(Debug, Serialize)]
pub struct DayBucket {
    pub nutrition: Nutrients,
    pub glucose: GlucoseSummary,
    pub meals_count: usize,
}

/// Seven consecutive day-buckets ending at the query date, keyed by ISO
/// date. Every day is present even when it holds no data.
#[derive(Debug, Serialize)]
pub struct WeeklySummary {
    pub start_date: String,
    pub end_date: String,
    pub daily_data: BTreeMap<String, DayBucket>,
}

#[derive(Debug, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u8,
    pub nutrition: Nutrients,
    pub glucose: GlucoseSummary,
    pub meals_count: usize,
}
