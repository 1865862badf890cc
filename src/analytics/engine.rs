//! Pure aggregation over pre-fetched, user-scoped records. Every function
//! here is synchronous and side-effect free; handlers own the persistence
//! reads and parameter parsing.

use std::collections::BTreeMap;

use time::{Date, Duration, Month};

use crate::dates::format_date;
use crate::error::ApiError;
use crate::nutrition::Nutrients;

use super::dto::{DailySummary, DayBucket, GlucoseSummary, MonthlySummary, WeeklySummary};

/// A meal reduced to what aggregation needs: its calendar day and its
/// computed nutrient totals.
#[derive(Debug, Clone)]
pub struct MealRecord {
    pub date: Date,
    pub totals: Nutrients,
}

/// A glucose reading reduced to its calendar day and value.
#[derive(Debug, Clone)]
pub struct ReadingRecord {
    pub date: Date,
    pub value: f64,
}

/// Average, min and max over reading values; all zero for an empty set.
pub fn glucose_stats(values: &[f64]) -> GlucoseSummary {
    if values.is_empty() {
        return GlucoseSummary {
            average: 0.0,
            min: 0.0,
            max: 0.0,
            readings_count: 0,
        };
    }
    let sum: f64 = values.iter().sum();
    GlucoseSummary {
        average: sum / values.len() as f64,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        readings_count: values.len(),
    }
}

/// The 7 calendar days ending at `end`, inclusive.
pub fn week_window(end: Date) -> (Date, Date) {
    (end - Duration::days(6), end)
}

/// First and last day of a calendar month. The length comes from the
/// calendar itself, so February in a leap year has 29 days and December
/// ends the day before the next year begins.
pub fn month_bounds(year: i32, month: u8) -> Result<(Date, Date), ApiError> {
    let month = Month::try_from(month)
        .map_err(|_| ApiError::Validation("month must be between 1 and 12".into()))?;
    let first = Date::from_calendar_date(year, month, 1)
        .map_err(|_| ApiError::Validation(format!("Invalid year: {year}")))?;
    let last = Date::from_calendar_date(year, month, time::util::days_in_year_month(year, month))
        .map_err(|_| ApiError::Validation(format!("Invalid year: {year}")))?;
    Ok((first, last))
}

fn nutrition_totals(meals: &[&MealRecord]) -> Nutrients {
    meals.iter().map(|m| m.totals).sum()
}

pub fn daily_summary(
    date: Date,
    meals: &[MealRecord],
    readings: &[ReadingRecord],
) -> DailySummary {
    let values: Vec<f64> = readings.iter().map(|r| r.value).collect();
    DailySummary {
        date: format_date(date),
        nutrition: meals.iter().map(|m| m.totals).sum(),
        glucose: glucose_stats(&values),
        meals_count: meals.len(),
    }
}

/// Buckets records per calendar day over `[start, end]`. Every day in the
/// window gets a bucket, pre-seeded with zero state, so callers never have
/// to handle missing keys.
pub fn weekly_summary(
    start: Date,
    end: Date,
    meals: &[MealRecord],
    readings: &[ReadingRecord],
) -> WeeklySummary {
    let mut values_by_day: BTreeMap<Date, Vec<f64>> = BTreeMap::new();
    for r in readings {
        values_by_day.entry(r.date).or_default().push(r.value);
    }

    let mut daily_data = BTreeMap::new();
    let span = (end - start).whole_days();
    for offset in 0..=span {
        let date = start + Duration::days(offset);
        let day_meals: Vec<&MealRecord> = meals.iter().filter(|m| m.date == date).collect();
        let values = values_by_day
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or_default();
        daily_data.insert(
            format_date(date),
            DayBucket {
                nutrition: nutrition_totals(&day_meals),
                glucose: glucose_stats(values),
                meals_count: day_meals.len(),
            },
        );
    }

    WeeklySummary {
        start_date: format_date(start),
        end_date: format_date(end),
        daily_data,
    }
}

pub fn monthly_summary(
    year: i32,
    month: u8,
    meals: &[MealRecord],
    readings: &[ReadingRecord],
) -> MonthlySummary {
    let values: Vec<f64> = readings.iter().map(|r| r.value).collect();
    MonthlySummary {
        year,
        month,
        nutrition: meals.iter().map(|m| m.totals).sum(),
        glucose: glucose_stats(&values),
        meals_count: meals.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn meal(date: Date, calories: f64) -> MealRecord {
        MealRecord {
            date,
            totals: Nutrients {
                calories,
                carbs: calories / 10.0,
                protein: calories / 20.0,
                fat: calories / 40.0,
            },
        }
    }

    fn reading(date: Date, value: f64) -> ReadingRecord {
        ReadingRecord { date, value }
    }

    #[test]
    fn stats_over_sample_values() {
        let stats = glucose_stats(&[90.0, 110.0, 130.0]);
        assert_eq!(stats.average, 110.0);
        assert_eq!(stats.min, 90.0);
        assert_eq!(stats.max, 130.0);
        assert_eq!(stats.readings_count, 3);
    }

    #[test]
    fn stats_over_empty_set_are_all_zero() {
        let stats = glucose_stats(&[]);
        assert_eq!(stats.average, 0.0);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 0.0);
        assert_eq!(stats.readings_count, 0);
    }

    #[test]
    fn empty_day_yields_all_zero_summary() {
        let summary = daily_summary(date!(2023 - 05 - 01), &[], &[]);
        assert_eq!(summary.date, "2023-05-01");
        assert_eq!(summary.nutrition, Nutrients::ZERO);
        assert_eq!(summary.glucose.average, 0.0);
        assert_eq!(summary.meals_count, 0);
        assert_eq!(summary.glucose.readings_count, 0);
    }

    #[test]
    fn daily_summary_sums_meal_totals() {
        let day = date!(2023 - 05 - 01);
        let summary = daily_summary(
            day,
            &[meal(day, 400.0), meal(day, 600.0)],
            &[reading(day, 95.0)],
        );
        assert_eq!(summary.nutrition.calories, 1000.0);
        assert_eq!(summary.meals_count, 2);
        assert_eq!(summary.glucose.average, 95.0);
    }

    #[test]
    fn weekly_summary_always_has_seven_consecutive_buckets() {
        let end = date!(2023 - 03 - 04);
        let (start, _) = week_window(end);
        let summary = weekly_summary(start, end, &[], &[]);

        assert_eq!(summary.start_date, "2023-02-26");
        assert_eq!(summary.end_date, "2023-03-04");
        assert_eq!(summary.daily_data.len(), 7);

        let keys: Vec<&str> = summary.daily_data.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "2023-02-26",
                "2023-02-27",
                "2023-02-28",
                "2023-03-01",
                "2023-03-02",
                "2023-03-03",
                "2023-03-04"
            ]
        );
        for bucket in summary.daily_data.values() {
            assert_eq!(bucket.nutrition, Nutrients::ZERO);
            assert_eq!(bucket.glucose.readings_count, 0);
            assert_eq!(bucket.meals_count, 0);
        }
    }

    #[test]
    fn weekly_buckets_are_computed_independently_per_day() {
        let end = date!(2023 - 05 - 07);
        let (start, _) = week_window(end);
        let meals = [meal(date!(2023 - 05 - 03), 500.0)];
        let readings = [
            reading(date!(2023 - 05 - 03), 90.0),
            reading(date!(2023 - 05 - 03), 110.0),
            reading(date!(2023 - 05 - 06), 130.0),
        ];
        let summary = weekly_summary(start, end, &meals, &readings);

        let wednesday = &summary.daily_data["2023-05-03"];
        assert_eq!(wednesday.meals_count, 1);
        assert_eq!(wednesday.nutrition.calories, 500.0);
        assert_eq!(wednesday.glucose.average, 100.0);
        assert_eq!(wednesday.glucose.readings_count, 2);

        let saturday = &summary.daily_data["2023-05-06"];
        assert_eq!(saturday.glucose.min, 130.0);
        assert_eq!(saturday.glucose.max, 130.0);
        assert_eq!(saturday.meals_count, 0);
    }

    #[test]
    fn leap_year_february_covers_twenty_nine_days() {
        let (first, last) = month_bounds(2024, 2).unwrap();
        assert_eq!(first, date!(2024 - 02 - 01));
        assert_eq!(last, date!(2024 - 02 - 29));

        let (_, last) = month_bounds(2023, 2).unwrap();
        assert_eq!(last, date!(2023 - 02 - 28));
    }

    #[test]
    fn december_rolls_into_the_next_year() {
        let (first, last) = month_bounds(2023, 12).unwrap();
        assert_eq!(first, date!(2023 - 12 - 01));
        assert_eq!(last, date!(2023 - 12 - 31));
        assert_eq!(last.next_day(), Some(date!(2024 - 01 - 01)));
    }

    #[test]
    fn month_outside_range_is_a_validation_error() {
        assert!(month_bounds(2023, 0).is_err());
        assert!(month_bounds(2023, 13).is_err());
    }

    #[test]
    fn monthly_summary_aggregates_the_whole_month() {
        let summary = monthly_summary(
            2023,
            5,
            &[
                meal(date!(2023 - 05 - 01), 400.0),
                meal(date!(2023 - 05 - 31), 600.0),
            ],
            &[
                reading(date!(2023 - 05 - 10), 90.0),
                reading(date!(2023 - 05 - 20), 130.0),
            ],
        );
        assert_eq!(summary.year, 2023);
        assert_eq!(summary.month, 5);
        assert_eq!(summary.nutrition.calories, 1000.0);
        assert_eq!(summary.meals_count, 2);
        assert_eq!(summary.glucose.average, 110.0);
    }
}
