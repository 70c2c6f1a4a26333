//! Statistics derived from the reading store.
//!
//! Every function takes readings in store order (newest first) and is pure.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::entities::category::BloodPressureCategory;
use crate::entities::reading::Reading;
use crate::services::classifier::Classify;

/// Number of most recent readings in the rolling average
pub const ROLLING_WINDOW: usize = 7;

/// Readings needed before a trend is reported
pub const TREND_MIN_READINGS: usize = 2 * ROLLING_WINDOW;

/// Change in mean combined pressure (mmHg) that counts as a trend
pub const TREND_THRESHOLD: f64 = 5.0;

/// Maximum points in a chart series
pub const CHART_MAX_POINTS: usize = 50;

/// Fixed chart axis range in mmHg
pub const CHART_AXIS_MIN: u16 = 60;
pub const CHART_AXIS_MAX: u16 = 200;

/// Mean of the most recent readings, rounded to whole units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RollingAverage {
    pub systolic: u32,
    pub diastolic: u32,
    pub pulse: u32,
    /// Readings the average was taken over
    pub count: usize,
}

/// Direction of recent readings compared to the week before
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Worsening,
}

/// Count and share of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub level: BloodPressureCategory,
    pub count: usize,
    /// Share of all readings, 0 to 100
    pub percentage: f64,
}

/// Part of the day a reading was taken in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    /// Bucket for a clock hour; unknown hours count as night
    pub fn from_hour(hour: Option<u32>) -> Self {
        match hour {
            Some(6..=11) => TimeOfDay::Morning,
            Some(12..=16) => TimeOfDay::Afternoon,
            Some(17..=21) => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

/// Aggregate for one time-of-day bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeOfDayStats {
    pub period: TimeOfDay,
    pub count: usize,
    pub avg_systolic: Option<u32>,
    pub avg_diastolic: Option<u32>,
}

/// Lowest and highest value seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValueRange {
    pub min: u16,
    pub max: u16,
}

/// Chart time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartWindow {
    #[serde(rename = "7")]
    Week,
    #[serde(rename = "30")]
    Month,
    #[serde(rename = "90")]
    Quarter,
}

impl ChartWindow {
    pub fn days(&self) -> i64 {
        match self {
            ChartWindow::Week => 7,
            ChartWindow::Month => 30,
            ChartWindow::Quarter => 90,
        }
    }
}

impl TryFrom<u32> for ChartWindow {
    type Error = String;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            7 => Ok(ChartWindow::Week),
            30 => Ok(ChartWindow::Month),
            90 => Ok(ChartWindow::Quarter),
            other => Err(format!("Chart window must be 7, 30 or 90 days, got {}", other)),
        }
    }
}

/// One plotted reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub date: String,
    pub time: String,
    pub systolic: u16,
    pub diastolic: u16,
    pub pulse: u16,
}

/// Chronological series for a line chart with a fixed pressure axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub window: ChartWindow,
    pub points: Vec<ChartPoint>,
    pub axis_min: u16,
    pub axis_max: u16,
}

impl ChartSeries {
    /// Position of `value` on an axis of `height` units, clamped to the axis range
    pub fn scale(&self, value: u16, height: f64) -> f64 {
        let min = f64::from(self.axis_min);
        let max = f64::from(self.axis_max);
        let clamped = f64::from(value).clamp(min, max);
        (clamped - min) / (max - min) * height
    }
}

/// Everything the dashboard and report show
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub total_readings: usize,
    pub rolling_average: Option<RollingAverage>,
    pub trend: Trend,
    pub distribution: Vec<CategoryShare>,
    pub time_of_day: Vec<TimeOfDayStats>,
    pub systolic_range: Option<ValueRange>,
    pub diastolic_range: Option<ValueRange>,
}

fn round_mean(sum: u64, count: usize) -> u32 {
    (sum as f64 / count as f64).round() as u32
}

/// Rolling average over the most recent readings; all readings when fewer exist
pub fn rolling_average(readings: &[Reading]) -> Option<RollingAverage> {
    let recent = &readings[..readings.len().min(ROLLING_WINDOW)];
    if recent.is_empty() {
        return None;
    }

    let sum = |f: fn(&Reading) -> u16| recent.iter().map(|r| u64::from(f(r))).sum::<u64>();

    Some(RollingAverage {
        systolic: round_mean(sum(|r| r.systolic), recent.len()),
        diastolic: round_mean(sum(|r| r.diastolic), recent.len()),
        pulse: round_mean(sum(|r| r.pulse), recent.len()),
        count: recent.len(),
    })
}

fn mean_combined(readings: &[Reading]) -> f64 {
    let total: u64 = readings.iter().map(|r| u64::from(r.combined_pressure())).sum();
    total as f64 / readings.len() as f64
}

/// Compare the latest week of readings with the week before
pub fn trend(readings: &[Reading]) -> Trend {
    if readings.len() < TREND_MIN_READINGS {
        return Trend::Stable;
    }

    let latest = mean_combined(&readings[..ROLLING_WINDOW]);
    let prior = mean_combined(&readings[ROLLING_WINDOW..TREND_MIN_READINGS]);
    let change = latest - prior;

    if change <= -TREND_THRESHOLD {
        Trend::Improving
    } else if change >= TREND_THRESHOLD {
        Trend::Worsening
    } else {
        Trend::Stable
    }
}

/// Count of readings per category, every category listed
pub fn category_distribution(readings: &[Reading], classifier: &dyn Classify) -> Vec<CategoryShare> {
    let total = readings.len();
    let mut counts = [0usize; 5];

    for reading in readings {
        let level = classifier
            .classify(i32::from(reading.systolic), i32::from(reading.diastolic))
            .level;
        if let Some(index) = BloodPressureCategory::ALL.iter().position(|c| *c == level) {
            counts[index] += 1;
        }
    }

    BloodPressureCategory::ALL
        .iter()
        .zip(counts)
        .map(|(level, count)| CategoryShare {
            level: *level,
            count,
            percentage: if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            },
        })
        .collect()
}

/// Hour of day from a display time such as "14:05" or "02:05 pm"
pub fn parse_display_hour(time: &str) -> Option<u32> {
    let time = time.trim();
    let digits: String = time.chars().take_while(|c| c.is_ascii_digit()).collect();
    let hour: u32 = digits.parse().ok()?;

    let lower = time.to_ascii_lowercase();
    let hour = if lower.ends_with("pm") && hour < 12 {
        hour + 12
    } else if lower.ends_with("am") && hour == 12 {
        0
    } else {
        hour
    };

    (hour < 24).then_some(hour)
}

/// Average pressure per part of the day, using each reading's stored display time
pub fn time_of_day_breakdown(readings: &[Reading]) -> Vec<TimeOfDayStats> {
    TimeOfDay::ALL
        .iter()
        .map(|period| {
            let bucket: Vec<&Reading> = readings
                .iter()
                .filter(|r| TimeOfDay::from_hour(parse_display_hour(&r.time)) == *period)
                .collect();

            let average = |f: fn(&Reading) -> u16| {
                if bucket.is_empty() {
                    None
                } else {
                    let sum: u64 = bucket.iter().map(|r| u64::from(f(r))).sum();
                    Some(round_mean(sum, bucket.len()))
                }
            };

            TimeOfDayStats {
                period: *period,
                count: bucket.len(),
                avg_systolic: average(|r| r.systolic),
                avg_diastolic: average(|r| r.diastolic),
            }
        })
        .collect()
}

/// Readings inside the window ending at `now`, oldest first, at most the 50 most recent
pub fn chart_series(readings: &[Reading], window: ChartWindow, now: DateTime<Utc>) -> ChartSeries {
    let cutoff = now - Duration::days(window.days());

    let mut points: Vec<ChartPoint> = readings
        .iter()
        .filter(|r| r.timestamp >= cutoff)
        .take(CHART_MAX_POINTS)
        .map(|r| ChartPoint {
            id: r.id,
            timestamp: r.timestamp,
            date: r.date.clone(),
            time: r.time.clone(),
            systolic: r.systolic,
            diastolic: r.diastolic,
            pulse: r.pulse,
        })
        .collect();
    points.reverse();

    ChartSeries {
        window,
        points,
        axis_min: CHART_AXIS_MIN,
        axis_max: CHART_AXIS_MAX,
    }
}

fn value_range(readings: &[Reading], f: fn(&Reading) -> u16) -> Option<ValueRange> {
    let min = readings.iter().map(f).min()?;
    let max = readings.iter().map(f).max()?;
    Some(ValueRange { min, max })
}

/// Assemble every statistic in one pass over the API
pub fn summarize(readings: &[Reading], classifier: &dyn Classify) -> StatisticsSummary {
    StatisticsSummary {
        total_readings: readings.len(),
        rolling_average: rolling_average(readings),
        trend: trend(readings),
        distribution: category_distribution(readings, classifier),
        time_of_day: time_of_day_breakdown(readings),
        systolic_range: value_range(readings, |r| r.systolic),
        diastolic_range: value_range(readings, |r| r.diastolic),
    }
}
