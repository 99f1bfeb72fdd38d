// src/dashboard.rs

use crate::models::{Metric, TrainingLog};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    Week,
    Month,
    Year,
}

impl Window {
    fn title(&self) -> &'static str {
        match self {
            Window::Week => "This week",
            Window::Month => "This month",
            Window::Year => "This year",
        }
    }
}

/// One bar chart: a label and a summed value per bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub window: Window,
    pub labels: Vec<String>,
    pub values: Vec<i64>,
    pub total: i64,
    /// Rows inside the window whose metric is positive.
    pub active_days: usize,
    pub average: f64,
}

impl Series {
    fn new(window: Window, labels: Vec<String>, values: Vec<i64>, active_days: usize) -> Self {
        let total = values.iter().fold(0i64, |acc, v| acc.saturating_add(*v));
        let average = if active_days > 0 {
            total as f64 / active_days as f64
        } else {
            0.0
        };
        Self {
            window,
            labels,
            values,
            total,
            active_days,
            average,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| *v == 0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub metric: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub reference_date: NaiveDate,
    pub week: Series,
    pub month: Series,
    pub year: Series,
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

/// Sums `metric` per calendar date over consecutive `dates`, zero-filling gaps.
fn daily_series(
    window: Window,
    logs: &[TrainingLog],
    metric: Metric,
    dates: Vec<NaiveDate>,
    label_fmt: &str,
) -> Series {
    let (first, last) = match (dates.first(), dates.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return Series::new(window, Vec::new(), Vec::new(), 0),
    };

    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    let mut active_days = 0;
    for log in logs.iter().filter(|l| l.date >= first && l.date <= last) {
        let value = log.metric(metric);
        let bucket = buckets.entry(log.date).or_insert(0);
        *bucket = bucket.saturating_add(value);
        if value > 0 {
            active_days += 1;
        }
    }

    let labels = dates
        .iter()
        .map(|d| d.format(label_fmt).to_string())
        .collect();
    let values = dates
        .iter()
        .map(|d| buckets.get(d).copied().unwrap_or(0))
        .collect();
    Series::new(window, labels, values, active_days)
}

fn year_series(logs: &[TrainingLog], metric: Metric, year: i32) -> Series {
    let mut values = vec![0i64; 12];
    let mut active_days = 0;
    for log in logs.iter().filter(|l| l.date.year() == year) {
        let value = log.metric(metric);
        let slot = &mut values[log.date.month0() as usize];
        *slot = slot.saturating_add(value);
        if value > 0 {
            active_days += 1;
        }
    }
    let labels = MONTH_LABELS.iter().map(|m| m.to_string()).collect();
    Series::new(Window::Year, labels, values, active_days)
}

/// Builds week (Mon-Sun), month (1st-last) and year (Jan-Dec) series around `reference`.
pub fn aggregate(logs: &[TrainingLog], reference: NaiveDate, metric: Metric) -> Dashboard {
    let week_dates: Vec<NaiveDate> = week_start(reference).iter_days().take(7).collect();

    let first = month_start(reference);
    let month_dates: Vec<NaiveDate> = first
        .iter_days()
        .take_while(|d| d.month() == first.month())
        .collect();

    Dashboard {
        metric: metric.column(),
        label: metric.label(),
        unit: metric.unit(),
        reference_date: reference,
        week: daily_series(Window::Week, logs, metric, week_dates, "%a"),
        month: daily_series(Window::Month, logs, metric, month_dates, "%d"),
        year: year_series(logs, metric, reference.year()),
    }
}

/// Plain-text bar charts for the terminal.
pub fn render(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}) as of {}",
        dashboard.label, dashboard.unit, dashboard.reference_date
    );
    for series in [&dashboard.week, &dashboard.month, &dashboard.year] {
        out.push('\n');
        render_series(&mut out, series, dashboard.unit);
    }
    out
}

fn render_series(out: &mut String, series: &Series, unit: &str) {
    let _ = writeln!(out, "{}", series.window.title());
    if series.is_empty() {
        let _ = writeln!(out, "  no data");
        return;
    }

    let max = series.values.iter().copied().max().unwrap_or(0).max(1);
    let label_width = series.labels.iter().map(|l| l.len()).max().unwrap_or(0);
    for (label, value) in series.labels.iter().zip(&series.values) {
        let len = ((*value).max(0) as u128 * BAR_WIDTH as u128 / max as u128) as usize;
        let _ = writeln!(
            out,
            "  {:>width$} | {} {}",
            label,
            "█".repeat(len),
            value,
            width = label_width
        );
    }
    let _ = writeln!(
        out,
        "  total {} {} | active days {} | average {:.1} {}",
        series.total, unit, series.active_days, series.average, unit
    );
}
