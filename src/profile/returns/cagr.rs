//! Compound annual growth rate since launch, from the monthly chart or
//! from the headline "max" return and the launch date.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::core::text::{clean_text, fold_accents};
use crate::profile::MonthlyReturns;

const DAYS_PER_YEAR: f64 = 365.2425;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("static regex"));
static FRENCH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})\s+([a-z]+)\.?\s+(\d{4})").expect("static regex")
});

/// Annualized growth over every chart month, in percent.
pub(crate) fn cagr_from_monthly_returns(returns: &MonthlyReturns) -> Option<f64> {
    let mut points: Vec<(i32, u32, f64)> = returns
        .values
        .iter()
        .filter_map(|v| Some((v.year.trim().parse().ok()?, v.month_index, v.return_pct)))
        .collect();
    if points.is_empty() {
        return None;
    }
    points.sort_by_key(|&(year, month, _)| (year, month));

    let compounded: f64 = points.iter().map(|&(_, _, r)| 1.0 + r / 100.0).product();
    if compounded <= 0.0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let months = points.len() as f64;
    Some((compounded.powf(12.0 / months) - 1.0) * 100.0)
}

/// Annualized growth from the total return since launch, in percent.
pub(crate) fn cagr_from_max_return(
    max_return_text: Option<&str>,
    launch_date_text: Option<&str>,
    today: NaiveDate,
) -> Option<f64> {
    let total_pct = parse_percent(max_return_text?)?;
    let launch = parse_french_date(launch_date_text?)?;

    let days = (today - launch).num_days();
    if days <= 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let years = days as f64 / DAYS_PER_YEAR;

    let growth = 1.0 + total_pct / 100.0;
    if growth <= 0.0 {
        return None;
    }
    Some((growth.powf(1.0 / years) - 1.0) * 100.0)
}

pub(crate) fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

/// `"+245,67 %"` → `245.67`.
pub(crate) fn parse_percent(text: &str) -> Option<f64> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '%' | '+'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    NUMBER.find(&compact)?.as_str().parse().ok()
}

/// `"12 mai 2010"`, `"3 févr. 2015"` → date. Month names are accent-insensitive.
pub(crate) fn parse_french_date(text: &str) -> Option<NaiveDate> {
    let folded = fold_accents(&clean_text(text)).to_lowercase();
    let caps = FRENCH_DATE.captures(&folded)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(token: &str) -> Option<u32> {
    let m = match token {
        "jan" | "janv" | "janvier" => 1,
        "feb" | "fev" | "fevr" | "fevrier" => 2,
        "mar" | "mars" => 3,
        "avr" | "avril" | "apr" => 4,
        "mai" | "may" => 5,
        "jun" | "juin" => 6,
        "jul" | "juil" | "juillet" => 7,
        "aou" | "aout" | "aug" => 8,
        "sep" | "sept" | "septembre" => 9,
        "oct" | "octobre" => 10,
        "nov" | "novembre" => 11,
        "dec" | "decembre" => 12,
        _ => return None,
    };
    Some(m)
}
