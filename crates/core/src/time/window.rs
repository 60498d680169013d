use anyhow::{bail, Context};
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PERIOD: &str = "10d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    Days,
    Weeks,
    Months,
    Years,
}

/// Lookback length such as `10d`, `2wk`, `3mo` or `1y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub amount: u32,
    pub unit: PeriodUnit,
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .with_context(|| format!("period {s:?} has no unit (expected d, wk, mo or y)"))?;
        let (digits, unit) = s.split_at(split);

        let amount: u32 = digits
            .parse()
            .with_context(|| format!("period {s:?} must start with a number"))?;
        anyhow::ensure!(amount >= 1, "period must be at least 1 (got {s:?})");

        let unit = match unit {
            "d" => PeriodUnit::Days,
            "wk" => PeriodUnit::Weeks,
            "mo" => PeriodUnit::Months,
            "y" => PeriodUnit::Years,
            other => bail!("unknown period unit {other:?} (expected d, wk, mo or y)"),
        };

        Ok(Self { amount, unit })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            PeriodUnit::Days => "d",
            PeriodUnit::Weeks => "wk",
            PeriodUnit::Months => "mo",
            PeriodUnit::Years => "y",
        };
        write!(f, "{}{unit}", self.amount)
    }
}

pub fn parse_period(s: &str) -> anyhow::Result<Period> {
    s.parse()
}

/// Inclusive calendar-date range shared by the news and price queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }
}

/// Window ending on `end_date_arg` (YYYY-MM-DD) or today's UTC date, reaching back `period`.
pub fn resolve_window(
    period: Period,
    end_date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
) -> anyhow::Result<DateWindow> {
    let end = match end_date_arg {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("end date {s:?} is not YYYY-MM-DD"))?,
        None => now_utc.date_naive(),
    };

    let start = match period.unit {
        PeriodUnit::Days => end.checked_sub_signed(Duration::days(period.amount.into())),
        PeriodUnit::Weeks => end.checked_sub_signed(Duration::weeks(period.amount.into())),
        PeriodUnit::Months => end.checked_sub_months(Months::new(period.amount)),
        PeriodUnit::Years => period
            .amount
            .checked_mul(12)
            .and_then(|m| end.checked_sub_months(Months::new(m))),
    }
    .with_context(|| format!("period {period} reaches before the supported date range"))?;

    Ok(DateWindow { start, end })
}
