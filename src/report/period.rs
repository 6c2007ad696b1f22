use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

const WEEKDAY_NAMES: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Granularity {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub(crate) fn all() -> &'static [Granularity] {
        &[
            Self::Day,
            Self::Week,
            Self::Month,
            Self::Quarter,
            Self::Year,
        ]
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "d" | "일" => Some(Self::Day),
            "week" | "w" | "주" => Some(Self::Week),
            "month" | "m" | "월" => Some(Self::Month),
            "quarter" | "q" | "분기" => Some(Self::Quarter),
            "year" | "y" | "년" => Some(Self::Year),
            _ => None,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            Self::Day => "일",
            Self::Week => "주",
            Self::Month => "월",
            Self::Quarter => "분기",
            Self::Year => "년",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An inclusive date range picked by granularity around a reference date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Period {
    pub(crate) granularity: Granularity,
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
    pub(crate) label: String,
}

impl Period {
    pub(crate) fn resolve(granularity: Granularity, date: NaiveDate) -> Self {
        let (start, end, label) = match granularity {
            Granularity::Day => (
                date,
                date,
                format!(
                    "{}년 {}월 {}일({})",
                    date.year(),
                    date.month(),
                    date.day(),
                    WEEKDAY_NAMES[date.weekday().num_days_from_monday() as usize]
                ),
            ),
            Granularity::Week => {
                let (_, last) = month_bounds(date);
                let sundays = sundays_of_month(date);
                let (index, start) = sundays
                    .iter()
                    .copied()
                    .enumerate()
                    .filter(|(_, s)| *s <= date)
                    .last()
                    .or_else(|| sundays.first().map(|s| (0, *s)))
                    .unwrap_or((0, date));
                let end = start
                    .checked_add_days(Days::new(6))
                    .map_or(last, |e| e.min(last));
                (
                    start,
                    end,
                    format!("{}년 {}월 {}주차", date.year(), date.month(), index + 1),
                )
            }
            Granularity::Month => {
                let (first, last) = month_bounds(date);
                (first, last, format!("{}년 {}월", date.year(), date.month()))
            }
            Granularity::Quarter => {
                let quarter = date.month0() / 3 + 1;
                let start =
                    NaiveDate::from_ymd_opt(date.year(), (quarter - 1) * 3 + 1, 1).unwrap_or(date);
                let (_, end) = month_bounds(
                    NaiveDate::from_ymd_opt(date.year(), quarter * 3, 1).unwrap_or(date),
                );
                (start, end, format!("{}년 {}/4분기", date.year(), quarter))
            }
            Granularity::Year => {
                let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
                let end = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
                (start, end, format!("{}년", date.year()))
            }
        };

        let label = match granularity {
            Granularity::Day => label,
            _ => format!("{label}({})", granularity.suffix()),
        };

        Self {
            granularity,
            start,
            end,
            label,
        }
    }

    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The period of the same granularity right before this one.
    pub(crate) fn previous(&self) -> Self {
        let reference = match self.granularity {
            Granularity::Day | Granularity::Year | Granularity::Week => self.start.pred_opt(),
            Granularity::Month => self.start.checked_sub_months(Months::new(1)),
            Granularity::Quarter => self.start.checked_sub_months(Months::new(3)),
        };
        let Some(reference) = reference else {
            return self.clone();
        };
        let candidate = Self::resolve(self.granularity, reference);
        if self.granularity == Granularity::Week && candidate.start == self.start {
            // Days before a month's first Sunday fold into that first week, so
            // step into the previous month instead.
            let (first, _) = month_bounds(self.start);
            return first
                .pred_opt()
                .map_or_else(|| self.clone(), |d| Self::resolve(Granularity::Week, d));
        }
        candidate
    }

    /// The period of the same granularity right after this one.
    pub(crate) fn next(&self) -> Self {
        self.end
            .succ_opt()
            .map_or_else(|| self.clone(), |d| Self::resolve(self.granularity, d))
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// First and last day of the month containing `date`.
pub(crate) fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date - Days::new(u64::from(date.day0()));
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    (first, last)
}

fn sundays_of_month(date: NaiveDate) -> Vec<NaiveDate> {
    let (first, last) = month_bounds(date);
    first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| d.weekday() == Weekday::Sun)
        .collect()
}

#[cfg(test)]
#[path = "period_tests.rs"]
mod tests;
