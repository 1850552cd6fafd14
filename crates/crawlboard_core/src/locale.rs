//! Locale-aware number and timestamp formatting for the dashboard.
//!
//! Only the two locales the crawl panel is used with are supported. Persian
//! output uses Extended Arabic-Indic digits, the Arabic thousands separator
//! and the Solar Hijri calendar.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Timelike};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Persian,
    English,
}

const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];
const PERSIAN_GROUP_SEPARATOR: char = '\u{066C}';

impl Locale {
    /// Resolves a BCP 47 tag such as `fa-IR` or `en-US`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let language = tag.split(['-', '_']).next().unwrap_or(tag);
        if language.eq_ignore_ascii_case("fa") {
            Some(Locale::Persian)
        } else if language.eq_ignore_ascii_case("en") {
            Some(Locale::English)
        } else {
            None
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Locale::Persian => "fa-IR",
            Locale::English => "en-US",
        }
    }

    /// Formats an integer with grouping separators.
    pub fn format_count(self, value: u64) -> String {
        let separator = match self {
            Locale::Persian => PERSIAN_GROUP_SEPARATOR,
            Locale::English => ',',
        };
        let mut out = String::new();
        for (i, ch) in value.to_string().chars().rev().enumerate() {
            if i != 0 && i % 3 == 0 {
                out.push(separator);
            }
            out.push(ch);
        }
        let grouped: String = out.chars().rev().collect();
        self.localize_digits(&grouped)
    }

    /// Formats a small number without grouping, such as a page index.
    pub fn format_plain(self, value: u64) -> String {
        self.localize_digits(&value.to_string())
    }

    /// Formats a backend timestamp in the locale's calendar, keeping the
    /// offset the backend sent. Unparseable input is returned unchanged.
    pub fn format_timestamp(self, raw: &str) -> String {
        let Some(moment) = parse_timestamp(raw) else {
            return raw.to_string();
        };
        match self {
            Locale::English => moment.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
            Locale::Persian => {
                let (year, month, day) =
                    gregorian_to_jalali(moment.year(), moment.month(), moment.day());
                let text = format!(
                    "{year}/{month:02}/{day:02}، {:02}:{:02}:{:02}",
                    moment.hour(),
                    moment.minute(),
                    moment.second()
                );
                self.localize_digits(&text)
            }
        }
    }

    fn localize_digits(self, text: &str) -> String {
        match self {
            Locale::English => text.to_string(),
            Locale::Persian => text
                .chars()
                .map(|ch| match ch.to_digit(10) {
                    Some(digit) => PERSIAN_DIGITS[digit as usize],
                    None => ch,
                })
                .collect(),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(moment) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(moment);
    }
    // Naive timestamps (no offset) are read as UTC.
    let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Some(naive.and_utc().fixed_offset())
}

/// Converts a proleptic Gregorian date to the Solar Hijri (Jalali) calendar.
pub fn gregorian_to_jalali(year: i32, month: u32, day: u32) -> (i32, u32, u32) {
    const DAYS_BEFORE_MONTH: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

    let gy = i64::from(year);
    let gy2 = if month > 2 { gy + 1 } else { gy };
    let month_index = (month.clamp(1, 12) - 1) as usize;
    let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100 + (gy2 + 399) / 400
        + i64::from(day)
        + DAYS_BEFORE_MONTH[month_index];

    let mut jy = -1595 + 33 * (days / 12_053);
    days %= 12_053;
    jy += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        jy += (days - 1) / 365;
        days = (days - 1) % 365;
    }
    let (jm, jd) = if days < 186 {
        (1 + days / 31, 1 + days % 31)
    } else {
        (7 + (days - 186) / 30, 1 + (days - 186) % 30)
    };
    (jy as i32, jm as u32, jd as u32)
}
