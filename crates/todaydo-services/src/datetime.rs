//! Clock face: time and long-form date for the dashboard header.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};
use todaydo_core::Language;

/// Zero-padded 24-hour `HH:MM`.
pub fn format_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    format!("{:02}:{:02}", at.hour(), at.minute())
}

/// Long date with weekday, e.g. `2026년 10월 18일 일요일` or
/// `Sunday, October 18, 2026`.
pub fn format_date<Tz: TimeZone>(at: &DateTime<Tz>, lang: Language) -> String {
    let date = at.date_naive();
    match lang {
        Language::Ko => format!(
            "{}년 {}월 {}일 {}",
            date.year(),
            date.month(),
            date.day(),
            weekday_ko(date.weekday())
        ),
        Language::En => date.format("%A, %B %-d, %Y").to_string(),
    }
}

fn weekday_ko(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "월요일",
        Weekday::Tue => "화요일",
        Weekday::Wed => "수요일",
        Weekday::Thu => "목요일",
        Weekday::Fri => "금요일",
        Weekday::Sat => "토요일",
        Weekday::Sun => "일요일",
    }
}
