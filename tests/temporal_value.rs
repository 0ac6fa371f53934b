use std::cmp::Ordering;

use chrono::{TimeZone, Timelike, Utc};
use mementoweb::datetime::{month_from_name, month_name, DisplayFormat, TemporalValue};

fn rfc(date: &str) -> TemporalValue {
    TemporalValue::parse_rfc1123(date).expect("valid date")
}

#[test]
fn parses_rfc1123_with_any_weekday_and_zone() {
    let date = rfc("Sat, 22 Dec 2007 09:05:17 GMT");
    assert_eq!((date.day(), date.month(), date.year()), (22, 12, 2007));
    assert_eq!(date.instant(), Utc.with_ymd_and_hms(2007, 12, 22, 9, 5, 17).unwrap());
    // archives send UTC as often as GMT
    assert!(rfc("Fri, 13 Jan 2012 18:52:01 UTC").same_instant(&rfc("Fri, 13 Jan 2012 18:52:01 GMT")));
    // a wrong weekday is ignored
    assert!(rfc("Mon, 22 Dec 2007 09:05:17 GMT").same_instant(&date));
    let shifted = rfc("Sat, 22 Dec 2007 10:05:17 +0100");
    assert!(shifted.same_instant(&date));
}

#[test]
fn malformed_dates_are_errors() {
    assert!(TemporalValue::parse_rfc1123("").is_err());
    assert!(TemporalValue::parse_rfc1123("yesterday").is_err());
    assert!(TemporalValue::parse_rfc1123("Sat, 32 Dec 2007 09:05:17 GMT").is_err());
    assert!(TemporalValue::parse_rfc1123("Sat, 22 Dez 2007 09:05:17 GMT").is_err());
}

#[test]
fn same_day_compares_equal() {
    let morning = rfc("Sat, 22 Dec 2007 00:00:00 GMT");
    let night = rfc("Sat, 22 Dec 2007 23:59:59 GMT");
    assert_eq!(morning.cmp(&night), Ordering::Equal);
    assert_eq!(morning, night);
    assert!(!morning.same_instant(&night));

    let next_day = rfc("Sun, 23 Dec 2007 10:05:17 GMT");
    let previous_day = rfc("Fri, 21 Dec 2007 10:05:17 GMT");
    assert!(morning < next_day);
    assert!(night > previous_day);
}

#[test]
fn rfc1123_output_is_gmt() {
    let date = rfc("Sat, 22 Dec 2007 10:05:17 +0100");
    assert_eq!(date.to_rfc1123(), "Sat, 22 Dec 2007 09:05:17 GMT");
    assert_eq!(date.to_string(), "Sat, 22 Dec 2007 09:05:17 GMT");
}

#[test]
fn display_formats() {
    let format = DisplayFormat::default();
    let date = rfc("Fri, 13 Jan 2012 18:52:01 UTC");
    assert_eq!(date.format_date(&format), "Jan 13, 2012");
    assert_eq!(date.format_date_time(&format), "Jan 13, 2012 6:52:01 PM");

    let iso = DisplayFormat::new("%Y-%m-%d", "%H:%M").expect("valid patterns");
    assert_eq!(date.format_date_time(&iso), "2012-01-13 18:52");
    assert!(DisplayFormat::new("%Y-%Q", "%H").is_err());
}

#[test]
fn end_of_day_keeps_the_date() {
    let mut date = TemporalValue::from_ymd(24, 7, 2001).expect("date");
    let before = date.clone();
    date.set_to_end_of_day();
    assert_eq!(date.instant().hour(), 23);
    assert_eq!(date.instant().minute(), 59);
    assert_eq!(date, before);
    assert_eq!(date.to_rfc1123(), "Tue, 24 Jul 2001 23:59:00 GMT");
}

#[test]
fn short_dates_and_calendar_construction() {
    let date = TemporalValue::parse_short_date("12-31-2001").expect("short date");
    assert_eq!((date.day(), date.month(), date.year()), (31, 12, 2001));
    assert_eq!(date.instant().hour(), 0);
    assert!(TemporalValue::parse_short_date("31-12-2001").is_err());
    assert!(TemporalValue::from_ymd(30, 2, 2001).is_err());
}

#[test]
fn whole_days_between_values() {
    let start = rfc("Fri, 13 Jan 2012 18:52:01 UTC");
    let end = rfc("Wed, 18 Jan 2012 05:26:33 UTC");
    // four and a half days
    assert_eq!(start.days_until(&end), 4);
    assert_eq!(end.days_until(&start), -4);
}

#[test]
fn month_names() {
    assert_eq!(month_name(1), Some("January"));
    assert_eq!(month_name(12), Some("December"));
    assert_eq!(month_name(0), None);
    assert_eq!(month_name(13), None);
    assert_eq!(month_from_name("december"), Some(12));
    assert_eq!(month_from_name("Smarch"), None);
}
