// Integration tests (native) for the lunisolar calendar and the greeting
// formatter. These avoid wasm-specific functionality so they run under
// `cargo test` on the host; dates are injected instead of read from a clock.

use chrono::NaiveDate;
use floofbox::calendar::{FormatError, HomeClock, format_display_date, format_solar_only};
use floofbox::lunar::{LunarDate, solar_term};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn lunar_new_year_anchors() {
    // Known 正月初一 dates across the table range.
    for (y, m, day) in [
        (1984, 2, 2),
        (2000, 2, 5),
        (2024, 2, 10),
        (2025, 1, 29),
        (2026, 2, 17),
        (2033, 1, 31),
    ] {
        let lunar = LunarDate::from_solar(d(y, m, day)).unwrap();
        assert_eq!(
            (lunar.month, lunar.day, lunar.is_leap_month),
            (1, 1, false),
            "expected {y}-{m:02}-{day:02} to be a lunar new year"
        );
    }
}

#[test]
fn lunar_mid_month_conversions() {
    let lunar = LunarDate::from_solar(d(2026, 2, 9)).unwrap();
    assert_eq!((lunar.year, lunar.month, lunar.day), (2025, 12, 22));
    assert_eq!(lunar.month_in_chinese(), "腊");
    assert_eq!(lunar.day_in_chinese(), "廿二");

    let lantern = LunarDate::from_solar(d(2026, 3, 3)).unwrap();
    assert_eq!((lantern.month, lantern.day), (1, 15));
    assert_eq!(lantern.day_in_chinese(), "十五");
}

#[test]
fn lunar_leap_month() {
    // 2025 has a leap sixth month starting on 2025-07-25.
    let last = LunarDate::from_solar(d(2025, 7, 24)).unwrap();
    assert_eq!((last.month, last.day, last.is_leap_month), (6, 30, false));

    let first = LunarDate::from_solar(d(2025, 7, 25)).unwrap();
    assert_eq!((first.month, first.day, first.is_leap_month), (6, 1, true));
    assert_eq!(first.month_in_chinese(), "闰六");

    let mid = LunarDate::from_solar(d(2025, 8, 10)).unwrap();
    assert_eq!((mid.month, mid.day, mid.is_leap_month), (6, 17, true));
}

#[test]
fn lunar_rejects_out_of_table_dates() {
    assert_eq!(
        LunarDate::from_solar(d(1899, 12, 31)),
        Err(FormatError::OutOfRange(1899))
    );
    assert_eq!(
        LunarDate::from_solar(d(1900, 1, 30)),
        Err(FormatError::OutOfRange(1900))
    );
    assert_eq!(
        LunarDate::from_solar(d(2101, 1, 1)),
        Err(FormatError::OutOfRange(2101))
    );
}

#[test]
fn solar_terms_fall_on_exact_days_only() {
    assert_eq!(solar_term(d(2026, 2, 4)), Some("立春"));
    assert_eq!(solar_term(d(2026, 2, 5)), None);
    assert_eq!(solar_term(d(2026, 2, 9)), None);
    assert_eq!(solar_term(d(2026, 4, 5)), Some("清明"));
    assert_eq!(solar_term(d(2026, 6, 21)), Some("夏至"));
    assert_eq!(solar_term(d(1800, 2, 4)), None);
}

#[test]
fn display_line_plain_day() {
    assert_eq!(
        format_display_date(d(2026, 2, 9)).unwrap(),
        "今天是2026年2月9日，星期一，农历腊月廿二"
    );
}

#[test]
fn display_line_marks_first_and_fifteenth() {
    let new_year = format_display_date(d(2026, 2, 17)).unwrap();
    assert!(new_year.contains("星期二"), "got {new_year}");
    assert!(new_year.contains("农历正月初一（初一）"), "got {new_year}");

    let lantern = format_display_date(d(2026, 3, 3)).unwrap();
    assert!(lantern.contains("农历正月十五（十五）"), "got {lantern}");
}

#[test]
fn display_line_includes_solar_term() {
    let lichun = format_display_date(d(2026, 2, 4)).unwrap();
    assert!(lichun.ends_with("，节气立春"), "got {lichun}");
}

#[test]
fn display_line_fails_loudly_outside_table() {
    assert_eq!(
        format_display_date(d(1899, 6, 1)),
        Err(FormatError::OutOfRange(1899))
    );
    // The degraded line still renders for the same date.
    assert_eq!(format_solar_only(d(2026, 2, 9)), "今天是2026年2月9日，星期一");
}

#[test]
fn home_clock_offset_parsing() {
    assert!(HomeClock::from_offset_str("+08:00").is_ok());
    assert!(HomeClock::from_offset_str("-05:30").is_ok());
    assert!(HomeClock::from_offset_str(" +08:00 ").is_ok());
    for bad in ["", "8:00", "+8", "+25:00", "+08:61", "UTC+8"] {
        assert!(
            matches!(HomeClock::from_offset_str(bad), Err(FormatError::BadOffset(_))),
            "expected {bad:?} to be rejected"
        );
    }
}
