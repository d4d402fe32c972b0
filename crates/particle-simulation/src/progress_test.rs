use std::time::Duration;

use crate::progress::{format_duration, Progress};

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(Duration::from_secs(0)), "00:00:00");
    assert_eq!(format_duration(Duration::from_secs(3_725)), "01:02:05");
    assert_eq!(
        format_duration(Duration::from_secs(2 * 86_400 + 59)),
        "2 day(s) + 00:00:59"
    );
}

#[test]
fn test_percent_and_clamping() {
    let mut progress = Progress::new(8);
    assert_eq!(progress.percent(), 0);
    progress.advance(2);
    assert_eq!(progress.percent(), 25);
    progress.advance(100);
    assert_eq!(progress.done(), 8);
    assert_eq!(progress.percent(), 100);
    assert_eq!(progress.eta(), Duration::ZERO);
}

#[test]
fn test_empty_progress_is_complete() {
    let progress = Progress::new(0);
    assert_eq!(progress.percent(), 100);
    assert_eq!(progress.eta(), Duration::ZERO);
}
