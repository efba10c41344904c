use chromium_login_import::chromium_time;
use chromium_login_import::ChromiumBrowser;

#[test]
fn test_version() {
    assert!(!chromium_login_import::VERSION.is_empty());
}

#[test]
fn test_chromium_time_round_trips_through_datetime() {
    let raw = 13_300_000_000_000_000;
    let value = chromium_time::to_datetime(raw).expect("timestamp");
    assert_eq!(chromium_time::from_datetime(value), Some(raw));
}

#[test]
fn test_browser_names_round_trip_through_display() {
    for browser in [
        ChromiumBrowser::Chrome,
        ChromiumBrowser::Chromium,
        ChromiumBrowser::Edge,
        ChromiumBrowser::Brave,
        ChromiumBrowser::Opera,
        ChromiumBrowser::Vivaldi,
        ChromiumBrowser::Whale,
    ] {
        let parsed: ChromiumBrowser = browser.to_string().parse().expect("parse");
        assert_eq!(parsed, browser);
    }
}
