use chrono::{DateTime, Local};

/// Telemetry values are shown with three decimals, like the bridge's own UI.
pub fn format_value(value: f64) -> String {
    format!("{:.3}", value)
}

/// Wall-clock time as HH:MM:SS.mmm
pub fn format_clock(time: &DateTime<Local>) -> String {
    time.format("%H:%M:%S%.3f").to_string()
}

/// "last update" label for a panel, or a placeholder before the first value.
pub fn format_last_update(time: Option<&DateTime<Local>>) -> String {
    match time {
        Some(t) => format!("updated {}", format_clock(t)),
        None => "waiting for data...".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0.000");
        assert_eq!(format_value(-0.22), "-0.220");
        assert_eq!(format_value(2.84159), "2.842");
    }

    #[test]
    fn test_format_clock() {
        let time = Local.with_ymd_and_hms(2024, 5, 17, 9, 4, 7).unwrap();
        assert_eq!(format_clock(&time), "09:04:07.000");
        assert_eq!(format_last_update(Some(&time)), "updated 09:04:07.000");
        assert_eq!(format_last_update(None), "waiting for data...");
    }
}
