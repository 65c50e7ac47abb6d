use chrono::{Duration, NaiveTime};

/// Adds `hours` to a loosely written start time (`2pm`, `10:30am`, `14:00`)
/// and renders the result as `H:MMam/pm`, wrapping past midnight.
///
/// Returns an empty string when the start time can't be read.
pub fn calculate_finish_time(start_time: &str, hours: f64) -> String {
    match finish_time(start_time, hours) {
        Some(finish) => finish,
        None => {
            tracing::warn!(start_time, hours, "could not calculate finish time");
            String::new()
        }
    }
}

fn finish_time(start_time: &str, hours: f64) -> Option<String> {
    let start = parse_start(start_time)?;
    if !hours.is_finite() || hours < 0.0 {
        return None;
    }

    let finish = start + Duration::try_minutes((hours * 60.0).round() as i64)?;
    Some(finish.format("%-I:%M%P").to_string())
}

fn parse_start(start_time: &str) -> Option<NaiveTime> {
    let lower = start_time.to_lowercase();
    let is_pm = lower.contains("pm");
    let is_am = lower.contains("am");

    let digits: String = lower
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ':')
        .collect();
    let mut parts = digits.split(':');

    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = match parts.next() {
        None | Some("") => 0,
        Some(m) => m.parse().ok()?,
    };

    let hour = match hour {
        h if is_pm && h < 12 => h + 12,
        12 if is_am => 0,
        h => h,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}
