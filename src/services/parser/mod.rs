pub mod dates;
pub mod times;

use crate::models::{BookingRecord, FieldId, DEFAULT_TOTAL_HOURS, EVENT_TYPE};

pub use dates::{format_date, is_saturday};
pub use times::calculate_finish_time;

/// Prefixes tried, in order, when the email has no `Room:` line.
const VENUE_FALLBACKS: [&str; 5] = ["venue:", "location:", "place:", "at:", "in:"];

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no email content to extract from")]
    EmptyInput,
}

/// Builds a booking record from a pasted booking email.
///
/// Each field is extracted on its own; a missing or unreadable line only
/// leaves that field empty.
pub fn parse(raw: &str) -> Result<BookingRecord, ExtractError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ExtractError::EmptyInput);
    }

    let mut record = BookingRecord {
        has_dj_package: capture(text, FieldId::HasDjPackage)
            .is_some_and(|package| package.to_lowercase().contains("dj")),
        event_date: capture(text, FieldId::EventDate),
        start_time: capture(text, FieldId::StartTime),
        ..Default::default()
    };

    record.venue = capture(text, FieldId::Venue).or_else(|| {
        VENUE_FALLBACKS.iter().find_map(|prefix| {
            let venue = first_line_value(text, &[*prefix]);
            if venue.is_some() {
                tracing::debug!(prefix, "venue found by fallback keyword");
            }
            venue
        })
    });

    record.school_company = capture(text, FieldId::SchoolCompany);
    record.contact_email = capture(text, FieldId::ContactEmail);
    record.contact_phone = capture(text, FieldId::ContactPhone);
    normalize(&mut record);

    tracing::info!(
        event_date = ?record.event_date,
        venue = ?record.venue,
        school_company = ?record.school_company,
        "extracted booking record"
    );

    Ok(record)
}

/// Brings a record, extracted or hand-edited, into the shape the form
/// expects.
///
/// The event date is re-expressed as `DD/Mon/YY` and its weekday decides
/// `is_saturday` unless that was given. The fixed answers are set, the
/// person name and account email mirror the client and contact email when
/// absent, and the finish time is derived unless one was supplied.
pub fn normalize(record: &mut BookingRecord) {
    match record.event_date.take().filter(|d| !d.trim().is_empty()) {
        Some(raw) => {
            let formatted = format_date(&raw);
            record.is_saturday.get_or_insert_with(|| is_saturday(&raw));
            tracing::debug!(raw = %raw, formatted = %formatted, "normalized event date");
            record.event_date = Some(formatted);
        }
        None => record.event_date = None,
    }

    record.event_type.get_or_insert_with(|| EVENT_TYPE.to_string());
    record.create_customer_contact = true;

    if record.person_name.is_none() {
        record.person_name = record.school_company.clone();
    }
    if record.account_email.is_none() {
        record.account_email = record.contact_email.clone();
    }
    if record.finish_time.is_none() {
        derive_times(record);
    }
}

/// Fills in `total_hours` and `finish_time` for a record with a start time.
fn derive_times(record: &mut BookingRecord) {
    if let Some(start) = record.start_time.as_deref() {
        let hours = *record.total_hours.get_or_insert(DEFAULT_TOTAL_HOURS);
        record.finish_time = Some(calculate_finish_time(start, hours));
    }
}

fn capture(text: &str, field: FieldId) -> Option<String> {
    first_line_value(text, field.line_prefixes())
}

/// Remainder of the first line starting with any of `prefixes`
/// (case-insensitive). Lines with nothing after the prefix don't count.
fn first_line_value(text: &str, prefixes: &[&str]) -> Option<String> {
    text.lines().find_map(|line| {
        let line = line
            .trim_start()
            .trim_start_matches(['-', '*', '•', '>'])
            .trim_start();
        prefixes.iter().find_map(|prefix| {
            let head = line.get(..prefix.len())?;
            if !head.eq_ignore_ascii_case(prefix) {
                return None;
            }
            let value = line[prefix.len()..].trim();
            (!value.is_empty()).then(|| value.to_string())
        })
    })
}
