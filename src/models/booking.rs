use serde::{Deserialize, Serialize};

use super::field::{ChoiceStyle, FieldId};

/// The only event type the booking form is ever filled with.
pub const EVENT_TYPE: &str = "Schools & Universities";

pub const DEFAULT_TOTAL_HOURS: f64 = 4.0;

/// Booking details extracted from one pasted email.
///
/// Every field is optional: an absent field leaves the matching form control
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_saturday: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_company: Option<String>,
    /// Mirrors `school_company`; the form has two overlapping name fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub has_dj_package: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub create_customer_contact: bool,
}

/// Values the form needs that never come from the email.
#[derive(Debug, Clone, Default)]
pub struct FillDefaults {
    pub account_contact: String,
    pub account_email: String,
}

/// What the resolver writes into a control.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Choice(bool, ChoiceStyle),
}

impl FieldValue {
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Choice(v, style) => style.token(*v).to_string(),
        }
    }
}

impl BookingRecord {
    /// Value to write for `field`, or `None` to leave the control alone.
    pub fn value_for(&self, field: FieldId, defaults: &FillDefaults) -> Option<FieldValue> {
        let text = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| FieldValue::Text(s.to_string()))
        };
        let fallback = |s: &str| {
            Some(s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| FieldValue::Text(s.to_string()))
        };

        match field {
            FieldId::AccountContact => fallback(&defaults.account_contact),
            FieldId::AccountEmail => text(&self.account_email)
                .or_else(|| text(&self.contact_email))
                .or_else(|| fallback(&defaults.account_email)),
            FieldId::EventDate => text(&self.event_date),
            FieldId::EventType => text(&self.event_type),
            FieldId::IsSaturday => self
                .is_saturday
                .map(|v| FieldValue::Choice(v, field.choice_style())),
            FieldId::CreateCustomerContact => Some(FieldValue::Choice(
                self.create_customer_contact,
                field.choice_style(),
            )),
            FieldId::HasDjPackage => {
                Some(FieldValue::Choice(self.has_dj_package, field.choice_style()))
            }
            FieldId::SchoolCompany => text(&self.school_company),
            FieldId::PersonName => text(&self.person_name),
            FieldId::ContactEmail => text(&self.contact_email),
            FieldId::ContactPhone => text(&self.contact_phone),
            FieldId::Venue => text(&self.venue),
            FieldId::StartTime => text(&self.start_time),
            FieldId::FinishTime => text(&self.finish_time),
            FieldId::TotalHours => self.total_hours.map(|h| FieldValue::Text(format_hours(h))),
        }
    }
}

pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        format!("{hours}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_and_skips_absent() {
        let record = BookingRecord {
            event_date: Some("05/Apr/25".to_string()),
            is_saturday: Some(true),
            has_dj_package: true,
            create_customer_contact: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["eventDate"], "05/Apr/25");
        assert_eq!(json["isSaturday"], true);
        assert_eq!(json["hasDjPackage"], true);
        assert!(json.get("venue").is_none());
    }

    #[test]
    fn test_account_email_fallbacks() {
        let defaults = FillDefaults {
            account_contact: "May".to_string(),
            account_email: "office@example.com".to_string(),
        };
        let record = BookingRecord::default();
        assert_eq!(
            record.value_for(FieldId::AccountEmail, &defaults),
            Some(FieldValue::Text("office@example.com".to_string()))
        );

        let record = BookingRecord {
            account_email: Some("a@b.com".to_string()),
            ..Default::default()
        };
        assert_eq!(
            record.value_for(FieldId::AccountEmail, &defaults),
            Some(FieldValue::Text("a@b.com".to_string()))
        );

        let record = BookingRecord {
            contact_email: Some("client@school.edu".to_string()),
            ..Default::default()
        };
        assert_eq!(
            record.value_for(FieldId::AccountEmail, &defaults),
            Some(FieldValue::Text("client@school.edu".to_string()))
        );
    }

    #[test]
    fn test_absent_fields_have_no_value() {
        let defaults = FillDefaults::default();
        let record = BookingRecord::default();
        assert_eq!(record.value_for(FieldId::Venue, &defaults), None);
        assert_eq!(record.value_for(FieldId::AccountContact, &defaults), None);
        assert_eq!(record.value_for(FieldId::IsSaturday, &defaults), None);
    }

    #[test]
    fn test_booleans_use_field_choice_style() {
        let defaults = FillDefaults::default();
        let record = BookingRecord {
            is_saturday: Some(false),
            has_dj_package: true,
            ..Default::default()
        };
        assert_eq!(
            record.value_for(FieldId::IsSaturday, &defaults).unwrap().display(),
            "No"
        );
        assert_eq!(
            record.value_for(FieldId::HasDjPackage, &defaults).unwrap().display(),
            "Y"
        );
    }

    #[test]
    fn test_hours_format() {
        assert_eq!(format_hours(4.0), "4");
        assert_eq!(format_hours(4.5), "4.5");
    }
}
