use serde::{Deserialize, Serialize};

/// Every form field the autofill knows about.
///
/// The parser and the resolver both dispatch on this enum, so a field can't be
/// extracted under one name and looked up under another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    AccountContact,
    AccountEmail,
    EventDate,
    EventType,
    IsSaturday,
    CreateCustomerContact,
    HasDjPackage,
    SchoolCompany,
    PersonName,
    ContactEmail,
    ContactPhone,
    Venue,
    StartTime,
    FinishTime,
    TotalHours,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    DatePicker,
    Dropdown,
    Choice,
}

/// How a yes/no answer is spelled on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceStyle {
    /// `Yes` / `No`
    Word,
    /// `Y` / `N`
    Letter,
}

impl ChoiceStyle {
    pub fn token(self, value: bool) -> &'static str {
        match (self, value) {
            (ChoiceStyle::Word, true) => "Yes",
            (ChoiceStyle::Word, false) => "No",
            (ChoiceStyle::Letter, true) => "Y",
            (ChoiceStyle::Letter, false) => "N",
        }
    }
}

impl FieldId {
    /// Fill order, top to bottom as the form lays them out.
    pub const ALL: [FieldId; 15] = [
        FieldId::AccountContact,
        FieldId::AccountEmail,
        FieldId::EventDate,
        FieldId::EventType,
        FieldId::IsSaturday,
        FieldId::CreateCustomerContact,
        FieldId::HasDjPackage,
        FieldId::SchoolCompany,
        FieldId::PersonName,
        FieldId::ContactEmail,
        FieldId::ContactPhone,
        FieldId::Venue,
        FieldId::StartTime,
        FieldId::FinishTime,
        FieldId::TotalHours,
    ];

    /// Label text as printed on the booking form.
    pub fn label(self) -> &'static str {
        match self {
            FieldId::AccountContact => "Account point of contact:",
            FieldId::AccountEmail => "Account contact email",
            FieldId::EventDate => "Event date",
            FieldId::EventType => "Event type",
            FieldId::IsSaturday => "Is it a SATURDAY booking?",
            FieldId::CreateCustomerContact => "Create customer contact",
            FieldId::HasDjPackage => "Order contains DJ package?",
            FieldId::SchoolCompany => "School/company:",
            FieldId::PersonName => "Bride/person name",
            FieldId::ContactEmail => "Customer best contact email",
            FieldId::ContactPhone => "Customer contact phone",
            FieldId::Venue => "Venue (room)",
            FieldId::StartTime => "Start time",
            FieldId::FinishTime => "Finish time",
            FieldId::TotalHours => "DJ Total hours",
        }
    }

    /// Lowercase fragment the heuristic strategies look for in nearby text.
    pub fn search_text(self) -> &'static str {
        match self {
            FieldId::AccountContact => "account point of contact",
            FieldId::AccountEmail => "account contact email",
            FieldId::EventDate => "event date",
            FieldId::EventType => "event type",
            FieldId::IsSaturday => "is it a saturday booking",
            FieldId::CreateCustomerContact => "create customer contact",
            FieldId::HasDjPackage => "order contains dj package",
            FieldId::SchoolCompany => "school/company",
            FieldId::PersonName => "person name",
            FieldId::ContactEmail => "customer best contact email",
            FieldId::ContactPhone => "customer contact phone",
            FieldId::Venue => "venue",
            FieldId::StartTime => "start time",
            FieldId::FinishTime => "finish time",
            FieldId::TotalHours => "dj total hours",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldId::EventDate => FieldKind::DatePicker,
            FieldId::EventType => FieldKind::Dropdown,
            FieldId::IsSaturday | FieldId::CreateCustomerContact | FieldId::HasDjPackage => {
                FieldKind::Choice
            }
            _ => FieldKind::Text,
        }
    }

    pub fn choice_style(self) -> ChoiceStyle {
        match self {
            FieldId::IsSaturday => ChoiceStyle::Word,
            _ => ChoiceStyle::Letter,
        }
    }

    /// Line prefixes that carry this field in a booking email, most specific
    /// first. Empty for fields that never come from the email text.
    pub fn line_prefixes(self) -> &'static [&'static str] {
        match self {
            FieldId::HasDjPackage => &["package:"],
            FieldId::EventDate => &["date:"],
            FieldId::StartTime => &["start time:"],
            FieldId::Venue => &["room:"],
            FieldId::SchoolCompany => &["client name(s):", "client names:", "client name:"],
            FieldId::ContactEmail => &["client contact email:"],
            FieldId::ContactPhone => &["client contact phone:"],
            _ => &[],
        }
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
