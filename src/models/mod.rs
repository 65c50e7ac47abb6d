pub mod booking;
pub mod field;
pub mod report;
pub mod status;

pub use booking::{BookingRecord, FieldValue, FillDefaults, DEFAULT_TOTAL_HOURS, EVENT_TYPE};
pub use field::{ChoiceStyle, FieldId, FieldKind};
pub use report::{FieldReport, FieldStatus, FillReport};
pub use status::{StatusKind, StatusLine};
