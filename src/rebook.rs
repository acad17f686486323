//! Quick-rebook modal: pre-filled booking form for a previously hired
//! provider. The form never touches the network itself; it validates input
//! and hands a ready [`RebookRequest`] back to the caller.

use crate::models::{PreviousBooking, Provider, RebookRequest};
use chrono::{NaiveDate, NaiveTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebookField {
    Date,
    Time,
    Address,
    Notes,
}

impl RebookField {
    pub fn label(&self) -> &'static str {
        match self {
            RebookField::Date => "Date (YYYY-MM-DD)",
            RebookField::Time => "Time (HH:MM)",
            RebookField::Address => "Address",
            RebookField::Notes => "Notes (optional)",
        }
    }

    fn next(&self) -> RebookField {
        match self {
            RebookField::Date => RebookField::Time,
            RebookField::Time => RebookField::Address,
            RebookField::Address => RebookField::Notes,
            RebookField::Notes => RebookField::Date,
        }
    }

    fn prev(&self) -> RebookField {
        match self {
            RebookField::Date => RebookField::Notes,
            RebookField::Time => RebookField::Date,
            RebookField::Address => RebookField::Time,
            RebookField::Notes => RebookField::Address,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RebookForm {
    pub provider_id: String,
    pub provider_name: String,
    pub service_id: Option<String>,
    /// Last completed booking with this provider, shown above the form.
    pub previous: Option<PreviousBooking>,
    /// Still waiting on the previous-booking lookup.
    pub loading_previous: bool,
    pub date: String,
    pub time: String,
    pub address: String,
    pub notes: String,
    pub focused: RebookField,
    /// Field-specific validation message from the last submit attempt.
    pub field_error: Option<(RebookField, String)>,
    pub submitting: bool,
}

impl RebookForm {
    pub fn new(provider: &Provider) -> Self {
        Self {
            provider_id: provider.id.clone(),
            provider_name: provider.name.clone(),
            service_id: None,
            previous: None,
            loading_previous: true,
            date: String::new(),
            time: String::new(),
            address: String::new(),
            notes: String::new(),
            focused: RebookField::Date,
            field_error: None,
            submitting: false,
        }
    }

    /// Applies the previous-booking lookup. Time, address, and notes are
    /// pre-filled; the date always starts empty so the user must pick a new
    /// one. No prior booking leaves the form blank.
    pub fn apply_previous(&mut self, previous: Option<PreviousBooking>) {
        self.loading_previous = false;
        if let Some(booking) = previous {
            self.service_id = Some(booking.service_id.clone());
            self.time = booking.scheduled_time.clone().unwrap_or_default();
            self.address = booking.address.clone().unwrap_or_default();
            self.notes = booking.notes.clone().unwrap_or_default();
            self.previous = Some(booking);
        }
    }

    pub fn focus_next(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn focus_prev(&mut self) {
        self.focused = self.focused.prev();
    }

    pub fn input_char(&mut self, c: char) {
        self.field_error = None;
        self.field_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.field_error = None;
        self.field_mut().pop();
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focused {
            RebookField::Date => &mut self.date,
            RebookField::Time => &mut self.time,
            RebookField::Address => &mut self.address,
            RebookField::Notes => &mut self.notes,
        }
    }

    /// Client-side validation. Date, time, and address are mandatory and
    /// checked in that order; nothing goes on the wire until all pass.
    /// `today` is injected so the past-date rule is testable.
    pub fn validate(&self, today: NaiveDate) -> Result<RebookRequest, (RebookField, String)> {
        if self.date.trim().is_empty() {
            return Err((RebookField::Date, "Please select a date".to_string()));
        }
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| (RebookField::Date, "Date must be YYYY-MM-DD".to_string()))?;
        if date < today {
            return Err((RebookField::Date, "Date cannot be in the past".to_string()));
        }

        if self.time.trim().is_empty() {
            return Err((RebookField::Time, "Please select a time".to_string()));
        }
        NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
            .map_err(|_| (RebookField::Time, "Time must be HH:MM".to_string()))?;

        if self.address.trim().is_empty() {
            return Err((RebookField::Address, "Please enter your address".to_string()));
        }

        Ok(RebookRequest {
            provider_id: self.provider_id.clone(),
            service_id: self.service_id.clone(),
            scheduled_date: self.date.trim().to_string(),
            scheduled_time: self.time.trim().to_string(),
            address: self.address.trim().to_string(),
            notes: self.notes.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> Provider {
        Provider {
            id: "p-7".to_string(),
            name: "Ravi".to_string(),
            coordinates: None,
            rating: 4.5,
            total_jobs: 20,
            skills: vec!["plumbing".to_string()],
            is_favorite: false,
            previously_hired: true,
            professional_badge: true,
            profile_picture: None,
            distance_km: Some(2.0),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    fn filled() -> RebookForm {
        let mut form = RebookForm::new(&provider());
        form.date = "2026-08-10".to_string();
        form.time = "14:30".to_string();
        form.address = "12 Lake Road".to_string();
        form
    }

    #[test]
    fn prefill_skips_date() {
        let mut form = RebookForm::new(&provider());
        form.apply_previous(Some(PreviousBooking {
            service_id: "s-1".to_string(),
            service_name: Some("Pipe repair".to_string()),
            scheduled_date: Some("2026-01-05".to_string()),
            scheduled_time: Some("10:00".to_string()),
            address: Some("12 Lake Road".to_string()),
            notes: Some("gate code 4411".to_string()),
            rating: Some(5),
        }));

        assert_eq!(form.date, "");
        assert_eq!(form.time, "10:00");
        assert_eq!(form.address, "12 Lake Road");
        assert_eq!(form.notes, "gate code 4411");
        assert_eq!(form.service_id.as_deref(), Some("s-1"));
    }

    #[test]
    fn no_previous_booking_leaves_form_blank() {
        let mut form = RebookForm::new(&provider());
        form.apply_previous(None);
        assert!(form.time.is_empty());
        assert!(form.address.is_empty());
        assert!(form.service_id.is_none());
        assert!(!form.loading_previous);
    }

    #[test]
    fn missing_fields_rejected_in_order() {
        let mut form = RebookForm::new(&provider());
        let err = form.validate(today()).unwrap_err();
        assert_eq!(err.0, RebookField::Date);

        form.date = "2026-08-10".to_string();
        let err = form.validate(today()).unwrap_err();
        assert_eq!(err.0, RebookField::Time);

        form.time = "14:30".to_string();
        let err = form.validate(today()).unwrap_err();
        assert_eq!(err.0, RebookField::Address);
        assert_eq!(err.1, "Please enter your address");
    }

    #[test]
    fn malformed_date_and_time_rejected() {
        let mut form = filled();
        form.date = "10/08/2026".to_string();
        assert_eq!(form.validate(today()).unwrap_err().0, RebookField::Date);

        let mut form = filled();
        form.time = "2pm".to_string();
        assert_eq!(form.validate(today()).unwrap_err().0, RebookField::Time);
    }

    #[test]
    fn past_date_rejected() {
        let mut form = filled();
        form.date = "2026-08-01".to_string();
        let err = form.validate(today()).unwrap_err();
        assert_eq!(err.0, RebookField::Date);
        assert_eq!(err.1, "Date cannot be in the past");
    }

    #[test]
    fn valid_form_builds_request() {
        let mut form = filled();
        form.service_id = Some("s-1".to_string());
        form.notes = "  ring twice ".to_string();

        let req = form.validate(today()).unwrap();
        assert_eq!(req.provider_id, "p-7");
        assert_eq!(req.service_id.as_deref(), Some("s-1"));
        assert_eq!(req.scheduled_date, "2026-08-10");
        assert_eq!(req.scheduled_time, "14:30");
        assert_eq!(req.notes, "ring twice");
    }

    #[test]
    fn typing_targets_focused_field() {
        let mut form = RebookForm::new(&provider());
        form.focused = RebookField::Address;
        for c in "5 Hill St".chars() {
            form.input_char(c);
        }
        form.backspace();
        assert_eq!(form.address, "5 Hill S");
        assert!(form.date.is_empty());
    }
}
