use chrono::NaiveDate;

/// Day-month-year format used wherever dates are shown to the user.
pub const DISPLAY_DATE_FORMAT: &str = "%d-%m-%Y";

pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

pub fn parse_display_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), DISPLAY_DATE_FORMAT)
}
