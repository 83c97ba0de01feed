//! Publication-date helpers shared by listings, the archive, and the feed.

use time::{
    Date, Month, OffsetDateTime,
    format_description::{FormatItem, well_known::Rfc3339},
    macros::format_description,
};

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

pub fn format_human_date(date: Date) -> String {
    date.format(HUMAN_DATE_FORMAT).expect("valid calendar date")
}

pub fn format_iso_datetime(time: OffsetDateTime) -> String {
    time.format(&Rfc3339).unwrap_or_else(|_| time.to_string())
}

/// Long name for a 1-based month number, as shown on the archive page.
pub fn month_name(month: u8) -> &'static str {
    match Month::try_from(month) {
        Ok(Month::January) => "January",
        Ok(Month::February) => "February",
        Ok(Month::March) => "March",
        Ok(Month::April) => "April",
        Ok(Month::May) => "May",
        Ok(Month::June) => "June",
        Ok(Month::July) => "July",
        Ok(Month::August) => "August",
        Ok(Month::September) => "September",
        Ok(Month::October) => "October",
        Ok(Month::November) => "November",
        Ok(Month::December) => "December",
        Err(_) => "",
    }
}

/// Canonical path for a post: `/{year}/{month}/{slug}`.
pub fn post_path(published_at: OffsetDateTime, slug: &str) -> String {
    let date = published_at.date();
    format!("/{}/{}/{}", date.year(), u8::from(date.month()), slug)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn human_date_has_long_month_and_unpadded_day() {
        let date = datetime!(2017-07-04 22:00:04 UTC).date();
        assert_eq!(format_human_date(date), "July 4, 2017");
    }

    #[test]
    fn post_path_uses_numeric_year_and_month() {
        let path = post_path(datetime!(2016-03-02 09:30:00 UTC), "my-first-post");
        assert_eq!(path, "/2016/3/my-first-post");
    }

    #[test]
    fn month_name_covers_calendar() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(13), "");
    }
}
