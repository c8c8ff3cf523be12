use chrono::{DateTime, Utc};

/// Long date used in result emails, e.g. `06 September 2019`.
pub fn long_date(dt: DateTime<Utc>) -> String {
    dt.format("%d %B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn long_date_matches_mail_format() {
        let dt = Utc.with_ymd_and_hms(2019, 9, 6, 18, 24, 0).unwrap();
        assert_eq!(long_date(dt), "06 September 2019");
    }
}
