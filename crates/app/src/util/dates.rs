use chrono::NaiveDate;

/// Every calendar date from `start` to `end`, both inclusive.
pub fn date_span(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start
        .iter_days()
        .take_while(move |date| *date <= end)
}
