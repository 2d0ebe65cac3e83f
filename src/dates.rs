use chrono::{Days, NaiveDate};

/// Number of calendar days in the inclusive range, 0 when the range is inverted.
pub fn day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return 0;
    }
    (end - start).num_days() + 1
}

/// Every day of the inclusive range, in order. Empty when the range is inverted.
pub fn expand_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        current = match current.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn single_day_range_counts_one() {
        assert_eq!(day_count(d("2025-03-10"), d("2025-03-10")), 1);
        assert_eq!(expand_range(d("2025-03-10"), d("2025-03-10")), vec![d("2025-03-10")]);
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let days = expand_range(d("2025-03-10"), d("2025-03-14"));
        assert_eq!(days.len(), 5);
        assert_eq!(days.first(), Some(&d("2025-03-10")));
        assert_eq!(days.last(), Some(&d("2025-03-14")));
        assert_eq!(day_count(d("2025-03-10"), d("2025-03-14")), 5);
    }

    #[test]
    fn range_crosses_month_boundary() {
        let days = expand_range(d("2025-01-30"), d("2025-02-02"));
        assert_eq!(
            days,
            vec![d("2025-01-30"), d("2025-01-31"), d("2025-02-01"), d("2025-02-02")]
        );
    }

    #[test]
    fn inverted_range_is_empty() {
        assert_eq!(day_count(d("2025-03-14"), d("2025-03-10")), 0);
        assert!(expand_range(d("2025-03-14"), d("2025-03-10")).is_empty());
    }
}
