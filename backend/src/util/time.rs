/// Whole minutes elapsed between contest start and an upload, floored,
/// clamped at zero so clock skew can never produce a negative penalty.
pub fn elapsed_minutes(begin: chrono::NaiveDateTime, upload_at: chrono::NaiveDateTime) -> i64 {
    (upload_at - begin).num_minutes().max(0)
}

#[cfg(test)]
mod test {
    use super::elapsed_minutes;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn floors_to_whole_minutes() {
        assert_eq!(elapsed_minutes(at(9, 0, 0), at(9, 59, 59)), 59);
        assert_eq!(elapsed_minutes(at(9, 0, 0), at(10, 0, 0)), 60);
    }

    #[test]
    fn clamps_negative_to_zero() {
        assert_eq!(elapsed_minutes(at(10, 0, 0), at(9, 30, 0)), 0);
    }

    #[test]
    fn zero_at_start() {
        assert_eq!(elapsed_minutes(at(9, 0, 0), at(9, 0, 0)), 0);
    }
}
