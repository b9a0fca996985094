use crate::completed::CompletedDaySet;
use crate::day_key::DayKey;

/// Consecutive completed days ending today, or ending yesterday while today is still open.
pub fn compute_streak(completed: &CompletedDaySet, today: DayKey) -> u32 {
    let anchor = if completed.contains(today) {
        Some(today)
    } else {
        today.pred().filter(|yesterday| completed.contains(*yesterday))
    };

    let Some(mut day) = anchor else {
        return 0;
    };

    let mut streak = 1;
    while let Some(previous) = day.pred() {
        if !completed.contains(previous) {
            break;
        }
        streak += 1;
        day = previous;
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    #[test]
    fn empty_set_has_no_streak() {
        assert_eq!(compute_streak(&CompletedDaySet::new(), key("2025-03-26")), 0);
    }

    #[test]
    fn run_ending_today() {
        let set = CompletedDaySet::from_keys(["2025-03-24", "2025-03-25", "2025-03-26"]);
        assert_eq!(compute_streak(&set, key("2025-03-26")), 3);
    }

    #[test]
    fn open_day_keeps_yesterdays_run() {
        let set = CompletedDaySet::from_keys(["2025-03-24", "2025-03-25", "2025-03-26"]);
        assert_eq!(compute_streak(&set, key("2025-03-27")), 3);
    }

    #[test]
    fn closed_empty_day_breaks_run() {
        let set = CompletedDaySet::from_keys(["2025-03-24", "2025-03-25", "2025-03-26"]);
        assert_eq!(compute_streak(&set, key("2025-03-28")), 0);
    }

    #[test]
    fn stops_at_first_gap() {
        let set = CompletedDaySet::from_keys(["2025-03-20", "2025-03-22", "2025-03-23"]);
        assert_eq!(compute_streak(&set, key("2025-03-23")), 2);
    }

    #[test]
    fn run_spans_year_boundary() {
        let set = CompletedDaySet::from_keys(["2024-12-30", "2024-12-31", "2025-01-01"]);
        assert_eq!(compute_streak(&set, key("2025-01-02")), 3);
    }

    #[test]
    fn future_days_are_ignored() {
        let set = CompletedDaySet::from_keys(["2025-03-26", "2025-03-27"]);
        assert_eq!(compute_streak(&set, key("2025-03-26")), 1);
    }
}
