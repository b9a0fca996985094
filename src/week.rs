use crate::completed::CompletedDaySet;
use crate::day_key::DayKey;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekDay {
    pub letter: char,
    pub day_number: u32,
    pub date: DayKey,
    pub is_today: bool,
    pub completed: bool,
}

/// The Monday-first calendar week containing `today`.
pub fn current_week(today: DayKey, completed: &CompletedDaySet) -> Vec<WeekDay> {
    let start = today.week_start();
    (0..7)
        .map(|offset| {
            let date = start.offset_days(offset);
            WeekDay {
                letter: date.weekday_letter(),
                day_number: date.day_number(),
                date,
                is_today: date == today,
                completed: completed.contains(date),
            }
        })
        .collect()
}
