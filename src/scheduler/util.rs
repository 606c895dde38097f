use super::SchedError;
use crate::model::{GenerateScheduleParams, ShiftCategory, ShiftType};
use chrono::{DateTime, NaiveDate, Utc};

pub(super) fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Effectif requis : `max(round(total * ratio / 100), min)`.
pub fn required_headcount(total: usize, ratio: f64, min: u32) -> usize {
    let raw = (total as f64 * ratio / 100.0).round();
    (raw as usize).max(min as usize)
}

pub(super) fn validate(params: &GenerateScheduleParams) -> Result<(), SchedError> {
    if params.end_date < params.start_date {
        return Err(SchedError::InvalidDateRange);
    }
    for category in ShiftCategory::ORDER {
        let ratio = params.shift_distribution.ratio(category);
        if !ratio.is_finite() || !(0.0..=100.0).contains(&ratio) {
            return Err(SchedError::InvalidDistribution("ratios must be within 0..=100"));
        }
    }
    Ok(())
}

/// Jours de `[start, end]`, bornes incluses.
pub(super) fn days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Premier type du catalogue par catégorie, dans l'ordre Morning, Afternoon, Night.
pub(super) fn category_slots(shift_types: &[ShiftType]) -> Vec<(ShiftCategory, &ShiftType)> {
    ShiftCategory::ORDER
        .iter()
        .filter_map(|category| {
            shift_types
                .iter()
                .find(|st| st.category() == Some(*category))
                .map(|st| (*category, st))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn headcount_is_clamped_to_minimum() {
        assert_eq!(required_headcount(3, 10.0, 2), 2);
        assert_eq!(required_headcount(0, 50.0, 2), 2);
        assert_eq!(required_headcount(10, 40.0, 2), 4);
        assert_eq!(required_headcount(10, 25.0, 2), 3);
        assert_eq!(required_headcount(10, 100.0, 2), 10);
    }

    #[test]
    fn days_are_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let all: Vec<_> = days(start, end).collect();
        assert_eq!(all.len(), 4);
        assert_eq!(all.last(), Some(&end));
        assert_eq!(days(start, start).count(), 1);
    }

    #[test]
    fn slots_follow_fixed_order_and_skip_unknown_names() {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let catalog = vec![
            ShiftType::new("Night shift", t(22), t(6)),
            ShiftType::new("Afternoon", t(14), t(22)),
            ShiftType::new("Morning", t(6), t(14)),
            ShiftType::new("Late", t(22), t(6)).with_category(ShiftCategory::Night),
        ];
        let slots = category_slots(&catalog);
        let names: Vec<_> = slots.iter().map(|(_, st)| st.name.as_str()).collect();
        assert_eq!(names, ["Morning", "Afternoon", "Late"]);
    }
}
