use super::{eligibility::GenerationContext, types::RunState};
use crate::model::{day_of_week, Employee, ShiftType};
use chrono::NaiveDate;

/// Candidats éligibles, triés par préférence (preferred, available, unavailable).
/// Tri stable : à préférence égale, l'ordre du roster est conservé.
pub(crate) fn rank_eligible<'a>(
    ctx: &'a GenerationContext,
    date: NaiveDate,
    shift_type: &ShiftType,
    state: &RunState,
) -> Vec<&'a Employee> {
    let mut eligible: Vec<&Employee> = ctx
        .employees
        .iter()
        .filter(|e| ctx.is_eligible(&e.id, date, shift_type, state))
        .collect();

    if ctx.rank_by_preference {
        let dow = day_of_week(date);
        eligible.sort_by_key(|e| {
            ctx.availability
                .preference(&e.id, dow, &shift_type.id)
                .rank()
        });
    }

    eligible
}
