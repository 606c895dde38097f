use super::{types::RunState, util};
use crate::config::{GeneratorConfig, RestPolicy};
use crate::model::{
    is_weekend, AvailabilityLookup, Employee, EmployeeId, LeaveInterval, ShiftType, ShiftTypeId,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

/// Entrées figées d'un run (roster, congés, disponibilités, catalogue).
pub(crate) struct GenerationContext {
    pub(crate) employees: Vec<Employee>,
    pub(crate) availability: AvailabilityLookup,
    pub(crate) config: GeneratorConfig,
    pub(crate) weekend_rule: bool,
    pub(crate) rank_by_preference: bool,
    leave: HashMap<EmployeeId, Vec<LeaveInterval>>,
    shift_types: HashMap<ShiftTypeId, ShiftType>,
}

impl GenerationContext {
    pub(crate) fn new(
        employees: Vec<Employee>,
        shift_types: &[ShiftType],
        leave: Vec<LeaveInterval>,
        availability: AvailabilityLookup,
        config: GeneratorConfig,
    ) -> Self {
        let mut by_employee: HashMap<EmployeeId, Vec<LeaveInterval>> = HashMap::new();
        for interval in leave {
            by_employee
                .entry(interval.employee_id.clone())
                .or_default()
                .push(interval);
        }
        Self {
            employees,
            availability,
            config,
            weekend_rule: true,
            rank_by_preference: true,
            leave: by_employee,
            shift_types: shift_types
                .iter()
                .map(|st| (st.id.clone(), st.clone()))
                .collect(),
        }
    }

    /// Congé, repos puis équité week-end ; toutes les règles doivent passer.
    pub(crate) fn is_eligible(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
        shift_type: &ShiftType,
        state: &RunState,
    ) -> bool {
        if self.on_leave(employee, date) {
            return false;
        }

        let rested = match self.config.rest_policy {
            RestPolicy::CalendarDate => self.rested_by_date(employee, date, state),
            RestPolicy::ShiftTimes => self.rested_by_times(employee, date, shift_type, state),
        };
        if !rested {
            return false;
        }

        if self.weekend_rule && is_weekend(date) {
            let count = f64::from(state.weekend.count(employee));
            if count > state.weekend.average() {
                return false;
            }
        }

        true
    }

    fn on_leave(&self, employee: &EmployeeId, date: NaiveDate) -> bool {
        self.leave
            .get(employee)
            .is_some_and(|intervals| intervals.iter().any(|l| l.covers(date)))
    }

    /// Dernier `shift_date` strictement antérieur ; écart mesuré entre minuits.
    fn rested_by_date(&self, employee: &EmployeeId, date: NaiveDate, state: &RunState) -> bool {
        let prior = state
            .assignments_of(employee)
            .map(|s| s.shift_date)
            .filter(|d| *d < date)
            .max();

        match prior {
            Some(prior) => {
                let gap_h = (date - prior).num_hours();
                gap_h >= i64::from(self.config.min_rest_hours)
            }
            None => true,
        }
    }

    fn rested_by_times(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
        shift_type: &ShiftType,
        state: &RunState,
    ) -> bool {
        let (start, end) = shift_type.window_on(date);
        let min_rest = i64::from(self.config.min_rest_hours);
        let mut prev_end: Option<DateTime<Utc>> = None;

        for assigned in state.assignments_of(employee) {
            let Some(st) = self.shift_types.get(&assigned.shift_type_id) else {
                continue;
            };
            let (a_start, a_end) = st.window_on(assigned.shift_date);
            if util::overlaps(a_start, a_end, start, end) {
                return false;
            }
            if a_end <= start {
                prev_end = Some(prev_end.map_or(a_end, |pe| pe.max(a_end)));
            } else if (a_start - end).num_hours() < min_rest {
                return false;
            }
        }

        if let Some(prev) = prev_end {
            if (start - prev).num_hours() < min_rest {
                return false;
            }
        }

        true
    }
}
