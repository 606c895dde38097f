use super::{Conflict, ConflictKind};
use crate::config::GeneratorConfig;
use crate::model::{EmployeeId, ScheduleShift, ShiftType, ShiftTypeId};
use std::collections::{BTreeMap, HashMap};

pub(super) fn detect_conflicts(
    shifts: &[ScheduleShift],
    shift_types: &[ShiftType],
    config: GeneratorConfig,
) -> Vec<Conflict> {
    let catalog: HashMap<&ShiftTypeId, &ShiftType> =
        shift_types.iter().map(|st| (&st.id, st)).collect();

    let mut by_employee: BTreeMap<&EmployeeId, Vec<&ScheduleShift>> = BTreeMap::new();
    for shift in shifts {
        by_employee.entry(&shift.employee_id).or_default().push(shift);
    }

    let mut out = Vec::new();
    for (employee, mut own) in by_employee {
        // ordre chronologique, à date égale selon l'heure de début
        own.sort_by_key(|s| {
            let start = catalog.get(&s.shift_type_id).map(|st| st.start_time);
            (s.shift_date, start)
        });

        for (idx, a) in own.iter().enumerate() {
            for b in own.iter().skip(idx + 1) {
                if a.shift_date == b.shift_date {
                    out.push(Conflict {
                        employee: employee.clone(),
                        shift_a: a.id.clone(),
                        shift_b: b.id.clone(),
                        kind: ConflictKind::SameDay,
                    });
                    continue;
                }

                let (Some(sa), Some(sb)) =
                    (catalog.get(&a.shift_type_id), catalog.get(&b.shift_type_id))
                else {
                    continue;
                };
                let (_, a_end) = sa.window_on(a.shift_date);
                let (b_start, _) = sb.window_on(b.shift_date);
                let rest_h = (b_start - a_end).num_hours();
                if rest_h < i64::from(config.min_rest_hours) {
                    out.push(Conflict {
                        employee: employee.clone(),
                        shift_a: a.id.clone(),
                        shift_b: b.id.clone(),
                        kind: ConflictKind::RestViolation,
                    });
                }
            }
        }
    }

    out
}
