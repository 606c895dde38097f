use super::{
    eligibility::GenerationContext,
    ranking,
    types::{GenerationReport, RunState, SchedError, Shortfall},
    util,
};
use crate::config::GeneratorConfig;
use crate::model::{
    is_weekend, AvailabilityLookup, DepartmentFilter, EmployeeId, GenerateScheduleParams,
    NewSchedule, ScheduleShift, ShiftCategory,
};
use crate::storage::Backend;
use tracing::{debug, info, warn};

pub(super) fn generate<B: Backend + ?Sized>(
    backend: &B,
    config: GeneratorConfig,
    params: &GenerateScheduleParams,
) -> Result<GenerationReport, SchedError> {
    util::validate(params)?;

    let header = NewSchedule {
        name: schedule_name(backend, params)?,
        department_id: params.department.department_id().cloned(),
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let schedule = backend.insert_schedule(header)?;
    info!(schedule = %schedule.id, name = %schedule.name, "generating schedule");
    debug!(preferences = ?params.preferences, "preference flags received");

    let employees = backend.employees(&params.department)?;
    let shift_types = backend.shift_types()?;
    let leave = backend.approved_leave(params.start_date, params.end_date)?;

    let mut availability = AvailabilityLookup::new();
    for employee in &employees {
        for record in backend.availability(&employee.id)? {
            availability.insert(&record);
        }
    }

    let total = employees.len();
    let headcounts: Vec<(ShiftCategory, usize)> = ShiftCategory::ORDER
        .iter()
        .map(|c| {
            let ratio = params.shift_distribution.ratio(*c);
            (*c, util::required_headcount(total, ratio, config.min_headcount))
        })
        .collect();

    let slots = util::category_slots(&shift_types);
    let mut ctx = GenerationContext::new(employees, &shift_types, leave, availability, config);
    if config.honor_preference_flags {
        ctx.weekend_rule = params.preferences.balance_weekends;
        ctx.rank_by_preference = params.preferences.consider_employee_requests;
    }

    let mut state = RunState::new(&ctx.employees);
    let mut shortfalls = Vec::new();

    for date in util::days(params.start_date, params.end_date) {
        for (category, shift_type) in &slots {
            let required = headcounts
                .iter()
                .find(|(c, _)| c == category)
                .map_or(0, |(_, n)| *n);

            let chosen: Vec<EmployeeId> = ranking::rank_eligible(&ctx, date, shift_type, &state)
                .into_iter()
                .take(required)
                .map(|e| e.id.clone())
                .collect();

            debug!(%date, %category, required, assigned = chosen.len(), "slot filled");
            if chosen.len() < required {
                shortfalls.push(Shortfall {
                    date,
                    category: *category,
                    required,
                    assigned: chosen.len(),
                });
            }

            for employee_id in chosen {
                if *category == ShiftCategory::Morning && is_weekend(date) {
                    state.weekend.increment(&employee_id);
                }
                state.drafts.push(ScheduleShift::draft(
                    schedule.id.clone(),
                    employee_id,
                    shift_type.id.clone(),
                    date,
                ));
            }
        }
    }

    if !state.drafts.is_empty() {
        backend.insert_shifts(&state.drafts)?;
    }

    if !shortfalls.is_empty() {
        warn!(
            schedule = %schedule.id,
            slots = shortfalls.len(),
            "some shifts are under-staffed"
        );
    }
    info!(schedule = %schedule.id, shifts = state.drafts.len(), "schedule generated");

    Ok(GenerationReport {
        schedule,
        shifts: state.drafts,
        headcounts,
        shortfalls,
        weekend_counts: state.weekend.into_counts(),
    })
}

/// `"<department> Schedule (<start>-<end>)"`
fn schedule_name<B: Backend + ?Sized>(
    backend: &B,
    params: &GenerateScheduleParams,
) -> anyhow::Result<String> {
    let department = match &params.department {
        DepartmentFilter::All => "All Departments".to_string(),
        DepartmentFilter::Only(id) => backend
            .department(id)?
            .map(|d| d.name)
            .unwrap_or_else(|| id.to_string()),
    };
    Ok(format!(
        "{department} Schedule ({}-{})",
        params.start_date.format("%Y-%m-%d"),
        params.end_date.format("%Y-%m-%d")
    ))
}
