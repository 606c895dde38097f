#![allow(dead_code)]
use anyhow::anyhow;
use chrono::{NaiveDate, NaiveTime};
use std::cell::Cell;
use teaplan::model::NewSchedule;
use teaplan::{
    AvailabilityRecord, AvailabilityRepository, Department, DepartmentFilter, DepartmentId,
    Employee, EmployeeId, GenerateScheduleParams, LeaveInterval, LeaveRepository, MemoryStore,
    RosterProvider, Schedule, ScheduleId, SchedulePersistence, SchedulePreferences,
    ScheduleShift, ScheduleStatus, ShiftDistribution, ShiftType,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn catalog() -> Vec<ShiftType> {
    vec![
        ShiftType::new("Morning", hm(6, 0), hm(14, 0)),
        ShiftType::new("Afternoon", hm(14, 0), hm(22, 0)),
        ShiftType::new("Night", hm(22, 0), hm(6, 0)),
    ]
}

pub fn employees(n: usize, department: &str) -> Vec<Employee> {
    (0..n)
        .map(|i| {
            Employee::new(
                format!("{department}-{i}"),
                format!("{department}.{i}@tea.example"),
                DepartmentId::new(department),
            )
        })
        .collect()
}

/// Store avec le catalogue standard, le département `rolling` et `n` employés.
pub fn store(n: usize) -> (MemoryStore, Vec<Employee>, Vec<ShiftType>) {
    let staff = employees(n, "rolling");
    let shift_types = catalog();
    let store = MemoryStore::new();
    store.with_db(|db| {
        db.departments
            .push(Department::new(DepartmentId::new("rolling"), "Rolling"));
        db.employees.extend(staff.iter().cloned());
        db.shift_types.extend(shift_types.iter().cloned());
    });
    (store, staff, shift_types)
}

pub fn params(
    department: &str,
    start: NaiveDate,
    end: NaiveDate,
    ratios: (f64, f64, f64),
) -> GenerateScheduleParams {
    GenerateScheduleParams {
        department: DepartmentFilter::parse(department),
        start_date: start,
        end_date: end,
        preferences: SchedulePreferences::default(),
        shift_distribution: ShiftDistribution {
            morning_ratio: ratios.0,
            afternoon_ratio: ratios.1,
            night_ratio: ratios.2,
        },
    }
}

pub fn shifts_of<'a>(shifts: &'a [ScheduleShift], employee: &EmployeeId) -> Vec<&'a ScheduleShift> {
    shifts.iter().filter(|s| &s.employee_id == employee).collect()
}

/// Enveloppe un `MemoryStore` et fait échouer les appels choisis.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_leave: bool,
    pub fail_insert_shifts: bool,
    pub fail_shifts_for: Cell<bool>,
    pub insert_shifts_calls: Cell<usize>,
}

impl RosterProvider for FlakyStore {
    fn employees(&self, filter: &DepartmentFilter) -> anyhow::Result<Vec<Employee>> {
        self.inner.employees(filter)
    }
    fn shift_types(&self) -> anyhow::Result<Vec<ShiftType>> {
        self.inner.shift_types()
    }
    fn department(&self, id: &DepartmentId) -> anyhow::Result<Option<Department>> {
        self.inner.department(id)
    }
}

impl AvailabilityRepository for FlakyStore {
    fn availability(&self, employee: &EmployeeId) -> anyhow::Result<Vec<AvailabilityRecord>> {
        self.inner.availability(employee)
    }
}

impl LeaveRepository for FlakyStore {
    fn approved_leave(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<LeaveInterval>> {
        if self.fail_leave {
            return Err(anyhow!("leave backend down"));
        }
        self.inner.approved_leave(start, end)
    }
}

impl SchedulePersistence for FlakyStore {
    fn insert_schedule(&self, header: NewSchedule) -> anyhow::Result<Schedule> {
        self.inner.insert_schedule(header)
    }
    fn insert_shifts(&self, shifts: &[ScheduleShift]) -> anyhow::Result<()> {
        self.insert_shifts_calls.set(self.insert_shifts_calls.get() + 1);
        if self.fail_insert_shifts {
            return Err(anyhow!("shift table locked"));
        }
        self.inner.insert_shifts(shifts)
    }
    fn schedule(&self, id: &ScheduleId) -> anyhow::Result<Option<Schedule>> {
        self.inner.schedule(id)
    }
    fn schedules(&self) -> anyhow::Result<Vec<Schedule>> {
        self.inner.schedules()
    }
    fn shifts_for(&self, id: &ScheduleId) -> anyhow::Result<Vec<ScheduleShift>> {
        if self.fail_shifts_for.get() {
            return Err(anyhow!("shifts read failed"));
        }
        self.inner.shifts_for(id)
    }
    fn update_status(&self, id: &ScheduleId, status: ScheduleStatus) -> anyhow::Result<Schedule> {
        self.inner.update_status(id, status)
    }
}
