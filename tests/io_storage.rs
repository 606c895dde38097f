#![forbid(unsafe_code)]
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use teaplan::model::NewSchedule;
use teaplan::{
    io, Database, JsonStore, LeaveRepository, LeaveStatus, Preference, Role, SchedulePersistence,
    ShiftCategory,
};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn seeded(dir: &Path) -> Database {
    let employees = write(
        dir,
        "employees.csv",
        "name,email,department_id,role\nAsha,asha@tea.example,rolling\nMeera,meera@tea.example,office,admin\n",
    );
    let shift_types = write(
        dir,
        "shift_types.csv",
        "name,start_time,end_time,color,category\nMorning,06:00,14:00,#ffd700\nLate,22:00,06:00,,night\n",
    );
    Database {
        employees: io::import_employees_csv(employees).unwrap(),
        shift_types: io::import_shift_types_csv(shift_types).unwrap(),
        ..Database::default()
    }
}

#[test]
fn import_employees_and_catalog() {
    let dir = tempdir().unwrap();
    let db = seeded(dir.path());

    assert_eq!(db.employees.len(), 2);
    assert_eq!(db.employees[0].role, Role::Employee);
    assert_eq!(db.employees[1].role, Role::Admin);
    assert_eq!(db.employees[1].department_id.as_str(), "office");

    assert_eq!(db.shift_types[0].category(), Some(ShiftCategory::Morning));
    assert_eq!(db.shift_types[0].color.as_deref(), Some("#ffd700"));
    assert_eq!(db.shift_types[1].category(), Some(ShiftCategory::Night));
    assert!(db.shift_types[1].color.is_none());
}

#[test]
fn import_availability_and_leave_resolve_references() {
    let dir = tempdir().unwrap();
    let db = seeded(dir.path());

    let availability = write(
        dir.path(),
        "availability.csv",
        "email,day_of_week,shift_type,preference\nasha@tea.example,1,Morning,preferred\nasha@tea.example,6,,unavailable\n",
    );
    let records = io::import_availability_csv(availability, &db).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].shift_type_id.as_ref(), Some(&db.shift_types[0].id));
    assert_eq!(records[0].preference, Preference::Preferred);
    assert!(records[1].shift_type_id.is_none());

    let leave = write(
        dir.path(),
        "leave.csv",
        "email,start_date,end_date,status\nasha@tea.example,2025-01-06,2025-01-08\nmeera@tea.example,2025-02-01,2025-02-03,pending\n",
    );
    let intervals = io::import_leave_csv(leave, &db).unwrap();
    assert_eq!(intervals[0].status, LeaveStatus::Approved);
    assert_eq!(intervals[1].status, LeaveStatus::Pending);

    let unknown = write(
        dir.path(),
        "bad.csv",
        "email,day_of_week,shift_type\nnobody@tea.example,1,Morning\n",
    );
    let err = io::import_availability_csv(unknown, &db).unwrap_err();
    assert!(err.to_string().contains("unknown employee"));

    let bad_day = write(
        dir.path(),
        "bad_day.csv",
        "email,day_of_week,shift_type\nasha@tea.example,7,Morning\n",
    );
    assert!(io::import_availability_csv(bad_day, &db).is_err());
}

#[test]
fn json_store_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("teaplan.json");
    let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();

    let store = JsonStore::open(&path).unwrap();
    assert!(store.schedules().unwrap().is_empty());

    let leave_csv = write(
        dir.path(),
        "leave.csv",
        "email,start_date,end_date\nasha@tea.example,2025-01-06,2025-01-08\n",
    );
    let seeded = seeded(dir.path());
    let leave = io::import_leave_csv(leave_csv, &seeded).unwrap();
    store
        .update(|db| {
            *db = seeded;
            db.leave.extend(leave);
        })
        .unwrap();
    let schedule = store
        .insert_schedule(NewSchedule {
            name: "Rolling Schedule (2025-01-06-2025-01-12)".into(),
            department_id: None,
            start_date: d(6),
            end_date: d(12),
        })
        .unwrap();

    let reopened = JsonStore::open(&path).unwrap();
    let loaded = reopened.schedule(&schedule.id).unwrap().unwrap();
    assert_eq!(loaded.name, schedule.name);
    assert_eq!(reopened.approved_leave(d(1), d(6)).unwrap().len(), 1);
    assert!(reopened.approved_leave(d(9), d(12)).unwrap().is_empty());
}

#[test]
fn export_shifts_csv_writes_one_row_per_shift() {
    let dir = tempdir().unwrap();
    let mut db = seeded(dir.path());
    let schedule = NewSchedule {
        name: "All Departments Schedule (2025-01-06-2025-01-06)".into(),
        department_id: None,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
    }
    .into_schedule(chrono::Utc::now());
    db.shifts.push(teaplan::ScheduleShift::draft(
        schedule.id.clone(),
        db.employees[0].id.clone(),
        db.shift_types[0].id.clone(),
        schedule.start_date,
    ));
    db.schedules.push(schedule.clone());

    let out = dir.path().join("shifts.csv");
    let n = io::export_shifts_csv(&out, &db, &schedule.id).unwrap();
    assert_eq!(n, 1);
    let content = fs::read_to_string(out).unwrap();
    assert_eq!(
        content,
        "shift_date,shift_type,employee_email,employee_name\n2025-01-06,Morning,asha@tea.example,Asha\n"
    );
}
