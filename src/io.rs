use crate::model::{
    AvailabilityRecord, DepartmentId, Employee, LeaveInterval, LeaveStatus, Preference, Role,
    ScheduleId, ShiftCategory, ShiftType,
};
use crate::storage::Database;
use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::path::Path;

fn field<'a>(rec: &'a StringRecord, idx: usize, name: &str) -> anyhow::Result<&'a str> {
    let value = rec
        .get(idx)
        .with_context(|| format!("missing {name}"))?
        .trim();
    if value.is_empty() {
        bail!("empty {name}");
    }
    Ok(value)
}

fn optional(rec: &StringRecord, idx: usize) -> Option<&str> {
    rec.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_time(raw: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .with_context(|| format!("invalid time: {raw}"))
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

/// Import d'employés : header `name,email,department_id[,role]`
pub fn import_employees_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Employee>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = field(&rec, 0, "name")?;
        let email = field(&rec, 1, "email")?;
        let department = field(&rec, 2, "department_id")?;
        let mut employee = Employee::new(name, email, DepartmentId::new(department));
        if let Some(role) = optional(&rec, 3) {
            employee.role = match role.to_ascii_lowercase().as_str() {
                "admin" => Role::Admin,
                "employee" => Role::Employee,
                other => bail!("invalid role {other} for {email}"),
            };
        }
        out.push(employee);
    }
    Ok(out)
}

/// Import du catalogue : header `name,start_time,end_time[,color][,category]` (HH:MM)
pub fn import_shift_types_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ShiftType>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = field(&rec, 0, "name")?;
        let start = parse_time(field(&rec, 1, "start_time")?)?;
        let end = parse_time(field(&rec, 2, "end_time")?)?;
        let mut shift_type = ShiftType::new(name, start, end);
        shift_type.color = optional(&rec, 3).map(str::to_string);
        if let Some(raw) = optional(&rec, 4) {
            let category = match raw.to_ascii_lowercase().as_str() {
                "morning" => ShiftCategory::Morning,
                "afternoon" => ShiftCategory::Afternoon,
                "night" => ShiftCategory::Night,
                other => bail!("invalid category {other} for shift type {name}"),
            };
            shift_type.category = Some(category);
        }
        out.push(shift_type);
    }
    Ok(out)
}

/// Import de disponibilités : header `email,day_of_week,shift_type[,preference]`.
/// `shift_type` vide = toute la journée ; `day_of_week` : 0 = dimanche.
pub fn import_availability_csv<P: AsRef<Path>>(
    path: P,
    db: &Database,
) -> anyhow::Result<Vec<AvailabilityRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let email = field(&rec, 0, "email")?;
        let employee = db
            .find_employee_by_email(email)
            .with_context(|| format!("unknown employee: {email}"))?;
        let day_of_week: u8 = field(&rec, 1, "day_of_week")?
            .parse()
            .with_context(|| format!("invalid day_of_week for {email}"))?;
        if day_of_week > 6 {
            bail!("day_of_week must be within 0..=6 for {email}");
        }
        let shift_type_id = match optional(&rec, 2) {
            Some(name) => Some(
                db.find_shift_type_by_name(name)
                    .with_context(|| format!("unknown shift type: {name}"))?
                    .id
                    .clone(),
            ),
            None => None,
        };
        let preference = match optional(&rec, 3) {
            Some(raw) => Preference::parse(raw)
                .with_context(|| format!("invalid preference {raw} for {email}"))?,
            None => Preference::Available,
        };
        out.push(AvailabilityRecord {
            employee_id: employee.id.clone(),
            day_of_week,
            shift_type_id,
            preference,
        });
    }
    Ok(out)
}

/// Import de congés : header `email,start_date,end_date[,status]` (statut par défaut `approved`)
pub fn import_leave_csv<P: AsRef<Path>>(
    path: P,
    db: &Database,
) -> anyhow::Result<Vec<LeaveInterval>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let email = field(&rec, 0, "email")?;
        let employee = db
            .find_employee_by_email(email)
            .with_context(|| format!("unknown employee: {email}"))?;
        let start = parse_date(field(&rec, 1, "start_date")?)?;
        let end = parse_date(field(&rec, 2, "end_date")?)?;
        let status = match optional(&rec, 3).map(str::to_ascii_lowercase).as_deref() {
            None | Some("approved") => LeaveStatus::Approved,
            Some("pending") => LeaveStatus::Pending,
            Some("rejected") => LeaveStatus::Rejected,
            Some(other) => bail!("invalid leave status {other} for {email}"),
        };
        let interval = LeaveInterval::new(employee.id.clone(), start, end, status)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid leave for {email}"))?;
        out.push(interval);
    }
    Ok(out)
}

/// Export CSV d'un planning : header `shift_date,shift_type,employee_email,employee_name`
pub fn export_shifts_csv<P: AsRef<Path>>(
    path: P,
    db: &Database,
    schedule: &ScheduleId,
) -> anyhow::Result<usize> {
    let mut shifts: Vec<_> = db
        .shifts
        .iter()
        .filter(|s| &s.schedule_id == schedule)
        .collect();
    shifts.sort_by_key(|s| s.shift_date);

    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["shift_date", "shift_type", "employee_email", "employee_name"])?;
    for s in &shifts {
        let shift_type = db
            .shift_types
            .iter()
            .find(|st| st.id == s.shift_type_id)
            .map_or(s.shift_type_id.as_str(), |st| st.name.as_str());
        let (email, name) = db
            .employees
            .iter()
            .find(|e| e.id == s.employee_id)
            .map_or(("", ""), |e| (e.email.as_str(), e.name.as_str()));
        let date = s.shift_date.to_string();
        w.write_record([date.as_str(), shift_type, email, name])?;
    }
    w.flush()?;
    Ok(shifts.len())
}
