use crate::model::{
    AvailabilityRecord, Department, DepartmentFilter, DepartmentId, Employee, EmployeeId,
    LeaveInterval, LeaveStatus, NewSchedule, Schedule, ScheduleId, ScheduleShift,
    ScheduleStatus, ShiftType,
};
use anyhow::{anyhow, Context};
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait RosterProvider {
    /// Employés du département (ou de tous les départements).
    fn employees(&self, filter: &DepartmentFilter) -> anyhow::Result<Vec<Employee>>;
    fn shift_types(&self) -> anyhow::Result<Vec<ShiftType>>;
    fn department(&self, id: &DepartmentId) -> anyhow::Result<Option<Department>>;
}

pub trait AvailabilityRepository {
    fn availability(&self, employee: &EmployeeId) -> anyhow::Result<Vec<AvailabilityRecord>>;
}

pub trait LeaveRepository {
    /// Congés approuvés chevauchant `[start, end]`.
    fn approved_leave(&self, start: NaiveDate, end: NaiveDate)
        -> anyhow::Result<Vec<LeaveInterval>>;
}

pub trait SchedulePersistence {
    fn insert_schedule(&self, header: NewSchedule) -> anyhow::Result<Schedule>;
    /// Insertion groupée, en un seul appel.
    fn insert_shifts(&self, shifts: &[ScheduleShift]) -> anyhow::Result<()>;
    fn schedule(&self, id: &ScheduleId) -> anyhow::Result<Option<Schedule>>;
    fn schedules(&self) -> anyhow::Result<Vec<Schedule>>;
    fn shifts_for(&self, id: &ScheduleId) -> anyhow::Result<Vec<ScheduleShift>>;
    fn update_status(&self, id: &ScheduleId, status: ScheduleStatus) -> anyhow::Result<Schedule>;
}

/// Tout ce dont le générateur et l'approbation ont besoin.
pub trait Backend:
    RosterProvider + AvailabilityRepository + LeaveRepository + SchedulePersistence
{
}

impl<T> Backend for T where
    T: RosterProvider + AvailabilityRepository + LeaveRepository + SchedulePersistence + ?Sized
{
}

/// Contenu complet de la base (sérialisé tel quel par `JsonStore`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub shift_types: Vec<ShiftType>,
    #[serde(default)]
    pub availability: Vec<AvailabilityRecord>,
    #[serde(default)]
    pub leave: Vec<LeaveInterval>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub shifts: Vec<ScheduleShift>,
}

impl Database {
    pub fn find_employee_by_email<'a>(&'a self, email: &str) -> Option<&'a Employee> {
        self.employees
            .iter()
            .find(|e| e.email.eq_ignore_ascii_case(email))
    }
    pub fn find_shift_type_by_name<'a>(&'a self, name: &str) -> Option<&'a ShiftType> {
        self.shift_types.iter().find(|st| st.name == name)
    }
}

/// Stockage mémoire, utilisé par les tests et comme copie de travail du `JsonStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    db: Mutex<Database>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_database(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    pub fn snapshot(&self) -> Database {
        self.db.lock().clone()
    }

    pub fn with_db<R>(&self, f: impl FnOnce(&mut Database) -> R) -> R {
        let mut db = self.db.lock();
        f(&mut db)
    }
}

impl RosterProvider for MemoryStore {
    fn employees(&self, filter: &DepartmentFilter) -> anyhow::Result<Vec<Employee>> {
        let db = self.db.lock();
        Ok(db.employees.iter().filter(|e| filter.matches(e)).cloned().collect())
    }

    fn shift_types(&self) -> anyhow::Result<Vec<ShiftType>> {
        Ok(self.db.lock().shift_types.clone())
    }

    fn department(&self, id: &DepartmentId) -> anyhow::Result<Option<Department>> {
        let db = self.db.lock();
        Ok(db.departments.iter().find(|d| &d.id == id).cloned())
    }
}

impl AvailabilityRepository for MemoryStore {
    fn availability(&self, employee: &EmployeeId) -> anyhow::Result<Vec<AvailabilityRecord>> {
        let db = self.db.lock();
        Ok(db
            .availability
            .iter()
            .filter(|a| &a.employee_id == employee)
            .cloned()
            .collect())
    }
}

impl LeaveRepository for MemoryStore {
    fn approved_leave(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<LeaveInterval>> {
        let db = self.db.lock();
        Ok(db
            .leave
            .iter()
            .filter(|l| l.status == LeaveStatus::Approved && l.overlaps(start, end))
            .cloned()
            .collect())
    }
}

impl SchedulePersistence for MemoryStore {
    fn insert_schedule(&self, header: NewSchedule) -> anyhow::Result<Schedule> {
        let schedule = header.into_schedule(Utc::now());
        self.db.lock().schedules.push(schedule.clone());
        Ok(schedule)
    }

    fn insert_shifts(&self, shifts: &[ScheduleShift]) -> anyhow::Result<()> {
        self.db.lock().shifts.extend_from_slice(shifts);
        Ok(())
    }

    fn schedule(&self, id: &ScheduleId) -> anyhow::Result<Option<Schedule>> {
        let db = self.db.lock();
        Ok(db.schedules.iter().find(|s| &s.id == id).cloned())
    }

    fn schedules(&self) -> anyhow::Result<Vec<Schedule>> {
        Ok(self.db.lock().schedules.clone())
    }

    fn shifts_for(&self, id: &ScheduleId) -> anyhow::Result<Vec<ScheduleShift>> {
        let db = self.db.lock();
        Ok(db
            .shifts
            .iter()
            .filter(|s| &s.schedule_id == id)
            .cloned()
            .collect())
    }

    fn update_status(&self, id: &ScheduleId, status: ScheduleStatus) -> anyhow::Result<Schedule> {
        let mut db = self.db.lock();
        let schedule = db
            .schedules
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| anyhow!("unknown schedule: {id}"))?;
        schedule.status = status;
        schedule.updated_at = Utc::now();
        Ok(schedule.clone())
    }
}

/// Base JSON sur disque : chargée à l'ouverture, sauvegardée atomiquement à chaque écriture.
pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    /// Ouvre la base ; un fichier absent donne une base vide.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let db = if path.exists() {
            let data = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_slice(&data)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            Database::default()
        };
        Ok(Self {
            path,
            inner: MemoryStore::from_database(db),
        })
    }

    pub fn snapshot(&self) -> Database {
        self.inner.snapshot()
    }

    /// Modifie la base puis la sauvegarde.
    pub fn update<R>(&self, f: impl FnOnce(&mut Database) -> R) -> anyhow::Result<R> {
        let out = self.inner.with_db(f);
        self.save()?;
        Ok(out)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(&self.inner.snapshot())?;
        let mut tmp = NamedTempFile::new_in(
            self.path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new(".")),
        )
        .with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}

impl RosterProvider for JsonStore {
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

impl AvailabilityRepository for JsonStore {
    fn availability(&self, employee: &EmployeeId) -> anyhow::Result<Vec<AvailabilityRecord>> {
        self.inner.availability(employee)
    }
}

impl LeaveRepository for JsonStore {
    fn approved_leave(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<LeaveInterval>> {
        self.inner.approved_leave(start, end)
    }
}

impl SchedulePersistence for JsonStore {
    fn insert_schedule(&self, header: NewSchedule) -> anyhow::Result<Schedule> {
        let schedule = self.inner.insert_schedule(header)?;
        self.save()?;
        Ok(schedule)
    }

    fn insert_shifts(&self, shifts: &[ScheduleShift]) -> anyhow::Result<()> {
        self.inner.insert_shifts(shifts)?;
        self.save()
    }

    fn schedule(&self, id: &ScheduleId) -> anyhow::Result<Option<Schedule>> {
        self.inner.schedule(id)
    }

    fn schedules(&self) -> anyhow::Result<Vec<Schedule>> {
        self.inner.schedules()
    }

    fn shifts_for(&self, id: &ScheduleId) -> anyhow::Result<Vec<ScheduleShift>> {
        self.inner.shifts_for(id)
    }

    fn update_status(&self, id: &ScheduleId, status: ScheduleStatus) -> anyhow::Result<Schedule> {
        let schedule = self.inner.update_status(id, status)?;
        self.save()?;
        Ok(schedule)
    }
}
