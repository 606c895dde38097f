use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort pour Employee
    EmployeeId
);
string_id!(
    /// Identifiant fort pour Department
    DepartmentId
);
string_id!(
    /// Identifiant fort pour ShiftType
    ShiftTypeId
);
string_id!(
    /// Identifiant fort pour Schedule
    ScheduleId
);
string_id!(ScheduleShiftId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

impl Department {
    pub fn new<N: Into<String>>(id: DepartmentId, name: N) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Rôle applicatif : les admins reçoivent le récapitulatif à l'approbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Employee,
    Admin,
}

/// Employé de l'usine (lecture seule pour le générateur)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
    pub department_id: DepartmentId,
    #[serde(default)]
    pub role: Role,
}

impl Employee {
    pub fn new<N: Into<String>, E: Into<String>>(
        name: N,
        email: E,
        department_id: DepartmentId,
    ) -> Self {
        Self {
            id: EmployeeId::random(),
            name: name.into(),
            email: email.into(),
            department_id,
            role: Role::Employee,
        }
    }

    pub fn admin(mut self) -> Self {
        self.role = Role::Admin;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Catégorie stable d'un type de shift, dans l'ordre d'itération du générateur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftCategory {
    Morning,
    Afternoon,
    Night,
}

impl ShiftCategory {
    pub const ORDER: [ShiftCategory; 3] = [
        ShiftCategory::Morning,
        ShiftCategory::Afternoon,
        ShiftCategory::Night,
    ];

    /// Correspondance exacte avec les noms historiques du catalogue.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Morning" => Some(Self::Morning),
            "Afternoon" => Some(Self::Afternoon),
            "Night" => Some(Self::Night),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Night => "Night",
        }
    }
}

impl fmt::Display for ShiftCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type de shift du catalogue. `end_time <= start_time` : fin le lendemain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftType {
    pub id: ShiftTypeId,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ShiftCategory>,
}

impl ShiftType {
    pub fn new<N: Into<String>>(name: N, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id: ShiftTypeId::random(),
            name: name.into(),
            start_time,
            end_time,
            color: None,
            category: None,
        }
    }

    pub fn with_category(mut self, category: ShiftCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Catégorie explicite, sinon déduite du nom exact.
    pub fn category(&self) -> Option<ShiftCategory> {
        self.category.or_else(|| ShiftCategory::from_name(&self.name))
    }

    /// Bornes UTC du shift pour une date donnée.
    pub fn window_on(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = date.and_time(self.start_time).and_utc();
        let mut end = date.and_time(self.end_time).and_utc();
        if self.end_time <= self.start_time {
            end += chrono::Duration::days(1);
        }
        (start, end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Preferred,
    #[default]
    Available,
    Unavailable,
}

impl Preference {
    /// Plus petit = mieux classé.
    pub fn rank(self) -> u8 {
        match self {
            Self::Preferred => 0,
            Self::Available => 1,
            Self::Unavailable => 2,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "preferred" => Some(Self::Preferred),
            "available" | "" => Some(Self::Available),
            "unavailable" => Some(Self::Unavailable),
            _ => None,
        }
    }
}

/// Préférence déclarée pour (jour de semaine, type de shift).
/// `day_of_week` : 0 = dimanche … 6 = samedi. `shift_type_id = None` couvre la journée.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub employee_id: EmployeeId,
    pub day_of_week: u8,
    #[serde(default)]
    pub shift_type_id: Option<ShiftTypeId>,
    pub preference: Preference,
}

pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Index mémoire des disponibilités, construit une fois par génération.
#[derive(Debug, Default, Clone)]
pub struct AvailabilityLookup {
    by_shift: HashMap<(EmployeeId, u8, ShiftTypeId), Preference>,
    by_day: HashMap<(EmployeeId, u8), Preference>,
}

impl AvailabilityLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: &AvailabilityRecord) {
        match &record.shift_type_id {
            Some(st) => {
                self.by_shift.insert(
                    (record.employee_id.clone(), record.day_of_week, st.clone()),
                    record.preference,
                );
            }
            None => {
                self.by_day.insert(
                    (record.employee_id.clone(), record.day_of_week),
                    record.preference,
                );
            }
        }
    }

    pub fn preference(
        &self,
        employee: &EmployeeId,
        dow: u8,
        shift_type: &ShiftTypeId,
    ) -> Preference {
        let key = (employee.clone(), dow, shift_type.clone());
        if let Some(p) = self.by_shift.get(&key) {
            return *p;
        }
        self.by_day
            .get(&(key.0, dow))
            .copied()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    #[default]
    Approved,
    Rejected,
}

/// Congé d'un employé (dates incluses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveInterval {
    pub employee_id: EmployeeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: LeaveStatus,
}

impl LeaveInterval {
    pub fn new(
        employee_id: EmployeeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: LeaveStatus,
    ) -> Result<Self, String> {
        if end_date < start_date {
            return Err("leave end_date must not be before start_date".to_string());
        }
        Ok(Self {
            employee_id,
            start_date,
            end_date,
            status,
        })
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }
}

/// Ligne de planning (brouillon pendant la génération, puis persistée).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleShift {
    pub id: ScheduleShiftId,
    pub schedule_id: ScheduleId,
    pub employee_id: EmployeeId,
    pub shift_type_id: ShiftTypeId,
    pub shift_date: NaiveDate,
}

impl ScheduleShift {
    pub fn draft(
        schedule_id: ScheduleId,
        employee_id: EmployeeId,
        shift_type_id: ShiftTypeId,
        shift_date: NaiveDate,
    ) -> Self {
        Self {
            id: ScheduleShiftId::random(),
            schedule_id,
            employee_id,
            shift_type_id,
            shift_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        })
    }
}

/// En-tête de planning persisté
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub name: String,
    /// `None` = tous les départements
    pub department_id: Option<DepartmentId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ScheduleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// En-tête avant insertion : le stockage attribue id, statut et horodatages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchedule {
    pub name: String,
    pub department_id: Option<DepartmentId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewSchedule {
    pub fn into_schedule(self, now: DateTime<Utc>) -> Schedule {
        Schedule {
            id: ScheduleId::random(),
            name: self.name,
            department_id: self.department_id,
            start_date: self.start_date,
            end_date: self.end_date,
            status: ScheduleStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filtre de département : chaîne `"all"` ou identifiant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DepartmentFilter {
    All,
    Only(DepartmentId),
}

impl DepartmentFilter {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(DepartmentId::new(raw))
        }
    }

    pub fn department_id(&self) -> Option<&DepartmentId> {
        match self {
            Self::All => None,
            Self::Only(id) => Some(id),
        }
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        match self {
            Self::All => true,
            Self::Only(id) => &employee.department_id == id,
        }
    }
}

impl From<String> for DepartmentFilter {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<DepartmentFilter> for String {
    fn from(filter: DepartmentFilter) -> Self {
        match filter {
            DepartmentFilter::All => "all".to_string(),
            DepartmentFilter::Only(id) => id.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulePreferences {
    pub balance_weekends: bool,
    pub consider_employee_requests: bool,
    pub optimize_for_efficiency: bool,
}

/// Ratios (0–100) appliqués indépendamment à l'effectif complet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDistribution {
    pub morning_ratio: f64,
    pub afternoon_ratio: f64,
    pub night_ratio: f64,
}

impl ShiftDistribution {
    pub fn ratio(&self, category: ShiftCategory) -> f64 {
        match category {
            ShiftCategory::Morning => self.morning_ratio,
            ShiftCategory::Afternoon => self.afternoon_ratio,
            ShiftCategory::Night => self.night_ratio,
        }
    }
}

/// Paramètres d'une génération de planning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateScheduleParams {
    pub department: DepartmentFilter,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub preferences: SchedulePreferences,
    pub shift_distribution: ShiftDistribution,
}
