use crate::model::{Employee, EmployeeId, Schedule, ScheduleShift, ShiftCategory};
use crate::status::StatusError;
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid date range: end_date must not be before start_date")]
    InvalidDateRange,
    #[error("invalid shift distribution: {0}")]
    InvalidDistribution(&'static str),
    #[error("unknown schedule: {0}")]
    UnknownSchedule(String),
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

/// Compteur de shifts week-end, local à une génération.
#[derive(Debug, Clone, Default)]
pub struct WeekendCounter {
    counts: HashMap<EmployeeId, u32>,
}

impl WeekendCounter {
    /// Tous les employés du roster démarrent à 0.
    pub fn new(employees: &[Employee]) -> Self {
        Self {
            counts: employees.iter().map(|e| (e.id.clone(), 0)).collect(),
        }
    }

    pub fn count(&self, employee: &EmployeeId) -> u32 {
        self.counts.get(employee).copied().unwrap_or(0)
    }

    pub fn average(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        let total: u32 = self.counts.values().sum();
        f64::from(total) / self.counts.len() as f64
    }

    pub fn increment(&mut self, employee: &EmployeeId) {
        *self.counts.entry(employee.clone()).or_insert(0) += 1;
    }

    pub fn into_counts(self) -> HashMap<EmployeeId, u32> {
        self.counts
    }
}

/// État mutable d'un run : compteurs week-end et brouillons accumulés.
#[derive(Debug, Default)]
pub(crate) struct RunState {
    pub(crate) weekend: WeekendCounter,
    pub(crate) drafts: Vec<ScheduleShift>,
}

impl RunState {
    pub(crate) fn new(employees: &[Employee]) -> Self {
        Self {
            weekend: WeekendCounter::new(employees),
            drafts: Vec::new(),
        }
    }

    pub(crate) fn assignments_of<'a>(
        &'a self,
        employee: &'a EmployeeId,
    ) -> impl Iterator<Item = &'a ScheduleShift> + 'a {
        self.drafts.iter().filter(move |s| &s.employee_id == employee)
    }
}

/// Créneau sous-staffé faute de candidats éligibles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub date: NaiveDate,
    pub category: ShiftCategory,
    pub required: usize,
    pub assigned: usize,
}

/// Résultat détaillé d'une génération.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub schedule: Schedule,
    pub shifts: Vec<ScheduleShift>,
    pub headcounts: Vec<(ShiftCategory, usize)>,
    pub shortfalls: Vec<Shortfall>,
    pub weekend_counts: HashMap<EmployeeId, u32>,
}

impl GenerationReport {
    pub fn headcount(&self, category: ShiftCategory) -> Option<usize> {
        self.headcounts
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, n)| *n)
    }
}
