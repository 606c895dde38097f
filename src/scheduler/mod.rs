mod assembly;
mod conflicts;
mod eligibility;
mod ranking;
mod types;
mod util;

pub use types::{GenerationReport, SchedError, Shortfall, WeekendCounter};
pub use util::required_headcount;

use crate::config::GeneratorConfig;
use crate::model::{
    EmployeeId, GenerateScheduleParams, Schedule, ScheduleShift, ScheduleShiftId, ShiftType,
};
use crate::storage::Backend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// deux shifts le même jour (non filtré par le générateur)
    SameDay,
    RestViolation,
}

#[derive(Debug, Clone)]
pub struct Conflict {
    pub employee: EmployeeId,
    pub shift_a: ScheduleShiftId,
    pub shift_b: ScheduleShiftId,
    pub kind: ConflictKind,
}

/// Générateur de planning : encapsule le backend et la configuration.
pub struct ScheduleGenerator<'a, B: Backend + ?Sized> {
    backend: &'a B,
    config: GeneratorConfig,
}

impl<'a, B: Backend + ?Sized> ScheduleGenerator<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            config: GeneratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Génère et persiste un planning `pending`, renvoie son en-tête.
    pub fn generate(&self, params: &GenerateScheduleParams) -> Result<Schedule, SchedError> {
        self.generate_with_report(params).map(|report| report.schedule)
    }

    /// Comme `generate`, avec les brouillons écrits et les créneaux sous-staffés.
    pub fn generate_with_report(
        &self,
        params: &GenerateScheduleParams,
    ) -> Result<GenerationReport, SchedError> {
        assembly::generate(self.backend, self.config, params)
    }
}

/// Audit d'un planning : doubles affectations le même jour et repos insuffisant.
pub fn detect_conflicts(
    shifts: &[ScheduleShift],
    shift_types: &[ShiftType],
    config: GeneratorConfig,
) -> Vec<Conflict> {
    conflicts::detect_conflicts(shifts, shift_types, config)
}
