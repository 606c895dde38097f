#![forbid(unsafe_code)]
//! Teaplan — génération automatique de plannings d'équipes pour l'usine de thé.
//!
//! - Affectation gloutonne jour par jour : Morning, Afternoon puis Night.
//! - Règles : congés approuvés, repos minimal, équité des week-ends.
//! - Planning créé `pending`, approuvé ou rejeté par un admin (notification à l'approbation).
//! - Stockage derrière des traits ; implémentations mémoire et JSON fournies.

pub mod config;
pub mod io;
pub mod model;
pub mod notification;
pub mod scheduler;
pub mod status;
pub mod storage;

pub use config::{GeneratorConfig, RestPolicy};
pub use model::{
    AvailabilityRecord, Department, DepartmentFilter, DepartmentId, Employee, EmployeeId,
    GenerateScheduleParams, LeaveInterval, LeaveStatus, Preference, Role, Schedule, ScheduleId,
    ScheduleShift, ScheduleStatus, SchedulePreferences, ShiftCategory, ShiftDistribution,
    ShiftType, ShiftTypeId,
};
pub use notification::{
    DispatchReport, EmailRenderer, NotificationDispatcher, OutboxDispatcher, OutgoingEmail,
    TextEmail,
};
pub use scheduler::{
    detect_conflicts, Conflict, ConflictKind, GenerationReport, SchedError, ScheduleGenerator,
    Shortfall,
};
pub use status::{review_schedule, Decision, Effect, ReviewOutcome, StatusError, Transition};
pub use storage::{
    AvailabilityRepository, Backend, Database, JsonStore, LeaveRepository, MemoryStore,
    RosterProvider, SchedulePersistence,
};
