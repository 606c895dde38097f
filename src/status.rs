use crate::model::{DepartmentFilter, ScheduleId, ScheduleStatus};
use crate::notification::{self, DispatchReport, EmailRenderer, NotificationDispatcher};
use crate::scheduler::SchedError;
use crate::storage::Backend;
use std::fmt;
use thiserror::Error;
use tracing::info;

/// Décision d'un admin sur un planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        })
    }
}

/// Effet de bord demandé par une transition, exécuté hors de la logique pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    NotifyAssignees,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ScheduleStatus,
    pub to: ScheduleStatus,
    pub effect: Effect,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("cannot {decision} a schedule that is {from}")]
    InvalidTransition {
        from: ScheduleStatus,
        decision: Decision,
    },
}

impl ScheduleStatus {
    /// `pending → approved` (notification) ou `pending → rejected`.
    pub fn apply(self, decision: Decision) -> Result<Transition, StatusError> {
        let (to, effect) = match (self, decision) {
            (ScheduleStatus::Pending, Decision::Approve) => {
                (ScheduleStatus::Approved, Effect::NotifyAssignees)
            }
            (ScheduleStatus::Pending, Decision::Reject) => (ScheduleStatus::Rejected, Effect::None),
            (from, decision) => return Err(StatusError::InvalidTransition { from, decision }),
        };
        Ok(Transition {
            from: self,
            to,
            effect,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub schedule: crate::model::Schedule,
    pub transition: Transition,
    /// `None` quand la transition ne notifie personne.
    pub dispatch: Option<DispatchReport>,
}

/// Applique une décision, persiste le statut puis notifie si besoin.
/// Les échecs d'envoi sont journalisés et comptés, le statut reste acquis.
pub fn review_schedule<B: Backend + ?Sized>(
    backend: &B,
    dispatcher: &dyn NotificationDispatcher,
    renderer: &dyn EmailRenderer,
    id: &ScheduleId,
    decision: Decision,
) -> Result<ReviewOutcome, SchedError> {
    let current = backend
        .schedule(id)?
        .ok_or_else(|| SchedError::UnknownSchedule(id.to_string()))?;
    let transition = current.status.apply(decision)?;

    // lectures avant écriture : un échec ici laisse le planning en `pending`
    let recipients = match transition.effect {
        Effect::None => None,
        Effect::NotifyAssignees => Some((
            backend.shifts_for(id)?,
            backend.employees(&DepartmentFilter::All)?,
            backend.shift_types()?,
        )),
    };

    let schedule = backend.update_status(id, transition.to)?;
    info!(schedule = %id, from = %transition.from, to = %transition.to, "schedule status changed");

    let dispatch = recipients.map(|(shifts, employees, shift_types)| {
        let emails =
            notification::prepare_emails(&schedule, &shifts, &employees, &shift_types, renderer);
        notification::dispatch_all(dispatcher, &emails)
    });

    Ok(ReviewOutcome {
        schedule,
        transition,
        dispatch,
    })
}
