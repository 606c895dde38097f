use crate::model::{
    Employee, EmployeeId, Schedule, ScheduleShift, ShiftCategory, ShiftType, ShiftTypeId,
};
use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Ligne de shift telle qu'affichée dans un mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftLine {
    pub date: NaiveDate,
    pub shift_type: String,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub employee_name: String,
}

/// Mail prêt à partir (un par destinataire et par type).
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub recipient: Employee,
    pub is_admin_summary: bool,
    pub shifts: Vec<ShiftLine>,
    pub subject: String,
    pub body: String,
}

/// Permet de customiser le rendu du message.
pub trait EmailRenderer {
    fn subject(&self, schedule: &Schedule, is_admin_summary: bool) -> String;
    fn render(
        &self,
        recipient: &Employee,
        schedule: &Schedule,
        shifts: &[ShiftLine],
        is_admin_summary: bool,
    ) -> String;
}

/// Gabarit texte simple.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextEmail;

impl EmailRenderer for TextEmail {
    fn subject(&self, schedule: &Schedule, is_admin_summary: bool) -> String {
        if is_admin_summary {
            format!("Récapitulatif planning approuvé : {}", schedule.name)
        } else {
            format!("Ton planning : {}", schedule.name)
        }
    }

    fn render(
        &self,
        recipient: &Employee,
        schedule: &Schedule,
        shifts: &[ShiftLine],
        is_admin_summary: bool,
    ) -> String {
        let mut out = format!(
            "Bonjour {name},\n\nLe planning \"{schedule}\" du {start} au {end} a été approuvé.\n",
            name = recipient.name,
            schedule = schedule.name,
            start = schedule.start_date,
            end = schedule.end_date,
        );
        if is_admin_summary {
            out.push_str(&format!("{} shift(s) au total :\n", shifts.len()));
        } else {
            out.push_str("Tes shifts :\n");
        }
        for line in shifts {
            let hours = match (line.start_time, line.end_time) {
                (Some(s), Some(e)) => format!(" {}-{}", s.format("%H:%M"), e.format("%H:%M")),
                _ => String::new(),
            };
            if is_admin_summary {
                out.push_str(&format!(
                    "- {} {}{} : {}\n",
                    line.date, line.shift_type, hours, line.employee_name
                ));
            } else {
                out.push_str(&format!("- {} {}{}\n", line.date, line.shift_type, hours));
            }
        }
        out
    }
}

/// Canal d'envoi (mail, relais HTTP, fichiers…).
pub trait NotificationDispatcher {
    fn send_schedule_email(&self, email: &OutgoingEmail) -> anyhow::Result<()>;
}

/// Écrit chaque mail dans un fichier texte du répertoire `dir`.
#[derive(Debug, Clone)]
pub struct OutboxDispatcher {
    dir: PathBuf,
}

impl OutboxDispatcher {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl NotificationDispatcher for OutboxDispatcher {
    fn send_schedule_email(&self, email: &OutgoingEmail) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating outbox {}", self.dir.display()))?;
        let suffix = if email.is_admin_summary { ".summary" } else { "" };
        let path = self
            .dir
            .join(format!("{}{suffix}.txt", email.recipient.email));
        let content = format!(
            "To: {}\nSubject: {}\n\n{}",
            email.recipient.email, email.subject, email.body
        );
        fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: Vec<String>,
}

/// Un mail par employé affecté (ses shifts) et un récapitulatif par admin.
pub fn prepare_emails(
    schedule: &Schedule,
    shifts: &[ScheduleShift],
    employees: &[Employee],
    shift_types: &[ShiftType],
    renderer: &dyn EmailRenderer,
) -> Vec<OutgoingEmail> {
    let people: HashMap<&EmployeeId, &Employee> = employees.iter().map(|e| (&e.id, e)).collect();
    let catalog: HashMap<&ShiftTypeId, &ShiftType> =
        shift_types.iter().map(|st| (&st.id, st)).collect();

    type SortKey = (Option<ShiftCategory>, Option<NaiveTime>);
    let mut all_lines: Vec<(ShiftLine, &EmployeeId, SortKey)> = shifts
        .iter()
        .map(|s| {
            let st = catalog.get(&s.shift_type_id);
            let line = ShiftLine {
                date: s.shift_date,
                shift_type: st.map_or_else(|| s.shift_type_id.to_string(), |st| st.name.clone()),
                start_time: st.map(|st| st.start_time),
                end_time: st.map(|st| st.end_time),
                employee_name: people
                    .get(&s.employee_id)
                    .map_or_else(|| s.employee_id.to_string(), |e| e.name.clone()),
            };
            let key = (st.and_then(|st| st.category()), st.map(|st| st.start_time));
            (line, &s.employee_id, key)
        })
        .collect();
    all_lines.sort_by(|a, b| {
        (a.0.date, a.2, &a.0.employee_name).cmp(&(b.0.date, b.2, &b.0.employee_name))
    });

    let mut per_employee: BTreeMap<&EmployeeId, Vec<ShiftLine>> = BTreeMap::new();
    for (line, employee, _) in &all_lines {
        per_employee.entry(*employee).or_default().push(line.clone());
    }

    let mut out = Vec::new();
    for (employee_id, lines) in per_employee {
        let Some(employee) = people.get(employee_id) else {
            debug!(employee = %employee_id, "assigned employee no longer in roster");
            continue;
        };
        out.push(build(renderer, employee, schedule, lines, false));
    }

    let summary: Vec<ShiftLine> = all_lines.into_iter().map(|(line, _, _)| line).collect();
    for admin in employees.iter().filter(|e| e.is_admin()) {
        out.push(build(renderer, admin, schedule, summary.clone(), true));
    }
    out
}

fn build(
    renderer: &dyn EmailRenderer,
    recipient: &Employee,
    schedule: &Schedule,
    shifts: Vec<ShiftLine>,
    is_admin_summary: bool,
) -> OutgoingEmail {
    OutgoingEmail {
        subject: renderer.subject(schedule, is_admin_summary),
        body: renderer.render(recipient, schedule, &shifts, is_admin_summary),
        recipient: recipient.clone(),
        is_admin_summary,
        shifts,
    }
}

/// Envoi best-effort : chaque échec est journalisé puis ignoré.
pub fn dispatch_all(
    dispatcher: &dyn NotificationDispatcher,
    emails: &[OutgoingEmail],
) -> DispatchReport {
    let mut report = DispatchReport::default();
    for email in emails {
        match dispatcher.send_schedule_email(email) {
            Ok(()) => report.sent += 1,
            Err(err) => {
                warn!(
                    recipient = %email.recipient.email,
                    admin_summary = email.is_admin_summary,
                    error = %err,
                    "schedule email failed"
                );
                report.failed.push(email.recipient.email.clone());
            }
        }
    }
    report
}
