#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use teaplan::{
    detect_conflicts, io, review_schedule, ConflictKind, Decision, Department, DepartmentFilter,
    DepartmentId, GenerateScheduleParams, GeneratorConfig, JsonStore, OutboxDispatcher,
    ScheduleGenerator, ScheduleId, SchedulePersistence, SchedulePreferences, ShiftDistribution,
    TextEmail,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération de plannings (base JSON locale)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de la base
    #[arg(long, global = true, default_value = "teaplan.json")]
    db: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Déclarer un département
    AddDepartment {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
    },

    /// Importer des employés depuis un CSV
    ImportEmployees {
        #[arg(long)]
        csv: String,
    },

    /// Importer le catalogue des types de shift
    ImportShiftTypes {
        #[arg(long)]
        csv: String,
    },

    /// Importer les disponibilités (employés et catalogue déjà importés)
    ImportAvailability {
        #[arg(long)]
        csv: String,
    },

    /// Importer des congés
    ImportLeave {
        #[arg(long)]
        csv: String,
    },

    /// Générer un planning `pending`
    Generate {
        /// identifiant de département, ou "all"
        #[arg(long, default_value = "all")]
        department: String,
        /// YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,
        /// YYYY-MM-DD (inclus)
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value_t = 40.0)]
        morning: f64,
        #[arg(long, default_value_t = 40.0)]
        afternoon: f64,
        #[arg(long, default_value_t = 20.0)]
        night: f64,
        #[arg(long)]
        balance_weekends: bool,
        #[arg(long)]
        consider_requests: bool,
        #[arg(long)]
        optimize_efficiency: bool,
        /// Configuration JSON du générateur
        #[arg(long)]
        config: Option<String>,
        #[arg(long)]
        min_rest_hours: Option<u32>,
        /// calendar-date | shift-times
        #[arg(long)]
        rest_policy: Option<String>,
        /// Applique les drapeaux de préférences aux règles
        #[arg(long)]
        honor_flags: bool,
    },

    /// Lister les plannings
    List,

    /// Afficher (et exporter) les shifts d'un planning
    Shifts {
        #[arg(long)]
        schedule: String,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier les conflits d'un planning
    Check {
        #[arg(long)]
        schedule: String,
        #[arg(long, default_value_t = 12)]
        min_rest_hours: u32,
    },

    /// Approuver un planning et notifier les employés
    Approve {
        #[arg(long)]
        schedule: String,
        /// Répertoire où écrire les mails
        #[arg(long, default_value = "outbox")]
        outbox: String,
    },

    /// Rejeter un planning
    Reject {
        #[arg(long)]
        schedule: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let store = JsonStore::open(&cli.db)?;

    let code = match cli.cmd {
        Commands::AddDepartment { id, name } => {
            let department = Department::new(DepartmentId::new(id), name);
            store.update(|db| {
                db.departments.retain(|d| d.id != department.id);
                db.departments.push(department);
            })?;
            0
        }
        Commands::ImportEmployees { csv } => {
            let employees = io::import_employees_csv(csv)?;
            let n = employees.len();
            store.update(|db| db.employees.extend(employees))?;
            println!("{n} employee(s) imported");
            0
        }
        Commands::ImportShiftTypes { csv } => {
            let shift_types = io::import_shift_types_csv(csv)?;
            let n = shift_types.len();
            store.update(|db| db.shift_types.extend(shift_types))?;
            println!("{n} shift type(s) imported");
            0
        }
        Commands::ImportAvailability { csv } => {
            let records = io::import_availability_csv(csv, &store.snapshot())?;
            let n = records.len();
            store.update(|db| db.availability.extend(records))?;
            println!("{n} availability record(s) imported");
            0
        }
        Commands::ImportLeave { csv } => {
            let leave = io::import_leave_csv(csv, &store.snapshot())?;
            let n = leave.len();
            store.update(|db| db.leave.extend(leave))?;
            println!("{n} leave interval(s) imported");
            0
        }
        Commands::Generate {
            department,
            start,
            end,
            morning,
            afternoon,
            night,
            balance_weekends,
            consider_requests,
            optimize_efficiency,
            config,
            min_rest_hours,
            rest_policy,
            honor_flags,
        } => {
            let mut cfg = match config {
                Some(path) => GeneratorConfig::from_path(path)?,
                None => GeneratorConfig::default(),
            };
            if let Some(hours) = min_rest_hours {
                cfg.min_rest_hours = hours;
            }
            if let Some(policy) = rest_policy {
                cfg.rest_policy = policy.parse()?;
            }
            if honor_flags {
                cfg.honor_preference_flags = true;
            }

            let params = GenerateScheduleParams {
                department: DepartmentFilter::parse(&department),
                start_date: start,
                end_date: end,
                preferences: SchedulePreferences {
                    balance_weekends,
                    consider_employee_requests: consider_requests,
                    optimize_for_efficiency: optimize_efficiency,
                },
                shift_distribution: ShiftDistribution {
                    morning_ratio: morning,
                    afternoon_ratio: afternoon,
                    night_ratio: night,
                },
            };
            let report = ScheduleGenerator::new(&store)
                .with_config(cfg)
                .generate_with_report(&params)?;
            for s in &report.shortfalls {
                eprintln!(
                    "under-staffed: {} {} ({}/{})",
                    s.date, s.category, s.assigned, s.required
                );
            }
            println!(
                "{} | {} | {} shift(s)",
                report.schedule.id,
                report.schedule.name,
                report.shifts.len()
            );
            0
        }
        Commands::List => {
            for s in store.schedules()? {
                println!(
                    "{} | {} | {} → {} | {}",
                    s.id, s.name, s.start_date, s.end_date, s.status
                );
            }
            0
        }
        Commands::Shifts { schedule, out_csv } => {
            let id = ScheduleId::new(schedule);
            let db = store.snapshot();
            if let Some(path) = out_csv {
                io::export_shifts_csv(path, &db, &id)?;
            }
            let mut shifts = store.shifts_for(&id)?;
            shifts.sort_by_key(|s| s.shift_date);
            for s in &shifts {
                let shift_type = db
                    .shift_types
                    .iter()
                    .find(|st| st.id == s.shift_type_id)
                    .map(|st| st.name.as_str())
                    .unwrap_or("-");
                let employee = db
                    .employees
                    .iter()
                    .find(|e| e.id == s.employee_id)
                    .map(|e| e.name.as_str())
                    .unwrap_or("-");
                println!("{} | {} | {}", s.shift_date, shift_type, employee);
            }
            0
        }
        Commands::Check {
            schedule,
            min_rest_hours,
        } => {
            let id = ScheduleId::new(schedule);
            let shifts = store.shifts_for(&id)?;
            let cfg = GeneratorConfig {
                min_rest_hours,
                ..GeneratorConfig::default()
            };
            let conflicts = detect_conflicts(&shifts, &store.snapshot().shift_types, cfg);
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                for c in &conflicts {
                    let kind = match c.kind {
                        ConflictKind::SameDay => "same-day",
                        ConflictKind::RestViolation => "rest",
                    };
                    println!("{} | {} | {} | {}", c.employee, c.shift_a, c.shift_b, kind);
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Approve { schedule, outbox } => {
            let dispatcher = OutboxDispatcher::new(&outbox);
            let outcome = review_schedule(
                &store,
                &dispatcher,
                &TextEmail,
                &ScheduleId::new(schedule),
                Decision::Approve,
            )
            .context("approving schedule")?;
            let report = outcome.dispatch.unwrap_or_default();
            println!(
                "{} approved: {} email(s) written to {outbox}, {} failed",
                outcome.schedule.id,
                report.sent,
                report.failed.len()
            );
            0
        }
        Commands::Reject { schedule } => {
            let outcome = review_schedule(
                &store,
                &OutboxDispatcher::new("outbox"),
                &TextEmail,
                &ScheduleId::new(schedule),
                Decision::Reject,
            )
            .context("rejecting schedule")?;
            println!("{} rejected", outcome.schedule.id);
            0
        }
    };

    std::process::exit(code);
}
