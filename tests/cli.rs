#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn cli(db: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("teaplan-cli").unwrap();
    cmd.arg("--db").arg(db);
    cmd
}

#[test]
fn generate_check_and_approve_end_to_end() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("teaplan.json");
    let employees = dir.path().join("employees.csv");
    let shift_types = dir.path().join("shift_types.csv");
    fs::write(
        &employees,
        "name,email,department_id\nAsha,asha@tea.example,rolling\nRavi,ravi@tea.example,rolling\n",
    )
    .unwrap();
    fs::write(
        &shift_types,
        "name,start_time,end_time\nMorning,06:00,14:00\nAfternoon,14:00,22:00\nNight,22:00,06:00\n",
    )
    .unwrap();

    cli(&db)
        .args(["add-department", "--id", "rolling", "--name", "Rolling"])
        .assert()
        .success();
    cli(&db)
        .arg("import-employees")
        .arg("--csv")
        .arg(&employees)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 employee(s) imported"));
    cli(&db)
        .arg("import-shift-types")
        .arg("--csv")
        .arg(&shift_types)
        .assert()
        .success();

    cli(&db)
        .args([
            "generate",
            "--department",
            "rolling",
            "--start",
            "2025-01-06",
            "--end",
            "2025-01-06",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolling Schedule (2025-01-06-2025-01-06) | 6 shift(s)"));

    cli(&db)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("pending"));

    let raw: serde_json::Value = serde_json::from_slice(&fs::read(&db).unwrap()).unwrap();
    let schedule_id = raw["schedules"][0]["id"].as_str().unwrap().to_string();

    // deux employés sur trois créneaux le même jour : doublons signalés
    cli(&db)
        .args(["check", "--schedule", schedule_id.as_str()])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("same-day"));

    let outbox = dir.path().join("outbox");
    cli(&db)
        .args(["approve", "--schedule", schedule_id.as_str(), "--outbox"])
        .arg(&outbox)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 email(s)"));
    assert!(outbox.join("asha@tea.example.txt").exists());
    assert!(outbox.join("ravi@tea.example.txt").exists());

    cli(&db)
        .args(["reject", "--schedule", schedule_id.as_str()])
        .assert()
        .failure();
}
