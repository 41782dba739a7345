use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    home: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            home: TempDir::new().expect("tempdir"),
        }
    }

    fn data_dir(&self) -> std::path::PathBuf {
        self.home.path().join("fund-data")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("fundbook").expect("bin");
        cmd.env("HOME", self.home.path())
            .env("NO_COLOR", "1")
            .env_remove("FUNDBOOK_PASSWORD")
            .env_remove("FUNDBOOK_ADMIN_PASSWORD")
            .env_remove("FUNDBOOK_LOG");
        cmd
    }

    fn init(&self) {
        self.cmd()
            .args(["init", "--data-dir"])
            .arg(self.data_dir())
            .args(["--org-name", "Test Fund", "--admin-password", "s3cret"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created admin user admin@fund.local"));
    }

    fn login(&self) {
        self.cmd()
            .args(["login", "admin@fund.local", "--password", "s3cret"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Logged in as Admin User"));
    }

    fn add_donor(&self, args: &[&str]) -> String {
        let output = self.cmd().args(["donors", "add"]).args(args).output().expect("run");
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let stdout = String::from_utf8(output.stdout).expect("utf8");
        bracketed_id(&stdout)
    }
}

fn bracketed_id(text: &str) -> String {
    let start = text.rfind('[').expect("id start") + 1;
    let end = text[start..].find(']').expect("id end") + start;
    text[start..end].to_string()
}

fn exists(path: &Path) -> bool {
    std::fs::metadata(path).is_ok()
}

#[test]
fn records_require_login() {
    let env = Env::new();
    env.init();
    env.cmd()
        .args(["donors", "add", "Ali"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please log in"));
}

#[test]
fn wrong_password_is_rejected() {
    let env = Env::new();
    env.init();
    env.cmd()
        .args(["login", "admin@fund.local", "--password", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));
    env.cmd().arg("whoami").assert().failure();
}

#[test]
fn init_twice_keeps_admin() {
    let env = Env::new();
    env.init();
    env.cmd()
        .args(["init", "--data-dir"])
        .arg(env.data_dir())
        .args(["--admin-password", "other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Admin user already exists"));
    env.login();
}

#[test]
fn monthly_pledge_workflow() {
    let env = Env::new();
    env.init();
    env.login();

    let ali = env.add_donor(&["Ali", "--pledge", "500"]);
    env.add_donor(&["Sara", "--pledge", "300", "--phone", "0300-1234567"]);
    env.add_donor(&["Walk-in"]);

    env.cmd()
        .args(["monthly", "status", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Monthly donors for 3/2025"))
        .stdout(predicate::str::contains("Pending (2)"))
        .stdout(predicate::str::contains("Paid (0)"))
        .stdout(predicate::str::contains("Walk-in").not());

    env.cmd()
        .args(["monthly", "pay", &ali, "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ali paid Rs 500.00 for 3/2025"));

    env.cmd()
        .args(["monthly", "pay", &ali, "--month", "2025-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already recorded"));

    env.cmd()
        .args(["monthly", "status", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paid (1)"))
        .stdout(predicate::str::contains("Pending (1)"))
        .stdout(predicate::str::contains("Total collected: Rs 500.00"));

    let receipt = env.home.path().join("ali.html");
    env.cmd()
        .args(["monthly", "receipt", &ali, "--month", "2025-03", "--output"])
        .arg(&receipt)
        .assert()
        .success();
    let html = std::fs::read_to_string(&receipt).expect("receipt");
    assert!(html.contains("DONATION RECEIPT"));
    assert!(html.contains("Rs 500.00"));
}

#[test]
fn donor_without_pledge_cannot_be_paid_monthly() {
    let env = Env::new();
    env.init();
    env.login();

    let walk_in = env.add_donor(&["Walkin"]);
    env.cmd()
        .args(["monthly", "pay", &walk_in, "--amount", "100", "--month", "2025-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Walkin has no monthly pledge"));

    env.cmd()
        .args(["monthly", "status", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total collected: Rs 0.00"));
    env.cmd()
        .args(["donations", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: Rs 0.00"));
}

#[test]
fn receipt_survives_pledge_removal() {
    let env = Env::new();
    env.init();
    env.login();

    let ali = env.add_donor(&["Ali", "--pledge", "500"]);
    env.cmd()
        .args(["monthly", "pay", &ali, "--month", "2025-03"])
        .assert()
        .success();
    env.cmd()
        .args(["donors", "edit", &ali, "--pledge", "0"])
        .assert()
        .success();
    env.cmd()
        .args(["monthly", "status", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paid (0)"));

    let receipt = env.home.path().join("ali.html");
    env.cmd()
        .args(["monthly", "receipt", &ali, "--month", "2025-03", "--output"])
        .arg(&receipt)
        .assert()
        .success();
    let html = std::fs::read_to_string(&receipt).expect("receipt");
    assert!(html.contains("Ali"));
    assert!(html.contains("Rs 500.00"));

    env.cmd()
        .args(["monthly", "receipt", &ali, "--month", "2025-04"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No monthly payment recorded for 4/2025"));
}

#[test]
fn forged_session_file_is_rejected() {
    let env = Env::new();
    env.init();
    std::fs::write(
        env.data_dir().join("session.json"),
        r#"{"token":"x","user":{"id":"?","name":"Mallory","email":"m@x","role":"admin"},"issued_at":"now"}"#,
    )
    .expect("write session");

    env.cmd()
        .args(["donors", "add", "Ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please log in"));
    env.cmd().arg("whoami").assert().failure();
}

#[test]
fn session_file_is_dead_after_logout() {
    let env = Env::new();
    env.init();
    env.login();
    let path = env.data_dir().join("session.json");
    let saved = std::fs::read_to_string(&path).expect("session");

    env.cmd().arg("logout").assert().success();
    std::fs::write(&path, saved).expect("restore session");

    env.cmd()
        .args(["donors", "add", "Ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please log in"));
}

#[test]
fn wildcard_id_does_not_match() {
    let env = Env::new();
    env.init();
    env.login();
    env.add_donor(&["Ali"]);

    for key in ["_", "%"] {
        env.cmd()
            .args(["donors", "delete", key])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Donor not found"));
    }
    env.cmd()
        .args(["donors", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Donors (1)"));
}

#[test]
fn donations_report_csv() {
    let env = Env::new();
    env.init();
    env.login();

    let ali = env.add_donor(&["Ali"]);
    env.cmd()
        .args(["donations", "add", "250", "--donor", &ali, "--date", "2025-03-05", "--method", "bank"])
        .assert()
        .success();
    env.cmd()
        .args(["donations", "add", "100", "--date", "2025-03-09"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from Anonymous"));
    env.cmd()
        .args(["donations", "add", "75", "--date", "2025-04-01"])
        .assert()
        .success();

    env.cmd()
        .args(["report", "donations", "--month", "2025-03", "--format", "csv"])
        .assert()
        .success();
    let csv_path = env.data_dir().join("exports").join("Donations_3_2025.csv");
    assert!(exists(&csv_path));
    let csv = std::fs::read_to_string(&csv_path).expect("csv");
    assert!(csv.contains("Ali,250.00,Bank,"));
    assert!(csv.contains("N/A,100.00,Cash,"));
    assert!(csv.contains("Total,350.00"));
    assert!(!csv.contains("75.00"));
}

#[test]
fn negative_donation_is_rejected() {
    let env = Env::new();
    env.init();
    env.login();
    env.cmd()
        .args(["donations", "add", "--", "-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn logout_ends_session() {
    let env = Env::new();
    env.init();
    env.login();
    env.cmd().arg("status").assert().success().stdout(predicate::str::contains("Test Fund"));
    env.cmd().arg("logout").assert().success().stdout(predicate::str::contains("Logged out"));
    env.cmd().arg("status").assert().failure();
}
