use rstest::rstest;
use stepclock_config::{load_path, load_toml};

const GOOD: &str = r#"
[pins]
phase = [19, 16, 17, 21]
home = 20
button = 26

[motor]
rapid_secs_per_rev = 8
full_steps_per_rev = 2048
reversed = false
half_stepping = true
home_normally_open = true
gear_ratio = 4
hours_per_rev = 4

[calibrate]
inspect_pause_ms = 10000
settle_pause_ms = 500

[logging]
level = "info"
rotation = "daily"
"#;

#[test]
fn accepts_a_complete_config() {
    let cfg = load_toml(GOOD).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.pins.phase, [19, 16, 17, 21]);
    assert_eq!(cfg.motor.gear_ratio, 4);
}

#[test]
fn empty_document_falls_back_to_defaults() {
    let cfg = load_toml("").expect("parse TOML");
    cfg.validate().expect("defaults should validate");
    assert_eq!(cfg.pins.home, 20);
    assert_eq!(cfg.motor.full_steps_per_rev, 2048);
    assert_eq!(cfg.calibrate.inspect_pause_ms, 10_000);
}

#[test]
fn rejects_out_of_range_pin() {
    let toml = r#"
[pins]
phase = [19, 16, 17, 32]
home = 20
button = 26
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject pin 32");
    assert!(format!("{err}").contains("out of range"));
}

#[test]
fn rejects_shared_pin_assignment() {
    let toml = r#"
[pins]
phase = [19, 16, 17, 21]
home = 21
button = 26
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject home == phase[3]");
    assert!(format!("{err}").contains("distinct"));
}

#[rstest]
#[case("rapid_secs_per_rev = 0", "rapid_secs_per_rev must be > 0")]
#[case("full_steps_per_rev = 0", "full_steps_per_rev must be > 0")]
#[case("gear_ratio = 0", "gear_ratio must be > 0")]
#[case("hours_per_rev = 0", "hours_per_rev must be in 1..=12")]
#[case("hours_per_rev = 13", "hours_per_rev must be in 1..=12")]
fn rejects_bad_motor_fields(#[case] line: &str, #[case] msg: &str) {
    let toml = format!("[motor]\n{line}\n");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(format!("{err}").contains(msg), "unexpected error: {err}");
}

#[rstest]
#[case("level = \"verbose\"", "logging.level")]
#[case("rotation = \"weekly\"", "logging.rotation")]
fn rejects_unknown_logging_values(#[case] line: &str, #[case] msg: &str) {
    let toml = format!("[logging]\n{line}\n");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(format!("{err}").contains(msg));
}

#[test]
fn load_path_reads_and_validates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("clock.toml");
    std::fs::write(&path, GOOD).expect("write config");

    let cfg = load_path(&path).expect("load valid file");
    assert_eq!(cfg.pins.button, 26);

    std::fs::write(&path, "[motor]\ngear_ratio = 0\n").expect("write config");
    assert!(load_path(&path).is_err());

    assert!(load_path(&dir.path().join("missing.toml")).is_err());
}
