use std::process::Command;

use float_eq::assert_float_eq;

#[test]
fn prints_the_optimal_point() {
    let output = Command::new(env!("CARGO_BIN_EXE_small_lp"))
        .env_remove("SMALL_LP_LOG")
        .output()
        .expect("run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let fields: Vec<f64> = stdout
        .trim_end()
        .split(' ')
        .map(|field| field.parse().expect("number"))
        .collect();
    assert_eq!(fields.len(), 3, "unexpected output {:?}", stdout);
    assert_float_eq!(fields[0], 1., abs <= 1e-6);
    assert_float_eq!(fields[1], 11. / 3., abs <= 1e-6);
    assert_float_eq!(fields[2], 214. / 3., abs <= 1e-6);
}

#[test]
fn bad_log_format_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_small_lp"))
        .env("SMALL_LP_LOG_FORMAT", "xml")
        .output()
        .expect("run binary");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
