use assert_cmd::Command;
use predicates::prelude::*;

const FIXTURE_INF: &str = "\
[Version]
DriverVer=01/02/2020,1.2.3.4

[Firmware.NTamd64]
%Desc% = Firmware_Install,UEFI\\RES_{AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE}

[Firmware_CopyFiles]
firmware.bin

[Firmware_AddReg]
HKR,,FirmwareVersion,%REG_DWORD%,0x01020304
";

#[test]
fn no_input_prints_diagnostic_and_exits_cleanly() {
    Command::cargo_bin("fwcab")
        .unwrap()
        .assert()
        .success()
        .stdout(predicate::str::contains("no input given"));
}

#[test]
fn input_selectors_are_mutually_exclusive() {
    Command::cargo_bin("fwcab")
        .unwrap()
        .args(["--inf", "a.inf", "--dir", "b"])
        .assert()
        .failure();
}

#[test]
fn incomplete_inf_reports_skip_and_succeeds() {
    let tmp = tempfile::tempdir().unwrap();
    let pkg = tmp.path().join("pkg");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(pkg.join("bare.inf"), "[Version]\n").unwrap();

    Command::cargo_bin("fwcab")
        .unwrap()
        .args(["--dir"])
        .arg(&pkg)
        .args(["--output-dir"])
        .arg(tmp.path().join("output"))
        .assert()
        .success()
        .stdout(predicate::str::contains("SKIP"))
        .stdout(predicate::str::contains("0 bundled, 1 skipped, 0 failed"));
}

#[test]
fn missing_payload_fails_the_batch() {
    let tmp = tempfile::tempdir().unwrap();
    let pkg = tmp.path().join("pkg");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(pkg.join("pkg.inf"), FIXTURE_INF).unwrap();
    // No firmware.bin next to the INF.

    Command::cargo_bin("fwcab")
        .unwrap()
        .args(["--dir"])
        .arg(&pkg)
        .args(["--output-dir"])
        .arg(tmp.path().join("output"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAILED"))
        .stderr(predicate::str::contains("1 of 1 files failed"));
}

#[cfg(unix)]
#[test]
fn bundles_with_stubbed_gcab_on_path() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::tempdir().unwrap();
    let pkg = tmp.path().join("pkg");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(pkg.join("SurfaceUEFI.inf"), FIXTURE_INF).unwrap();
    std::fs::write(pkg.join("firmware.bin"), b"payload").unwrap();

    let bindir = tmp.path().join("bin");
    std::fs::create_dir_all(&bindir).unwrap();
    let stub = bindir.join("gcab");
    std::fs::write(&stub, "#!/bin/sh\nshift\ntouch \"$1\"\n").unwrap();
    let mut perms = std::fs::metadata(&stub).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&stub, perms).unwrap();

    let path_var = format!(
        "{}:{}",
        bindir.display(),
        std::env::var("PATH").unwrap_or_default()
    );

    let report_path = tmp.path().join("report.json");
    Command::cargo_bin("fwcab")
        .unwrap()
        .env("PATH", &path_var)
        .args(["--dir"])
        .arg(&pkg)
        .args(["--output-dir"])
        .arg(tmp.path().join("output"))
        .args(["--report-json"])
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("BUNDLED"))
        .stdout(predicate::str::contains("1 bundled, 0 skipped, 0 failed"));

    assert!(tmp
        .path()
        .join("output")
        .join("SurfaceUEFI_16909060.cab")
        .is_file());
    assert!(pkg.join("SurfaceUEFI.metainfo.xml").is_file());

    let report = std::fs::read_to_string(&report_path).unwrap();
    assert!(report.contains("\"status\": \"bundled\""));
}

#[test]
fn single_inf_mode_skips_unresolvable_version() {
    let tmp = tempfile::tempdir().unwrap();
    let pkg = tmp.path().join("pkg");
    std::fs::create_dir_all(&pkg).unwrap();
    let inf = pkg.join("pkg.inf");
    std::fs::write(&inf, FIXTURE_INF.replace("1.2.3.4", "9.9.9.9")).unwrap();
    std::fs::write(pkg.join("firmware.bin"), b"payload").unwrap();

    Command::cargo_bin("fwcab")
        .unwrap()
        .args(["--inf"])
        .arg(&inf)
        .args(["--output-dir"])
        .arg(tmp.path().join("output"))
        .assert()
        .success()
        .stdout(predicate::str::contains("no version format"));
}
