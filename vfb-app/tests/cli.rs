use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

const RED_RECT_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300">
  <rect x="50" y="50" width="100" height="75" fill="#ff0000" stroke="#000"/>
</svg>"##;

fn vfb() -> Command {
    let mut cmd = Command::cargo_bin("vfb-app").expect("binary should build");
    cmd.env_remove("VFB_CONFIG");
    cmd
}

#[test]
fn svg2egf_prints_confirmation_and_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.svg");
    let output = dir.path().join("out.egf");
    fs::write(&input, RED_RECT_SVG).unwrap();

    vfb()
        .current_dir(dir.path())
        .arg("svg2egf")
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Converted SVG to EGF successfully."));

    let egf = fs::read_to_string(&output).unwrap();
    assert!(egf.contains("H#01 = R(50,50,100,75) S(#000,#ff0000)"));
}

#[test]
fn egf_round_trips_through_binary() {
    let dir = tempfile::tempdir().unwrap();
    let egf = dir.path().join("a.egf");
    let egfb = dir.path().join("a.egfb");
    let back = dir.path().join("b.egf");
    fs::write(&egf, "M(10,10,#fff)\n\nH#01 = C(1,1,1)\nCALL#01 T(0,0,1,0)\n").unwrap();

    vfb()
        .current_dir(dir.path())
        .args(["egf2egfb"])
        .arg(&egf)
        .arg(&egfb)
        .assert()
        .success()
        .stdout(predicate::str::contains("Encoded EGF to EGFB successfully."));
    vfb()
        .current_dir(dir.path())
        .arg("egfb2egf")
        .arg(&egfb)
        .arg(&back)
        .assert()
        .success()
        .stdout(predicate::str::contains("Decoded EGFB to EGF successfully."));

    assert_eq!(
        fs::read_to_string(&back).unwrap(),
        "M(10,10,#fff)\nH#01 = C(1,1,1)\nCALL#01 T(0,0,1,0)\n"
    );
}

#[test]
fn missing_input_exits_with_failure_and_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.svg");

    vfb()
        .current_dir(dir.path())
        .arg("egf2svg")
        .arg(dir.path().join("missing.egf"))
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("EGF to SVG conversion failed"));
    assert!(!output.exists());
}

#[test]
fn demo_uses_output_dir_from_config_flag() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("demo-out");
    let config = dir.path().join("vfb.toml");
    fs::write(
        &config,
        format!(
            "[demo]\noutput_dir = {:?}\n\n[emit]\nbackground = \"#abc\"\n",
            out.to_string_lossy()
        ),
    )
    .unwrap();

    vfb()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo completed!"));

    for name in [
        "demo.svg",
        "demo.egf",
        "demo_converted.svg",
        "demo.egfb",
        "demo_decoded.egf",
    ] {
        assert!(out.join(name).exists(), "{name} missing");
    }
    let egf = fs::read_to_string(out.join("demo.egf")).unwrap();
    assert!(egf.starts_with("M(400,300,#abc)\n"));
}

#[test]
fn unreadable_config_is_reported_and_defaults_are_used() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nonexistent.toml");
    let egf = dir.path().join("p.egf");
    let egfb = dir.path().join("p.egfb");
    fs::write(&egf, "C(1,1,1)\n").unwrap();

    vfb()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&missing)
        .arg("egf2egfb")
        .arg(&egf)
        .arg(&egfb)
        .assert()
        .success()
        .stderr(predicate::str::contains(missing.to_string_lossy().into_owned()))
        .stderr(predicate::str::contains("WARN"));
    assert!(egfb.exists());
}

#[test]
fn unknown_subcommand_is_rejected() {
    vfb().arg("svg2png").assert().failure();
}
