use assert_cmd::prelude::*;
use image::GenericImageView;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn renders_the_default_view() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("mandel.png");
    Command::cargo_bin("mandel")
        .unwrap()
        .arg("-o")
        .arg(&output)
        .args(&["-s", "120x90", "-i", "64"])
        .assert()
        .success();
    let img = image::open(&output).unwrap();
    assert_eq!(img.dimensions(), (120, 90));
}

#[test]
fn renders_a_zoom_and_a_julia_set() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("zoom.png");
    let julia = dir.path().join("julia.png");
    Command::cargo_bin("mandel")
        .unwrap()
        .arg("--output")
        .arg(&output)
        .args(&["--size", "80x60", "--zoom", "10,10,20,15"])
        .args(&["--julia", "-0.8,0.156", "--skip-interior"])
        .arg("--julia-output")
        .arg(&julia)
        .assert()
        .success()
        .stderr(predicate::str::contains("Julia set for"));
    assert_eq!(image::open(&output).unwrap().dimensions(), (80, 60));
    assert_eq!(image::open(&julia).unwrap().dimensions(), (20, 15));
}

#[test]
fn rejects_an_inverted_viewport() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("mandel")
        .unwrap()
        .arg("-o")
        .arg(dir.path().join("bad.png"))
        .args(&["-s", "40x30", "-l", "1.0,-1.0", "-r", "-1.0,1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid viewport"));
}

#[test]
fn rejects_zero_iterations() {
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", "never.png", "-i", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Iteration count must be between"));
}

#[test]
fn requires_an_output_file() {
    Command::cargo_bin("mandel").unwrap().assert().failure();
}
