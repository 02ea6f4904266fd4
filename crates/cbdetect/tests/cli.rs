#![cfg(feature = "cli")]

use assert_cmd::Command;
use cbdetect::core::synthetic::BoardRender;
use nalgebra::Point2;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn write_board_png(path: &Path) {
    let board = BoardRender::axis_aligned(10, 7, 24.0, Point2::new(29.5, 29.5), 300, 228);
    let raster = board.render();
    let img = image::GrayImage::from_raw(raster.width as u32, raster.height as u32, raster.data)
        .expect("buffer matches dimensions");
    img.save(path).expect("write png");
}

#[test]
fn prints_the_best_grid_as_json() {
    let dir = tempdir().unwrap();
    let png = dir.path().join("board.png");
    write_board_png(&png);

    let output = Command::cargo_bin("cbdetect")
        .unwrap()
        .args(["--image", png.to_str().unwrap(), "--cols", "9", "--rows", "6"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).expect("json report");
    let grids = report["grids"].as_array().expect("grids array");
    assert_eq!(grids.len(), 1);
    assert_eq!(grids[0]["corners"].as_array().unwrap().len(), 54);
    assert!(report["candidates"].as_u64().unwrap() >= 54);
}

#[test]
fn writes_the_report_to_a_file_with_a_config() {
    let dir = tempdir().unwrap();
    let png = dir.path().join("board.png");
    let out = dir.path().join("report.json");
    let cfg = dir.path().join("params.json");
    write_board_png(&png);
    std::fs::write(&cfg, r#"{ "chessboard": { "max_grids": 3 } }"#).unwrap();

    Command::cargo_bin("cbdetect")
        .unwrap()
        .args([
            "--image",
            png.to_str().unwrap(),
            "--cols",
            "9",
            "--rows",
            "6",
            "--all",
            "--config",
            cfg.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
            "--log-level",
            "info",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("\"expected_cols\": 9"));
}

#[test]
fn missing_image_fails() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("cbdetect")
        .unwrap()
        .args([
            "--image",
            dir.path().join("nope.png").to_str().unwrap(),
            "--cols",
            "9",
            "--rows",
            "6",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn logs_stay_off_stdout() {
    let dir = tempdir().unwrap();
    let png = dir.path().join("board.png");
    write_board_png(&png);

    let output = Command::cargo_bin("cbdetect")
        .unwrap()
        .args([
            "--image",
            png.to_str().unwrap(),
            "--cols",
            "9",
            "--rows",
            "6",
            "--log-level",
            "debug",
        ])
        .assert()
        .success()
        .get_output()
        .clone();

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout holds only the report");
    assert_eq!(report["grids"].as_array().unwrap().len(), 1);
    assert!(!output.stderr.is_empty());
}

#[cfg(feature = "tracing")]
#[test]
fn tracing_build_respects_the_log_level() {
    let dir = tempdir().unwrap();
    let png = dir.path().join("board.png");
    write_board_png(&png);

    Command::cargo_bin("cbdetect")
        .unwrap()
        .env_remove("RUST_LOG")
        .args([
            "--image",
            png.to_str().unwrap(),
            "--cols",
            "9",
            "--rows",
            "6",
            "--log-level",
            "off",
        ])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
