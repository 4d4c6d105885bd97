//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::{NaiveDate, NaiveDateTime};

use energy_plots::series::TimeSeries;

/// Midnight of the summer solstice day used by the CAISO fixtures.
pub fn solstice() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 6, 21)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid timestamp")
}

/// Five-minute series starting at the solstice.
pub fn five_minute(label: &str, values: &[f64]) -> TimeSeries {
    TimeSeries::uniform(label, solstice(), 5, values.to_vec())
}

/// Writes a CAISO-style daily export with `samples` five-minute columns.
///
/// Each row is `(name, value)`; every sample of a row carries that value.
pub fn write_caiso(dir: &Path, file: &str, samples: usize, rows: &[(&str, f64)]) -> PathBuf {
    let times: Vec<String> = (0..samples)
        .map(|i| format!("{:02}:{:02}", i * 5 / 60, i * 5 % 60))
        .collect();
    let mut text = format!("Demand 06/21/2019,{}\n", times.join(","));
    for (name, value) in rows {
        let cells = vec![format!("{value}"); samples];
        text.push_str(&format!("{name},{}\n", cells.join(",")));
    }
    let path = dir.join(file);
    fs::write(&path, text).expect("write CAISO fixture");
    path
}

/// Writes `<dir>/<sheet>.csv` with `preamble` free-text lines before `body`.
pub fn write_sheet(dir: &Path, sheet: &str, preamble: usize, body: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("create workbook dir");
    let mut text = String::new();
    for i in 0..preamble {
        text.push_str(&format!("\"Preamble line {i}\"\n"));
    }
    text.push_str(body);
    let path = dir.join(format!("{sheet}.csv"));
    fs::write(&path, text).expect("write sheet fixture");
    path
}

/// Runs the binary from the crate root so the checked-in `data/` resolves.
pub fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_energy-plots"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("spawn energy-plots")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
