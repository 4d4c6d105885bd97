//! End-to-end runs of the binary on the shipped data, without rendering.

mod common;

use std::fs;

use chrono::NaiveDate;

use common::{run_cli, stderr, stdout};
use energy_plots::series::decimal_year;

#[test]
fn intermittency_scenario_summary() {
    let out = run_cli(&["intermittency", "--plot", "scenario", "--summary-only"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Summer"));
    assert!(text.contains("Winter"));
}

#[test]
fn intermittency_demand_and_solar_summaries() {
    for plot in ["demand", "solar"] {
        let out = run_cli(&["intermittency", "--plot", plot, "--summary-only"]);
        assert!(out.status.success(), "{plot}: {}", stderr(&out));
        assert!(!stdout(&out).is_empty());
    }
}

#[test]
fn wind_views_summaries() {
    let out = run_cli(&["wind", "--summary-only"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("2020"));

    let out = run_cli(&[
        "wind",
        "--view",
        "mix",
        "--start",
        "2020-12-01",
        "--end",
        "2020-12-10",
        "--summary-only",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
}

#[test]
fn wind_inverted_range_fails() {
    let out = run_cli(&[
        "wind",
        "--start",
        "2020-12-10",
        "--end",
        "2020-12-01",
        "--summary-only",
    ]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("inverted"));
}

#[test]
fn wind_mix_x_values_follow_the_calendar_across_months() {
    let dir = tempfile::tempdir().expect("temp dir");
    let csv = dir.path().join("mix.csv");
    let csv_arg = csv.to_string_lossy().into_owned();

    let out = run_cli(&[
        "wind",
        "--view",
        "mix",
        "--start",
        "2020-11-25",
        "--end",
        "2020-12-05",
        "--summary-only",
        "--series-out",
        &csv_arg,
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let at = |m, d| {
        NaiveDate::from_ymd_opt(2020, m, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(decimal_year)
            .expect("valid date")
    };
    // six exported decimals
    let (lo, hi) = (at(11, 25) - 1e-5, at(12, 6));
    let text = fs::read_to_string(&csv).expect("series written");
    let wind: Vec<f64> = text
        .lines()
        .skip(1)
        .filter(|l| l.starts_with("Wind,"))
        .map(|l| l.split(',').nth(1).expect("x column").parse().expect("numeric x"))
        .collect();
    assert!(wind.len() > 60, "expected 3-hourly rows, got {}", wind.len());
    assert!(wind.iter().all(|&x| (lo..hi).contains(&x)));
    assert!(wind.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn nuclear_cf_summary() {
    let out = run_cli(&["nuclear-cf", "--summary-only"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("12-mo avg"));
}

#[test]
fn category_and_trend_summaries() {
    let out = run_cli(&["categories", "capacity_factors_usa", "--summary-only"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Natural gas"));

    let out = run_cli(&[
        "categories",
        "lifecycle_emissions",
        "--sort",
        "descending",
        "--summary-only",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    let coal = text.find("Coal").expect("coal listed");
    let wind = text.find("Wind").expect("wind listed");
    assert!(coal < wind);

    let out = run_cli(&["emissions", "--summary-only"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("2008-2018"));
}

#[test]
fn physics_chart_summaries() {
    for args in [
        &["fission", "--summary-only"][..],
        &["half-life", "--summary-only"][..],
        &["mean-of-extremes", "--summary-only"][..],
        &["mean-of-extremes", "--synthetic", "--seed", "3", "--summary-only"][..],
        &["timeline", "--summary-only"][..],
        &["planets", "--summary-only"][..],
        &["venn", "--summary-only"][..],
    ] {
        let out = run_cli(args);
        assert!(out.status.success(), "{args:?}: {}", stderr(&out));
        assert!(!stdout(&out).is_empty(), "{args:?}");
    }
}

#[test]
fn primary_energy_summary_from_shipped_dataset() {
    let out = run_cli(&["primary-energy", "--summary-only"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    let oil = text.find("Oil").expect("oil listed");
    let renewables = text.find("Renewables").expect("renewables listed");
    assert!(oil < renewables);
    assert!(text.contains("Data from: BP Statistical Review"));
}

#[test]
fn planets_summary_lists_earth_at_one() {
    let out = run_cli(&["planets", "--summary-only"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let earth = stdout(&out)
        .lines()
        .find(|l| l.starts_with("Earth"))
        .map(str::to_string)
        .expect("earth listed");
    assert!(earth.contains("1.00000"), "{earth}");
    assert!(earth.contains("1361.0 W/m²"), "{earth}");
}

#[test]
fn timeline_reports_skipped_reactor() {
    let out = run_cli(&["timeline", "--summary-only"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Skipped (no contract): Chugach"));
}

#[test]
fn series_out_writes_csv() {
    let dir = tempfile::tempdir().expect("temp dir");
    let csv = dir.path().join("fission.csv");
    let csv_arg = csv.to_string_lossy().into_owned();

    let out = run_cli(&["fission", "--summary-only", "--series-out", &csv_arg]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = fs::read_to_string(&csv).expect("series written");
    assert!(text.starts_with("series,x,value\n"));
    assert_eq!(text.lines().count(), 1 + 7);
}

#[test]
fn missing_input_exits_nonzero_with_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("plots.toml");
    fs::write(&config, "[fission]\npath = \"data/no-such-table.csv\"\n").expect("write config");
    let config_arg = config.to_string_lossy().into_owned();

    let out = run_cli(&["--config", &config_arg, "fission", "--summary-only"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("data/no-such-table.csv"));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("plots.toml");
    fs::write(&config, "[nuclear_cf]\nwindow = 0\n").expect("write config");
    let config_arg = config.to_string_lossy().into_owned();

    let out = run_cli(&["--config", &config_arg, "nuclear-cf", "--summary-only"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("nuclear_cf.window"));
}

#[test]
fn unknown_config_key_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("plots.toml");
    fs::write(&config, "[fission]\ncolour = \"red\"\n").expect("write config");
    let config_arg = config.to_string_lossy().into_owned();

    let out = run_cli(&["--config", &config_arg, "fission", "--summary-only"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("colour"));
}

#[test]
fn render_into_missing_directory_fails_cleanly() {
    let out = run_cli(&["half-life", "-o", "no/such/dir/half-life.svg"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("no/such/dir/half-life.svg"));
}
