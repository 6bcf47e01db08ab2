//! Integration tests for scenario/strategy files and scripted games.

use std::path::{Path, PathBuf};

use outpost_core::session::{GameOverReason, Side};
use outpost_core::setup::ScenarioConfig;
use outpost_headless::game_runner::{run_game, GameConfig, GameRunner};
use outpost_headless::metrics::GameMetrics;
use outpost_headless::runner::{ClockMode, HeadlessRunner, RunnerConfig};
use outpost_headless::strategies::{DefenderStrategy, Targeting};
use outpost_test_utils::fixtures::{contested_field, session_with, ScriptedRng};

fn crate_dir(sub: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(sub)
}

fn ron_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == "ron"))
        .collect();
    files.sort();
    files
}

#[test]
fn bundled_scenarios_load() {
    let files = ron_files(&crate_dir("scenarios"));
    assert!(files.len() >= 3);
    for path in files {
        let config = ScenarioConfig::load(&path)
            .unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        assert!(!config.name.is_empty());
    }
}

#[test]
fn standard_scenario_matches_defaults() {
    let loaded = ScenarioConfig::load(crate_dir("scenarios").join("standard.ron")).unwrap();
    assert_eq!(loaded, ScenarioConfig::default());
}

#[test]
fn bundled_strategies_load() {
    let files = ron_files(&crate_dir("strategies"));
    assert!(files.len() >= 2);
    for path in files {
        let strategy = DefenderStrategy::load(&path)
            .unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        assert!(strategy.commit_fraction > 0.0 && strategy.commit_fraction <= 1.0);
    }
}

#[test]
fn strategy_file_resolves_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sniper.ron");
    std::fs::write(
        &path,
        r#"(
            name: "Sniper",
            description: "Closest outpost, fixed orders",
            targeting: Nearest,
            commit_fraction: 0.0,
            min_commit: 25,
        )"#,
    )
    .unwrap();

    let strategy = DefenderStrategy::resolve(path.to_str().unwrap()).unwrap();
    assert_eq!(strategy.targeting, Targeting::Nearest);
    assert_eq!(strategy.troops_for(300), 25);
}

#[test]
fn broken_scenario_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ron");
    std::fs::write(&path, "(population: (500, 200))").unwrap();
    assert!(ScenarioConfig::load(&path).is_err());
}

#[test]
fn scripted_defender_clears_field_when_every_fight_is_won() {
    // A draw of 0.0 beats any non-zero win chance.
    let session = session_with(contested_field(), 200, ScriptedRng::constant(0.0));
    let mut metrics = GameMetrics::new("fixture", "fixture", "Firefighter", 0);
    metrics.record_start(&session);

    let metrics = GameRunner::with_session(session, DefenderStrategy::firefighter(), 0.5, metrics)
        .run_to_end(1_000);

    assert_eq!(metrics.winner, Some(Side::Defender));
    assert_eq!(metrics.reason, Some(GameOverReason::AttackerEliminated));
    assert_eq!(metrics.final_aliens, 0);
    assert!(metrics.reinforcements >= 1);
    assert_eq!(metrics.reinforcements, metrics.reinforcements_won);
}

#[test]
fn quick_scenario_plays_out() {
    let scenario = ScenarioConfig::load(crate_dir("scenarios").join("quick_skirmish.ron")).unwrap();
    for strategy in ["advisor", "firefighter", "nearest", "idle"] {
        let strategy = DefenderStrategy::resolve(strategy).unwrap();
        let metrics = run_game(GameConfig::new(scenario.clone(), strategy, 21));
        assert!(metrics.winner.is_some(), "{}", metrics.strategy);
        assert!(metrics.duration_secs <= 120.0 + 1e-9);
    }
}

#[test]
fn runner_session_from_scenario_file() {
    let runner = HeadlessRunner::with_config(RunnerConfig {
        scenario_path: Some(crate_dir("scenarios").join("siege.ron")),
        seed: Some(99),
        clock: ClockMode::Game,
        auto_state: false,
    });
    let mut output = Vec::new();
    runner
        .run_with(
            "{\"cmd\":\"state\"}\n{\"cmd\":\"quit\"}\n".as_bytes(),
            &mut output,
        )
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].contains(r#""reserve":400"#));
    assert!(lines.iter().any(|l| l.contains(r#""type":"state""#)));
    assert!(lines.last().unwrap().contains(r#""type":"bye""#));
}
