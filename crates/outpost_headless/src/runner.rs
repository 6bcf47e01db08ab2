//! Interactive headless session over JSON lines.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use outpost_core::error::GameError;
use outpost_core::outpost::OutpostId;
use outpost_core::rng::RandomSource;
use outpost_core::session::{Session, TurnEvent};
use outpost_core::setup::ScenarioConfig;
use thiserror::Error;

use crate::protocol::{validate_troops, Command, Response};

/// Granularity of `wait`: the session is polled once per step.
pub const WAIT_STEP: Duration = Duration::from_millis(100);

/// Longest single `wait` accepted.
pub const MAX_WAIT_SECS: f64 = 3600.0;

/// Error type for the runner.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Reading commands or writing responses failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Scenario could not be loaded.
    #[error(transparent)]
    Scenario(#[from] GameError),
}

/// How the runner measures game time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockMode {
    /// Real time since start. `wait` sleeps.
    #[default]
    Wall,
    /// Time only moves on `wait`. Fully reproducible.
    Game,
}

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Scenario file to load. Built-in defaults when absent.
    pub scenario_path: Option<PathBuf>,
    /// Seed for outpost generation and combat. Taken from the system clock when absent.
    pub seed: Option<u64>,
    /// Clock mode.
    pub clock: ClockMode,
    /// Output state after every command.
    pub auto_state: bool,
}

enum Clock {
    Wall { start: Instant },
    Game { elapsed: Duration },
}

impl Clock {
    fn new(mode: ClockMode) -> Self {
        match mode {
            ClockMode::Wall => Clock::Wall {
                start: Instant::now(),
            },
            ClockMode::Game => Clock::Game {
                elapsed: Duration::ZERO,
            },
        }
    }

    fn elapsed(&self) -> Duration {
        match self {
            Clock::Wall { start } => start.elapsed(),
            Clock::Game { elapsed } => *elapsed,
        }
    }

    fn advance(&mut self, step: Duration) {
        match self {
            Clock::Wall { .. } => thread::sleep(step),
            Clock::Game { elapsed } => *elapsed += step,
        }
    }
}

/// Headless runner for scripted or human play.
pub struct HeadlessRunner {
    config: RunnerConfig,
}

impl HeadlessRunner {
    /// Create a new headless runner with default config.
    pub fn new() -> Self {
        Self {
            config: RunnerConfig::default(),
        }
    }

    /// Create a runner with custom configuration.
    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run the session loop on stdin/stdout.
    pub fn run(self) -> Result<(), RunnerError> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the session loop on arbitrary streams.
    pub fn run_with<I: BufRead, O: Write>(self, input: I, output: O) -> Result<(), RunnerError> {
        let scenario = match &self.config.scenario_path {
            Some(path) => ScenarioConfig::load(path)?,
            None => ScenarioConfig::default(),
        };
        let seed = self.config.seed.unwrap_or_else(seed_from_time);
        tracing::info!(seed, scenario = %scenario.name, "Starting headless session");

        let session = Session::generate(scenario, seed);
        self.run_session(session, input, output)
    }

    /// Drive an already-built session.
    pub fn run_session<R, I, O>(
        &self,
        mut session: Session<R>,
        input: I,
        mut output: O,
    ) -> Result<(), RunnerError>
    where
        R: RandomSource,
        I: BufRead,
        O: Write,
    {
        let mut clock = Clock::new(self.config.clock);
        let mut reported = false;

        send(
            &mut output,
            &Response::ready(session.outposts().len(), session.reserve()),
        )?;
        let events = session.poll(clock.elapsed());
        send_events(&mut output, clock.elapsed(), events, false)?;
        report_game_over(&mut output, &session, &mut reported)?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let cmd = match Command::from_json(line) {
                Ok(cmd) => cmd,
                Err(e) => {
                    send(&mut output, &Response::error(e.to_string(), None))?;
                    continue;
                }
            };
            let cmd_name = cmd.name();
            tracing::debug!(cmd = cmd_name, "Command received");

            // Wall time may have moved since the last command.
            let events = session.poll(clock.elapsed());
            send_events(&mut output, clock.elapsed(), events, false)?;

            match cmd {
                Command::State => {
                    send(&mut output, &Response::state(&session, clock.elapsed()))?;
                }

                Command::Suggest => {
                    send(&mut output, &Response::suggestion(&mut session))?;
                }

                Command::Hash => {
                    send(
                        &mut output,
                        &Response::StateHash {
                            elapsed_secs: clock.elapsed().as_secs_f64(),
                            hash: session.state_hash(),
                        },
                    )?;
                }

                Command::Reinforce { outpost, troops } => {
                    let response = reinforce(&mut session, outpost, &troops.as_raw(), &clock);
                    match response {
                        Ok(()) => {
                            let events = session.poll(clock.elapsed());
                            send_events(&mut output, clock.elapsed(), events, true)?;
                        }
                        Err(message) => {
                            send(&mut output, &Response::error(message, Some(cmd_name)))?;
                        }
                    }
                }

                Command::Wait { seconds } => {
                    if !seconds.is_finite() || seconds < 0.0 || seconds > MAX_WAIT_SECS {
                        send(
                            &mut output,
                            &Response::error(
                                format!("Wait must be between 0 and {MAX_WAIT_SECS} seconds"),
                                Some(cmd_name),
                            ),
                        )?;
                        continue;
                    }
                    let events = wait(&mut session, &mut clock, Duration::from_secs_f64(seconds));
                    send_events(&mut output, clock.elapsed(), events, true)?;
                }

                Command::Quit => {
                    send(&mut output, &Response::Bye)?;
                    tracing::info!("Quit received");
                    return Ok(());
                }
            }

            if self.config.auto_state {
                send(&mut output, &Response::state(&session, clock.elapsed()))?;
            }
            report_game_over(&mut output, &session, &mut reported)?;
        }

        tracing::info!("Input closed");
        Ok(())
    }
}

impl Default for HeadlessRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate and submit a reinforcement order. Errors are player-facing messages.
fn reinforce<R: RandomSource>(
    session: &mut Session<R>,
    outpost: u32,
    raw_troops: &str,
    clock: &Clock,
) -> Result<(), String> {
    if session.is_over() {
        return Err(GameError::GameOver.to_string());
    }
    let troops = validate_troops(raw_troops, session.reserve()).map_err(|e| e.to_string())?;
    let id = OutpostId(outpost);
    let outcome = session
        .submit_reinforcements(id, troops, clock.elapsed())
        .map_err(|e| e.to_string())?;

    if outcome.is_resolved() {
        Ok(())
    } else {
        let name = session.outpost(id).map_or("that outpost", |o| o.name.as_str());
        Err(format!("No aliens at {name}; reinforcements stayed at base"))
    }
}

fn wait<R: RandomSource>(
    session: &mut Session<R>,
    clock: &mut Clock,
    total: Duration,
) -> Vec<TurnEvent> {
    let mut events = Vec::new();
    let mut remaining = total;
    while !remaining.is_zero() && !session.is_over() {
        let step = remaining.min(WAIT_STEP);
        clock.advance(step);
        remaining -= step;
        events.extend(session.poll(clock.elapsed()));
    }
    events
}

fn send<O: Write>(output: &mut O, response: &Response) -> io::Result<()> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()
}

fn send_events<O: Write>(
    output: &mut O,
    elapsed: Duration,
    events: Vec<TurnEvent>,
    always: bool,
) -> io::Result<()> {
    if events.is_empty() && !always {
        return Ok(());
    }
    send(
        output,
        &Response::Events {
            elapsed_secs: elapsed.as_secs_f64(),
            events,
        },
    )
}

fn report_game_over<R: RandomSource, O: Write>(
    output: &mut O,
    session: &Session<R>,
    reported: &mut bool,
) -> io::Result<()> {
    if *reported {
        return Ok(());
    }
    if let Some(outcome) = session.outcome() {
        *reported = true;
        send(output, &Response::game_over(session, outcome))?;
    }
    Ok(())
}

fn seed_from_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}
