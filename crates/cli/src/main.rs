mod view;

use anyhow::Context;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use transcendence_core::{random_move, EngineConfig, EngineError, EventBus, GameState, RngState};
use view::{board_lines, hand_line, move_lines, side_by_side, Snapshot};

const DEFAULT_SEED: u64 = 0xC0FFEE;
const DEFAULT_MOVES: u32 = 50;
const RETRY_LIMIT: u32 = 6;

#[derive(Debug, Clone, Default)]
struct CliOptions {
    seed: Option<u64>,
    config: Option<PathBuf>,
    moves: Option<u32>,
    width: Option<usize>,
    height: Option<usize>,
    load: Option<PathBuf>,
    json: bool,
}

fn parse_cli_options(args: &[String]) -> anyhow::Result<CliOptions> {
    let mut options = CliOptions {
        config: std::env::var_os("TRANSCENDENCE_CONFIG").map(PathBuf::from),
        ..CliOptions::default()
    };
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        let value = || {
            args.get(idx + 1)
                .with_context(|| format!("{flag} needs a value"))
        };
        match flag {
            "--seed" => options.seed = Some(value()?.parse().context("--seed")?),
            "--config" | "-c" => options.config = Some(PathBuf::from(value()?)),
            "--moves" | "-n" => options.moves = Some(value()?.parse().context("--moves")?),
            "--width" => options.width = Some(value()?.parse().context("--width")?),
            "--height" => options.height = Some(value()?.parse().context("--height")?),
            "--load" => options.load = Some(PathBuf::from(value()?)),
            "--json" => {
                options.json = true;
                idx += 1;
                continue;
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        idx += 2;
    }
    Ok(options)
}

fn load_config(options: &CliOptions) -> anyhow::Result<EngineConfig> {
    let mut config = match &options.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(width) = options.width {
        config.width = width;
    }
    if let Some(height) = options.height {
        config.height = height;
    }
    Ok(config)
}

fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args)?;
    let config = load_config(&options)?;
    let seed = options.seed.unwrap_or(DEFAULT_SEED);
    let max_moves = options.moves.unwrap_or(DEFAULT_MOVES);

    let rng = RngState::from_seed(seed);
    let mut game = match &options.load {
        Some(path) => {
            info!("resuming from {}", path.display());
            load_snapshot(path)?.restore(&config, rng)?
        }
        None => GameState::new(&config, rng)?,
    };
    let mut events = EventBus::default();
    info!("seed {seed}, {}x{} board", game.board().width(), game.board().height());

    let mut played = 0;
    let mut failures = 0;
    while played < max_moves && !game.is_finished() {
        let Some(mv) = random_move(&mut game) else {
            break;
        };
        let before = board_lines(game.board());
        let card = game.hand().slot(mv.side());
        match game.apply_move(mv, &mut events) {
            Ok(_) => {
                played += 1;
                failures = 0;
            }
            Err(err @ EngineError::UnsupportedEffect(_)) if failures < RETRY_LIMIT => {
                warn!("skipping {mv:?}: {err}");
                failures += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        }
        for event in events.drain() {
            debug!("{event:?}");
        }
        if options.json {
            println!("{}", serde_json::to_string(&Snapshot::capture(&game))?);
        } else {
            let panel = side_by_side(&[before, move_lines(mv, card), board_lines(game.board())]);
            println!("{panel}\n{}\n", hand_line(&game));
        }
    }

    if game.is_finished() {
        println!("board cleared after {played} moves, {} turns left", game.turns_left());
    } else {
        println!(
            "stopped after {played} moves, {} tiles left",
            game.board().breakable().len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn parses_load_and_json_flags() {
        let options =
            parse_cli_options(&args(&["--load", "save.json", "--json", "-n", "3"])).expect("parse");
        assert_eq!(options.load, Some(PathBuf::from("save.json")));
        assert!(options.json);
        assert_eq!(options.moves, Some(3));
    }

    #[test]
    fn rejects_missing_values_and_unknown_flags() {
        assert!(parse_cli_options(&args(&["--load"])).is_err());
        assert!(parse_cli_options(&args(&["--frobnicate"])).is_err());
    }
}
