#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use std::io::{self, BufWriter, Write};
use std::sync::Arc;

use clap::Parser;
use idlab::{
    MonotonicClock, OsRandom, Registry, SharedClock, SharedRandom, Strategy, SystemClock,
    ThreadRandom,
};

use crate::{
    config::{AppConfig, CliArgs, ClockKind, Command, EntropyKind},
    telemetry::init_telemetry,
};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;
    init_telemetry()?;
    tracing::debug!(?config, "configuration loaded");

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match config.command {
        Command::List => write_strategy_list(&mut out)?,
        Command::Generate { strategy, count } => {
            let registry = build_registry(&config)?;
            for _ in 0..count {
                writeln!(out, "{}", registry.generate(strategy.name())?)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn build_registry(config: &AppConfig) -> anyhow::Result<Registry> {
    let clock: SharedClock = match config.clock {
        ClockKind::System => Arc::new(SystemClock),
        ClockKind::Monotonic => Arc::new(MonotonicClock::new()),
    };
    let rng: SharedRandom = match config.entropy {
        EntropyKind::Thread => Arc::new(ThreadRandom),
        EntropyKind::Os => Arc::new(OsRandom),
    };
    let registry = Registry::builder()
        .clock(clock)
        .rng(rng)
        .node_sources(config.node_sources.iter().cloned())
        .max_wait(config.max_wait)
        .build()?;
    Ok(registry)
}

/// Prints one row per strategy: name, aliases and family, in aligned columns.
fn write_strategy_list(out: &mut impl Write) -> io::Result<()> {
    let rows: Vec<[String; 3]> = Strategy::ALL
        .iter()
        .map(|strategy| {
            let aliases = match strategy.aliases() {
                [] => "-".to_owned(),
                aliases => aliases.join(","),
            };
            let family = match strategy.wraps() {
                Some(inner) => format!("{}({inner})", strategy.family()),
                None => strategy.family().to_string(),
            };
            [strategy.name().to_owned(), aliases, family]
        })
        .collect();
    let name_width = rows.iter().map(|[name, ..]| name.len()).max().unwrap_or(0);
    let alias_width = rows.iter().map(|[_, aliases, _]| aliases.len()).max().unwrap_or(0);
    for [name, aliases, family] in &rows {
        writeln!(out, "{name:<name_width$}  {aliases:<alias_width$}  {family}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_list_columns_line_up() {
        let mut buf = Vec::new();
        write_strategy_list(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), Strategy::ALL.len());

        let family_column = |line: &str| line.trim_end().rfind("  ").map(|i| i + 2);
        let column = family_column(lines[0]);
        assert!(column.is_some());
        for &line in &lines {
            assert_eq!(family_column(line), column, "{line:?}");
        }
        assert!(text.contains("time-sortable-32-monotonic  ulid-monotonic"));
        assert!(
            lines
                .iter()
                .any(|line| line.starts_with("compact-encoded ")
                    && line.ends_with("compact(pure-random)"))
        );
    }
}
