//! Command-line definition and option overrides

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use scout_core::{ScoutConfig, SeedFilter, SeedItem};
use std::path::Path;
use std::time::Duration;

/// Build the `scout` command
#[must_use]
pub fn command() -> Command {
    Command::new("scout")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Discover storefront media assets from product codes")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON on stderr"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_name("FILE")
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .value_name("URL")
                .help("Storefront base URL"),
        )
        .subcommand(
            Command::new("probe")
                .about("Probe candidate locators for a batch of seeds")
                .arg(
                    Arg::new("seeds")
                        .long("seeds")
                        .short('s')
                        .required(true)
                        .value_name("FILE")
                        .help("JSON array of seed items"),
                )
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .value_name("TOKENS")
                        .help("Keep seeds whose title contains every token"),
                )
                .args(generation_args())
                .arg(
                    Arg::new("concurrency")
                        .long("concurrency")
                        .short('j')
                        .value_parser(value_parser!(usize))
                        .help("Concurrent existence checks"),
                )
                .arg(
                    Arg::new("timeout-ms")
                        .long("timeout-ms")
                        .value_parser(value_parser!(u64))
                        .help("Per-request timeout in milliseconds"),
                )
                .arg(
                    Arg::new("deadline-ms")
                        .long("deadline-ms")
                        .value_parser(value_parser!(u64))
                        .help("Session deadline in milliseconds (0 disables)"),
                )
                .arg(
                    Arg::new("spacing-ms")
                        .long("spacing-ms")
                        .value_parser(value_parser!(u64))
                        .help("Delay before each check, per worker, in milliseconds"),
                )
                .arg(
                    Arg::new("short-circuit")
                        .long("short-circuit")
                        .value_parser(value_parser!(u32))
                        .help("Stop a sequence after this many consecutive not-found results"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("candidates")
                .about("Print the candidates generated for one code without probing")
                .arg(
                    Arg::new("code")
                        .required(true)
                        .value_name("CODE")
                        .help("Product or card code"),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .value_name("TEXT")
                        .help("Listing title"),
                )
                .arg(
                    Arg::new("date")
                        .long("date")
                        .value_name("YYYY-MM-DD")
                        .value_parser(value_parser!(NaiveDate))
                        .help("Observed listing date"),
                )
                .args(generation_args()),
        )
        .subcommand(
            Command::new("conventions")
                .about("List the naming conventions in effect")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn generation_args() -> [Arg; 4] {
    [
        Arg::new("min")
            .long("min")
            .value_parser(value_parser!(u32))
            .help("First sequence index"),
        Arg::new("max")
            .long("max")
            .value_parser(value_parser!(u32))
            .help("Last sequence index"),
        Arg::new("prefix")
            .long("prefix")
            .short('p')
            .action(ArgAction::Append)
            .value_name("PREFIX")
            .help("Extra sequence prefix (repeatable)"),
        Arg::new("max-candidates")
            .long("max-candidates")
            .value_parser(value_parser!(usize))
            .help("Cap on candidates per seed"),
    ]
}

/// Load the config file named by `--config`, or the defaults
///
/// # Errors
/// Fails if the file cannot be read, parsed or validated.
pub fn load_config(matches: &ArgMatches) -> Result<ScoutConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => ScoutConfig::from_path(path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => ScoutConfig::default(),
    };
    if let Some(url) = matches.get_one::<String>("base-url") {
        config.base_url.clone_from(url);
    }
    Ok(config)
}

/// Apply generation flags to `config`
pub fn apply_generation(matches: &ArgMatches, config: &mut ScoutConfig) {
    let generate = &mut config.generate;
    if let Some(min) = matches.get_one::<u32>("min") {
        generate.sequence_range.min = *min;
    }
    if let Some(max) = matches.get_one::<u32>("max") {
        generate.sequence_range.max = *max;
    }
    if let Some(prefixes) = matches.get_many::<String>("prefix") {
        generate.extra_prefixes.extend(prefixes.cloned());
    }
    if let Some(cap) = matches.get_one::<usize>("max-candidates") {
        generate.max_candidates = *cap;
    }
}

/// Apply probe flags to `config`
pub fn apply_probe(matches: &ArgMatches, config: &mut ScoutConfig) {
    let probe = &mut config.probe;
    if let Some(workers) = matches.get_one::<usize>("concurrency") {
        probe.concurrency = *workers;
    }
    if let Some(ms) = matches.get_one::<u64>("timeout-ms") {
        probe.request_timeout_ms = *ms;
    }
    if let Some(ms) = matches.get_one::<u64>("deadline-ms") {
        probe.overall_deadline_ms = (*ms > 0).then_some(*ms);
    }
    if let Some(ms) = matches.get_one::<u64>("spacing-ms") {
        probe.min_request_spacing_ms = *ms;
    }
    if let Some(misses) = matches.get_one::<u32>("short-circuit") {
        probe.short_circuit_after = Some(*misses);
    }
}

/// Read seeds from a JSON file and apply the `--filter` tokens
///
/// # Errors
/// Fails if the file cannot be read or is not a JSON array of seeds.
pub fn load_seeds(path: &Path, filter: Option<&str>) -> Result<Vec<SeedItem>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading seeds from {}", path.display()))?;
    let seeds: Vec<SeedItem> = serde_json::from_str(&text)
        .with_context(|| format!("parsing seeds in {}", path.display()))?;
    Ok(match filter {
        Some(tokens) => SeedFilter::parse(tokens).apply(seeds),
        None => seeds,
    })
}

/// Transport timeout for the HTTP client, a little above the probe timeout
#[must_use]
pub fn transport_timeout(config: &ScoutConfig) -> Duration {
    config.probe.request_timeout() + Duration::from_secs(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        command().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn probe_flags_override_config() {
        let matches = parse(&[
            "scout",
            "--base-url",
            "https://store.example",
            "probe",
            "--seeds",
            "seeds.json",
            "--min",
            "2",
            "--max",
            "9",
            "-p",
            "SP1",
            "-p",
            "SP2",
            "-j",
            "3",
            "--deadline-ms",
            "0",
            "--short-circuit",
            "4",
        ]);
        let (_, sub) = matches.subcommand().unwrap();

        let mut config = load_config(sub).unwrap();
        apply_generation(sub, &mut config);
        apply_probe(sub, &mut config);

        assert_eq!(config.base_url, "https://store.example");
        assert_eq!(config.generate.sequence_range.min, 2);
        assert_eq!(config.generate.sequence_range.max, 9);
        assert_eq!(config.generate.extra_prefixes, vec!["SP1", "SP2"]);
        assert_eq!(config.probe.concurrency, 3);
        assert_eq!(config.probe.overall_deadline_ms, None);
        assert_eq!(config.probe.short_circuit_after, Some(4));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn candidates_accepts_date() {
        let matches = parse(&["scout", "candidates", "AB100", "--date", "2024-03-15"]);
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "candidates");
        assert_eq!(
            sub.get_one::<NaiveDate>("date").copied(),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
    }

    #[test]
    fn probe_requires_seeds() {
        assert!(command()
            .try_get_matches_from(["scout", "probe"])
            .is_err());
    }
}
