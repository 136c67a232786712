use crate::config::EngineConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_TICKS: u64 = 900;
pub const DEFAULT_SCROLL_STEP: f32 = 1.0 / 600.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub ticks: u64,
    /// Scroll progress added per tick while sweeping the scene.
    pub scroll_step: f32,
    pub log_level: Option<log::LevelFilter>,
    seed: Option<u64>,
    skip_intro: Option<bool>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            config: None,
            ticks: DEFAULT_TICKS,
            scroll_step: DEFAULT_SCROLL_STEP,
            log_level: None,
            seed: None,
            skip_intro: None,
        }
    }
}

impl CliOptions {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = CliOptions::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(name) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Flags take the form --name value or --name=value.");
            };
            let (key, value) = match name.split_once('=') {
                Some((key, inline)) => (key, inline.to_string()),
                None => {
                    let value = iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?;
                    (name, value.as_ref().to_string())
                }
            };
            match key {
                "config" => options.config = Some(PathBuf::from(value)),
                "ticks" => {
                    options.ticks = value.parse::<u64>().with_context(|| format!("Invalid tick count '{value}'"))?;
                }
                "seed" => {
                    options.seed = Some(parse_seed(&value)?);
                }
                "skip-intro" => {
                    options.skip_intro = Some(parse_bool_flag("skip-intro", &value)?);
                }
                "scroll-step" => {
                    let step = value.parse::<f32>().with_context(|| format!("Invalid scroll step '{value}'"))?;
                    if !step.is_finite() || step < 0.0 {
                        bail!("Scroll step must be a non-negative number, got '{value}'");
                    }
                    options.scroll_step = step;
                }
                "log-level" => {
                    options.log_level = Some(parse_level(&value)?);
                }
                _ => bail!(
                    "Unknown flag '--{key}'. Supported flags: --config, --ticks, --seed, --skip-intro, --scroll-step, --log-level."
                ),
            }
        }
        Ok(options)
    }

    pub fn config_overrides(&self) -> EngineConfigOverrides {
        EngineConfigOverrides { seed: self.seed, skip_intro: self.skip_intro, ambient_count: None }
    }
}

fn parse_seed(value: &str) -> Result<u64> {
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse::<u64>(),
    };
    parsed.with_context(|| format!("Invalid seed '{value}'"))
}

pub fn parse_level(value: &str) -> Result<log::LevelFilter> {
    value.parse::<log::LevelFilter>().map_err(|_| anyhow!("Invalid log level '{value}'. Use off/error/warn/info/debug/trace."))
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}
