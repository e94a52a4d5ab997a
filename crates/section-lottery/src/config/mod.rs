use crate::intake::ColumnLayout;
use crate::lottery::CohortSelector;
use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the lottery tooling.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub intake: IntakeConfig,
    pub report: ReportConfig,
    /// Fallback for `--section-limit` when the flag is omitted.
    pub default_section_limit: Option<usize>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("LOTTERY_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("LOTTERY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let default_section_limit = match env::var("LOTTERY_SECTION_LIMIT") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_section_limit(&raw)?),
            _ => None,
        };

        let slot_a_token = token_var("LOTTERY_SLOT_A_TOKEN", "T")?;
        let slot_b_token = token_var("LOTTERY_SLOT_B_TOKEN", "F")?;

        let dummy_entries = env::var("LOTTERY_DUMMY_ENTRIES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_else(|_| vec!["David Miller".to_string()]);

        let slot_a_label =
            env::var("LOTTERY_SLOT_A_LABEL").unwrap_or_else(|_| "Tuesday".to_string());
        let slot_b_label =
            env::var("LOTTERY_SLOT_B_LABEL").unwrap_or_else(|_| "Friday".to_string());

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            intake: IntakeConfig {
                columns: ColumnLayout::default(),
                slot_a_token,
                slot_b_token,
                dummy_entries,
            },
            report: ReportConfig {
                slot_a_label,
                slot_b_label,
            },
            default_section_limit,
        })
    }
}

fn token_var(name: &'static str, default: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(raw) => {
            let token = raw.trim();
            if token.is_empty() {
                Err(ConfigError::EmptySlotToken { variable: name })
            } else {
                Ok(token.to_string())
            }
        }
        Err(_) => Ok(default.to_string()),
    }
}

/// Parses a section capacity, rejecting zero and non-numeric input.
pub fn parse_section_limit(raw: &str) -> Result<usize, ConfigError> {
    let value = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidSectionLimit {
            value: raw.to_string(),
        })?;

    if value == 0 {
        return Err(ConfigError::SectionLimitNotPositive);
    }

    Ok(value)
}

/// How registration exports are read and cleaned.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub columns: ColumnLayout,
    pub slot_a_token: String,
    pub slot_b_token: String,
    /// Test or placeholder identities ("First Last") dropped during cleaning.
    pub dummy_entries: Vec<String>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            columns: ColumnLayout::default(),
            slot_a_token: "T".to_string(),
            slot_b_token: "F".to_string(),
            dummy_entries: vec!["David Miller".to_string()],
        }
    }
}

/// Human-facing section names used by the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub slot_a_label: String,
    pub slot_b_label: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            slot_a_label: "Tuesday".to_string(),
            slot_b_label: "Friday".to_string(),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Validated parameters for a single lottery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotteryConfig {
    section_limit: usize,
    cohort: CohortSelector,
    seed: Option<u64>,
}

impl LotteryConfig {
    pub fn new(
        section_limit: usize,
        cohort: CohortSelector,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        if section_limit == 0 {
            return Err(ConfigError::SectionLimitNotPositive);
        }

        Ok(Self {
            section_limit,
            cohort,
            seed,
        })
    }

    pub const fn section_limit(&self) -> usize {
        self.section_limit
    }

    pub const fn cohort(&self) -> CohortSelector {
        self.cohort
    }

    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Combined capacity of both sections, saturating at `usize::MAX`.
    pub const fn total_capacity(&self) -> usize {
        self.section_limit.saturating_mul(2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidSectionLimit { value: String },
    SectionLimitNotPositive,
    MissingSectionLimit,
    CohortConflict,
    CohortUnselected,
    EmptySlotToken { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSectionLimit { value } => {
                write!(f, "section limit '{value}' must be a positive integer")
            }
            ConfigError::SectionLimitNotPositive => {
                write!(f, "section limit must be greater than zero")
            }
            ConfigError::MissingSectionLimit => write!(
                f,
                "no section limit given; pass --section-limit or set LOTTERY_SECTION_LIMIT"
            ),
            ConfigError::CohortConflict => write!(
                f,
                "select exactly one cohort: --returning and --firsttime are mutually exclusive"
            ),
            ConfigError::CohortUnselected => {
                write!(f, "select exactly one cohort with --returning or --firsttime")
            }
            ConfigError::EmptySlotToken { variable } => {
                write!(f, "{variable} must not be empty")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "LOTTERY_ENV",
            "LOTTERY_LOG_LEVEL",
            "LOTTERY_SECTION_LIMIT",
            "LOTTERY_SLOT_A_TOKEN",
            "LOTTERY_SLOT_B_TOKEN",
            "LOTTERY_SLOT_A_LABEL",
            "LOTTERY_SLOT_B_LABEL",
            "LOTTERY_DUMMY_ENTRIES",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.default_section_limit, None);
        assert_eq!(config.intake.slot_a_token, "T");
        assert_eq!(config.intake.slot_b_token, "F");
        assert_eq!(config.intake.dummy_entries, vec!["David Miller".to_string()]);
        assert_eq!(config.report, ReportConfig::default());
    }

    #[test]
    fn load_reads_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOTTERY_ENV", "ci");
        env::set_var("LOTTERY_SECTION_LIMIT", " 12 ");
        env::set_var("LOTTERY_DUMMY_ENTRIES", "Test Kid, ,Jane Placeholder");
        env::set_var("LOTTERY_SLOT_A_LABEL", "Monday");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Test);
        assert_eq!(config.default_section_limit, Some(12));
        assert_eq!(
            config.intake.dummy_entries,
            vec!["Test Kid".to_string(), "Jane Placeholder".to_string()]
        );
        assert_eq!(config.report.slot_a_label, "Monday");
        reset_env();
    }

    #[test]
    fn load_rejects_zero_section_limit() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOTTERY_SECTION_LIMIT", "0");
        let error = AppConfig::load().expect_err("zero limit rejected");
        assert_eq!(error, ConfigError::SectionLimitNotPositive);
        reset_env();
    }

    #[test]
    fn load_rejects_blank_slot_token() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOTTERY_SLOT_B_TOKEN", "   ");
        let error = AppConfig::load().expect_err("blank token rejected");
        assert_eq!(
            error,
            ConfigError::EmptySlotToken {
                variable: "LOTTERY_SLOT_B_TOKEN"
            }
        );
        reset_env();
    }

    #[test]
    fn parse_section_limit_rejects_garbage() {
        assert_eq!(parse_section_limit("16"), Ok(16));
        assert!(matches!(
            parse_section_limit("-3"),
            Err(ConfigError::InvalidSectionLimit { .. })
        ));
        assert_eq!(
            parse_section_limit("0"),
            Err(ConfigError::SectionLimitNotPositive)
        );
    }

    #[test]
    fn lottery_config_requires_positive_limit() {
        let error = LotteryConfig::new(0, CohortSelector::Returning, None)
            .expect_err("zero limit rejected");
        assert_eq!(error, ConfigError::SectionLimitNotPositive);

        let config =
            LotteryConfig::new(8, CohortSelector::FirstTime, Some(7)).expect("valid config");
        assert_eq!(config.total_capacity(), 16);
        assert_eq!(config.seed(), Some(7));
    }

    #[test]
    fn total_capacity_saturates_for_huge_limits() {
        let config = LotteryConfig::new(usize::MAX, CohortSelector::FirstTime, None)
            .expect("any positive limit is valid");
        assert_eq!(config.total_capacity(), usize::MAX);
    }
}
