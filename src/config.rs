use crate::domain::{Address, BlockNumber, Decimal, Interval};
use crate::engine::DEFAULT_REWARD_SCALE;
use crate::report::{ReportFormat, DEFAULT_CLAIM_REASON};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub tracked_recipient: Address,
    pub start_block: BlockNumber,
    pub end_block: BlockNumber,
    pub total_rewards: Decimal,
    pub events_path: String,
    pub report_format: ReportFormat,
    pub reward_scale: u32,
    pub claim_reason: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let tracked_recipient = Address::parse(required(&env_map, "TRACKED_RECIPIENT")?)
            .map_err(|e| ConfigError::InvalidValue("TRACKED_RECIPIENT".to_string(), e.to_string()))?;

        let start_block = parse_block(&env_map, "START_BLOCK")?;
        let end_block = parse_block(&env_map, "END_BLOCK")?;

        let total_rewards = Decimal::from_str_canonical(required(&env_map, "TOTAL_REWARDS")?)
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "TOTAL_REWARDS".to_string(),
                    "must be a decimal number".to_string(),
                )
            })?;

        let events_path = required(&env_map, "EVENTS_PATH")?.to_string();

        let report_format = env_map
            .get("REPORT_FORMAT")
            .map(|s| s.as_str())
            .unwrap_or("csv")
            .parse::<ReportFormat>()
            .map_err(|e| ConfigError::InvalidValue("REPORT_FORMAT".to_string(), e))?;

        let reward_scale = match env_map.get("REWARD_SCALE") {
            Some(s) => s
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|scale| *scale <= 28)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "REWARD_SCALE".to_string(),
                        "must be an integer between 0 and 28".to_string(),
                    )
                })?,
            None => DEFAULT_REWARD_SCALE,
        };

        let claim_reason = match env_map.get("CLAIM_REASON").map(|s| s.trim()) {
            Some("") => {
                return Err(ConfigError::InvalidValue(
                    "CLAIM_REASON".to_string(),
                    "must not be empty".to_string(),
                ))
            }
            Some(reason) => reason.to_string(),
            None => DEFAULT_CLAIM_REASON.to_string(),
        };

        Ok(Config {
            tracked_recipient,
            start_block,
            end_block,
            total_rewards,
            events_path,
            report_format,
            reward_scale,
            claim_reason,
        })
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start_block, self.end_block, self.total_rewards)
    }
}

fn required<'a>(env_map: &'a HashMap<String, String>, key: &str) -> Result<&'a str, ConfigError> {
    env_map
        .get(key)
        .map(|s| s.as_str())
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

fn parse_block(env_map: &HashMap<String, String>, key: &str) -> Result<BlockNumber, ConfigError> {
    required(env_map, key)?
        .trim()
        .parse::<u64>()
        .map(BlockNumber::new)
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), "must be a valid u64".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(
            "TRACKED_RECIPIENT".to_string(),
            "0x46abFE1C972fCa43766d6aD70E1c1Df72F4Bb4d1".to_string(),
        );
        map.insert("START_BLOCK".to_string(), "13215121".to_string());
        map.insert("END_BLOCK".to_string(), "13215429".to_string());
        map.insert("TOTAL_REWARDS".to_string(), "32000".to_string());
        map.insert("EVENTS_PATH".to_string(), "/tmp/events.json".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.report_format, ReportFormat::Csv);
        assert_eq!(config.reward_scale, DEFAULT_REWARD_SCALE);
        assert_eq!(config.claim_reason, DEFAULT_CLAIM_REASON);
        assert_eq!(
            config.tracked_recipient.as_str(),
            "0x46abfe1c972fca43766d6ad70e1c1df72f4bb4d1"
        );

        let interval = config.interval();
        assert_eq!(interval.start_block, BlockNumber::new(13215121));
        assert_eq!(interval.end_block, BlockNumber::new(13215429));
        assert_eq!(interval.total_budget, Decimal::from(32000u64));
    }

    #[test]
    fn test_missing_tracked_recipient() {
        let mut env_map = setup_required_env();
        env_map.remove("TRACKED_RECIPIENT");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "TRACKED_RECIPIENT"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_events_path() {
        let mut env_map = setup_required_env();
        env_map.remove("EVENTS_PATH");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "EVENTS_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_recipient() {
        let mut env_map = setup_required_env();
        env_map.insert("TRACKED_RECIPIENT".to_string(), "0x123".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "TRACKED_RECIPIENT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_end_block() {
        let mut env_map = setup_required_env();
        env_map.insert("END_BLOCK".to_string(), "-5".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "END_BLOCK"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_total_rewards() {
        let mut env_map = setup_required_env();
        env_map.insert("TOTAL_REWARDS".to_string(), "lots".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "TOTAL_REWARDS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_report_format() {
        let mut env_map = setup_required_env();
        env_map.insert("REPORT_FORMAT".to_string(), "xml".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "REPORT_FORMAT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_reward_scale_bounds() {
        let mut env_map = setup_required_env();
        env_map.insert("REWARD_SCALE".to_string(), "6".to_string());
        assert_eq!(Config::from_env_map(env_map.clone()).unwrap().reward_scale, 6);

        env_map.insert("REWARD_SCALE".to_string(), "29".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "REWARD_SCALE"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_claim_reason() {
        let mut env_map = setup_required_env();
        env_map.insert("REPORT_FORMAT".to_string(), "claims".to_string());
        env_map.insert("CLAIM_REASON".to_string(), " Delegation Epoch 2 ".to_string());
        let config = Config::from_env_map(env_map.clone()).unwrap();
        assert_eq!(config.report_format, ReportFormat::Claims);
        assert_eq!(config.claim_reason, "Delegation Epoch 2");

        env_map.insert("CLAIM_REASON".to_string(), "   ".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "CLAIM_REASON"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
