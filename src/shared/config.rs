//! Application configuration. API credentials, paths, game tuning.

use crate::domain::{LedgerScope, PointValues, SelectionMode};
use serde::Deserialize;
use std::time::Duration;

/// Auto-rotation period in seconds when unset (one round per hour).
pub const DEFAULT_ROUND_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Deserialize, Default)]
pub struct BotConfig {
    pub api_id: Option<i32>,
    pub api_hash: Option<String>,
    /// Bot token. Read from WORTRUNDE_BOT_TOKEN or plain BOT_TOKEN.
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Moderator user id (exact string match). Unset = everyone may
    /// moderate. Read from WORTRUNDE_ADMIN_ID or plain ADMIN_ID.
    #[serde(default)]
    pub admin_id: Option<String>,

    pub words_path: Option<String>,
    pub scores_path: Option<String>,
    pub session_path: Option<String>,

    /// Word selection mode: "sequential" (default) or "random".
    #[serde(default)]
    pub selection: Option<String>,

    /// Score scope: "group" (default) or "global".
    #[serde(default)]
    pub ledger_scope: Option<String>,

    /// Seconds between automatic rotations (default 3600). Read from
    /// WORTRUNDE_ROUND_INTERVAL_SECS.
    #[serde(default)]
    pub round_interval_secs: Option<u64>,

    /// Pause in seconds between the expiry notice and the next word
    /// (default 0). Read from WORTRUNDE_ROTATION_GRACE_SECS.
    #[serde(default)]
    pub rotation_grace_secs: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────
    // Point values (observed deployments disagree on first_guess: 1 vs 3)
    // ─────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub first_guess_points: Option<u64>,
    #[serde(default)]
    pub sentence_points: Option<u64>,
    #[serde(default)]
    pub bonus_points: Option<u64>,
}

impl BotConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("WORTRUNDE"));
        if let Ok(path) = std::env::var("WORTRUNDE_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // BOT_TOKEN / ADMIN_ID are also read bare so .env files written for
        // earlier deployments keep working.
        if cfg.bot_token.is_none() {
            cfg.bot_token = std::env::var("BOT_TOKEN").ok();
        }
        if cfg.admin_id.is_none() {
            cfg.admin_id = std::env::var("ADMIN_ID").ok();
        }
        // Numeric knobs are parsed directly: the env source yields strings.
        if let Ok(s) = std::env::var("WORTRUNDE_ROUND_INTERVAL_SECS") {
            if let Ok(n) = s.parse::<u64>() {
                cfg.round_interval_secs = Some(n);
            }
        }
        if let Ok(s) = std::env::var("WORTRUNDE_ROTATION_GRACE_SECS") {
            if let Ok(n) = s.parse::<u64>() {
                cfg.rotation_grace_secs = Some(n);
            }
        }
        if let Ok(s) = std::env::var("WORTRUNDE_FIRST_GUESS_POINTS") {
            if let Ok(n) = s.parse::<u64>() {
                cfg.first_guess_points = Some(n);
            }
        }
        if let Ok(s) = std::env::var("WORTRUNDE_SENTENCE_POINTS") {
            if let Ok(n) = s.parse::<u64>() {
                cfg.sentence_points = Some(n);
            }
        }
        if let Ok(s) = std::env::var("WORTRUNDE_BONUS_POINTS") {
            if let Ok(n) = s.parse::<u64>() {
                cfg.bonus_points = Some(n);
            }
        }
        Ok(cfg)
    }

    pub fn words_path_or_default(&self) -> String {
        self.words_path
            .clone()
            .unwrap_or_else(|| "./words.txt".to_string())
    }

    pub fn scores_path_or_default(&self) -> String {
        self.scores_path
            .clone()
            .unwrap_or_else(|| "./points.json".to_string())
    }

    pub fn session_path_or_default(&self) -> String {
        self.session_path
            .clone()
            .unwrap_or_else(|| "./session.db".to_string())
    }

    /// Selection mode; anything other than "random" means sequential.
    pub fn selection_mode(&self) -> SelectionMode {
        match self.selection.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("random") => SelectionMode::Random,
            _ => SelectionMode::Sequential,
        }
    }

    /// Ledger scope; anything other than "global" means per-group.
    pub fn ledger_scope(&self) -> LedgerScope {
        match self.ledger_scope.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("global") => LedgerScope::Global,
            _ => LedgerScope::PerGroup,
        }
    }

    pub fn point_values(&self) -> PointValues {
        let defaults = PointValues::default();
        PointValues {
            first_guess: self.first_guess_points.unwrap_or(defaults.first_guess),
            sentence: self.sentence_points.unwrap_or(defaults.sentence),
            bonus: self.bonus_points.unwrap_or(defaults.bonus),
        }
    }

    pub fn round_interval(&self) -> Duration {
        Duration::from_secs(
            self.round_interval_secs
                .unwrap_or(DEFAULT_ROUND_INTERVAL_SECS),
        )
    }

    pub fn rotation_grace(&self) -> Duration {
        Duration::from_secs(self.rotation_grace_secs.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_mode_parses_random_case_insensitively() {
        let cfg = BotConfig {
            selection: Some("Random".into()),
            ..BotConfig::default()
        };
        assert_eq!(cfg.selection_mode(), SelectionMode::Random);
        assert_eq!(BotConfig::default().selection_mode(), SelectionMode::Sequential);
    }

    #[test]
    fn test_ledger_scope_defaults_to_per_group() {
        assert_eq!(BotConfig::default().ledger_scope(), LedgerScope::PerGroup);
        let cfg = BotConfig {
            ledger_scope: Some("global".into()),
            ..BotConfig::default()
        };
        assert_eq!(cfg.ledger_scope(), LedgerScope::Global);
    }

    #[test]
    fn test_point_values_fall_back_per_field() {
        let cfg = BotConfig {
            first_guess_points: Some(3),
            ..BotConfig::default()
        };
        let points = cfg.point_values();
        assert_eq!(points.first_guess, 3);
        assert_eq!(points.sentence, 2);
        assert_eq!(points.bonus, 3);
    }

    #[test]
    fn test_interval_defaults() {
        let cfg = BotConfig::default();
        assert_eq!(cfg.round_interval(), Duration::from_secs(3600));
        assert_eq!(cfg.rotation_grace(), Duration::ZERO);
    }
}
