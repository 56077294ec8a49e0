//! Mods classification
//!
//! `calculate_score` takes mods as text and the native library reads that text
//! in one of four shapes. This module classifies a mods string the same way,
//! using the same `rosu-mods` types, so callers can check it before a call (the
//! native side silently falls back to no mods on anything it cannot parse) and
//! can lower it to the legacy bitmask `calculate_score_bytes` expects.

use std::fmt;

use rosu_mods::serde::GameModSeed;
use rosu_mods::{
    GameMod, GameMode as RosuGameMode, GameMods, GameModsIntermode, GameModsLegacy,
};
use serde::de::DeserializeSeed;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::ffi::GameMode;

/// Mods parsing errors.
#[derive(Debug, Error)]
pub enum ModsError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("failed to deserialize mod: {0}")]
    InvalidMod(#[source] serde_json::Error),
}

/// Result type for mods operations.
pub type ModsResult<T> = Result<T, ModsError>;

/// A mods string, classified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "mods", rename_all = "lowercase")]
pub enum Mods {
    /// Empty or whitespace
    NoMod,
    /// A decimal legacy bitmask, e.g. `"72"`. Unknown bits are dropped.
    Bits(GameModsLegacy),
    /// Concatenated acronyms, e.g. `"HDDT"`. Unknown acronyms are kept.
    Acronyms(GameModsIntermode),
    /// A JSON array or object, e.g. `["HD", {"acronym": "DT"}]`
    Json(GameMods),
}

impl Mods {
    /// Classify a mods string for `mode`.
    ///
    /// Only JSON input can fail. JSON mods are resolved against `mode`; the
    /// other shapes do not depend on it.
    pub fn parse(input: &str, mode: GameMode) -> ModsResult<Self> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Ok(Mods::NoMod);
        }

        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return Self::parse_json(trimmed, mode);
        }

        if let Ok(bits) = trimmed.parse::<u32>() {
            return Ok(Mods::Bits(GameModsLegacy::from_bits(bits)));
        }

        Ok(Mods::Acronyms(GameModsIntermode::from_acronyms(trimmed)))
    }

    fn parse_json(json: &str, mode: GameMode) -> ModsResult<Self> {
        let seed = GameModSeed::Mode {
            mode: rosu_mode(mode),
            deny_unknown_fields: false,
        };

        let mods = match serde_json::from_str::<Value>(json)? {
            Value::Array(values) => values
                .into_iter()
                .map(|value| seed.deserialize(value).map_err(ModsError::InvalidMod))
                .collect::<ModsResult<GameMods>>()?,
            single => GameMods::from(seed.deserialize(single).map_err(ModsError::InvalidMod)?),
        };

        Ok(Mods::Json(mods))
    }

    /// Short name of the classification.
    pub fn kind(&self) -> &'static str {
        match self {
            Mods::NoMod => "nomod",
            Mods::Bits(_) => "bits",
            Mods::Acronyms(_) => "acronyms",
            Mods::Json(_) => "json",
        }
    }

    /// Legacy bitmask, when every mod has one.
    ///
    /// JSON mods with non-default settings have none, since the bitmask
    /// cannot carry the settings.
    pub fn legacy_bits(&self) -> Option<u32> {
        match self {
            Mods::NoMod => Some(0),
            Mods::Bits(legacy) => Some(legacy.bits()),
            Mods::Acronyms(intermode) => intermode.checked_bits(),
            Mods::Json(mods) => {
                let customized = mods
                    .iter()
                    .any(|m| *m != GameMod::new(m.acronym().as_str(), m.mode()));
                if customized {
                    None
                } else {
                    mods.checked_bits()
                }
            }
        }
    }
}

impl fmt::Display for Mods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mods::NoMod => write!(f, "NM"),
            Mods::Bits(legacy) => write!(f, "{}", legacy),
            Mods::Acronyms(intermode) => write!(f, "{}", intermode),
            Mods::Json(mods) => {
                let json = serde_json::to_string(mods).map_err(|_| fmt::Error)?;
                write!(f, "{}", json)
            }
        }
    }
}

fn rosu_mode(mode: GameMode) -> RosuGameMode {
    match mode {
        GameMode::Osu => RosuGameMode::Osu,
        GameMode::Taiko => RosuGameMode::Taiko,
        GameMode::Catch => RosuGameMode::Catch,
        GameMode::Mania => RosuGameMode::Mania,
    }
}
