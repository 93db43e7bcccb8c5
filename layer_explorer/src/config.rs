//! Env parsing and defaults for the host binary.

use std::path::PathBuf;
use std::str::FromStr;

use crate::host::ExplodeAmount;
use crate::scene::surface::{DEFAULT_SEGMENTS, MAX_SEGMENTS};

pub const DEFAULT_WINDOW: (f32, f32) = (1280.0, 720.0);

/// Settings the host reads from the environment before building the app.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplorerConfig {
    pub explode: f32,
    pub surface_segments: u32,
    pub window_resolution: (f32, f32),
    pub catalog_path: Option<PathBuf>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            explode: ExplodeAmount::default().get(),
            surface_segments: DEFAULT_SEGMENTS,
            window_resolution: DEFAULT_WINDOW,
            catalog_path: None,
        }
    }
}

/// Reads `GRC_*` variables. Invalid values are reported and replaced by defaults.
pub fn explorer_config() -> ExplorerConfig {
    let defaults = ExplorerConfig::default();

    let explode = env_parse::<f32>("GRC_EXPLODE")
        .map(|raw| {
            let clamped = ExplodeAmount::new(raw).get();
            if clamped != raw {
                eprintln!("grc: GRC_EXPLODE {raw} adjusted to {clamped}");
            }
            clamped
        })
        .unwrap_or(defaults.explode);

    let surface_segments = env_parse::<u32>("GRC_SURFACE_SEGMENTS")
        .and_then(|segments| {
            if (1..=MAX_SEGMENTS).contains(&segments) {
                Some(segments)
            } else {
                eprintln!("grc: GRC_SURFACE_SEGMENTS must be in 1..={MAX_SEGMENTS}, got {segments}");
                None
            }
        })
        .unwrap_or(defaults.surface_segments);

    let width = positive("GRC_WINDOW_WIDTH").unwrap_or(defaults.window_resolution.0);
    let height = positive("GRC_WINDOW_HEIGHT").unwrap_or(defaults.window_resolution.1);

    let catalog_path = std::env::var("GRC_CATALOG_PATH")
        .ok()
        .filter(|raw| !raw.trim().is_empty())
        .map(PathBuf::from);

    ExplorerConfig {
        explode,
        surface_segments,
        window_resolution: (width, height),
        catalog_path,
    }
}

fn env_parse<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("grc: invalid {key} {raw:?}: {err}");
            None
        }
    }
}

fn positive(key: &str) -> Option<f32> {
    env_parse::<f32>(key).filter(|value| {
        let ok = value.is_finite() && *value > 0.0;
        if !ok {
            eprintln!("grc: {key} must be a positive number, got {value}");
        }
        ok
    })
}
