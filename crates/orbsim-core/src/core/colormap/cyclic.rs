use phf::{Map, phf_map};
use serde::Deserialize;
use std::f64::consts::TAU;
use std::path::Path;
use thiserror::Error;

pub type Rgb = [f64; 3];

/// Name of the colormap used when none is configured.
pub const DEFAULT_COLORMAP: &str = "twilight";

const HSV: &[Rgb] = &[
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 1.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
];

const TWILIGHT: &[Rgb] = &[
    [0.886, 0.851, 0.888],
    [0.588, 0.690, 0.784],
    [0.373, 0.451, 0.741],
    [0.353, 0.204, 0.604],
    [0.188, 0.078, 0.212],
    [0.498, 0.153, 0.329],
    [0.710, 0.361, 0.314],
    [0.808, 0.620, 0.580],
];

const TWILIGHT_SHIFTED: &[Rgb] = &[
    [0.188, 0.078, 0.212],
    [0.353, 0.204, 0.604],
    [0.373, 0.451, 0.741],
    [0.588, 0.690, 0.784],
    [0.886, 0.851, 0.888],
    [0.808, 0.620, 0.580],
    [0.710, 0.361, 0.314],
    [0.498, 0.153, 0.329],
];

const PHASE: &[Rgb] = &[
    [0.659, 0.471, 0.049],
    [0.800, 0.239, 0.380],
    [0.710, 0.271, 0.800],
    [0.298, 0.439, 0.929],
    [0.071, 0.573, 0.553],
    [0.380, 0.580, 0.090],
];

static BUILTIN_COLORMAPS: Map<&'static str, &'static [Rgb]> = phf_map! {
    "hsv" => HSV,
    "twilight" => TWILIGHT,
    "twilight_shifted" => TWILIGHT_SHIFTED,
    "phase" => PHASE,
};

#[derive(Debug, Error)]
pub enum ColormapError {
    #[error("Unknown colormap '{0}'")]
    UnknownName(String),
    #[error("Colormap '{name}' needs at least 2 distinct stops, got {count}")]
    TooFewStops { name: String, count: usize },
    #[error("Colormap '{name}' stop {index} has a component outside [0, 1]")]
    ComponentOutOfRange { name: String, index: usize },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColormapFile {
    name: String,
    stops: Vec<Rgb>,
}

/// A periodic color table indexed by angle.
///
/// The stops are spread evenly over `[0, 2π)` and interpolated linearly, with the last stop
/// blending back into the first, so phase 0 and phase 2π land on the same color.
#[derive(Debug, Clone, PartialEq)]
pub struct CyclicColormap {
    name: String,
    stops: Vec<Rgb>,
}

impl CyclicColormap {
    pub fn builtin(name: &str) -> Result<Self, ColormapError> {
        let stops = BUILTIN_COLORMAPS
            .get(name)
            .ok_or_else(|| ColormapError::UnknownName(name.to_string()))?;
        Self::from_stops(name, stops.to_vec())
    }

    /// Names of the built-in colormaps in alphabetical order.
    pub fn builtin_names() -> Vec<&'static str> {
        let mut names: Vec<_> = BUILTIN_COLORMAPS.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Builds a colormap from explicit stops. A closing stop equal to the first one is
    /// dropped, since the table already wraps around.
    pub fn from_stops(name: &str, mut stops: Vec<Rgb>) -> Result<Self, ColormapError> {
        if let Some(index) = stops
            .iter()
            .position(|rgb| rgb.iter().any(|c| !c.is_finite() || !(0.0..=1.0).contains(c)))
        {
            return Err(ColormapError::ComponentOutOfRange {
                name: name.to_string(),
                index,
            });
        }
        if stops.len() > 2 && stops.first() == stops.last() {
            stops.pop();
        }
        if stops.len() < 2 {
            return Err(ColormapError::TooFewStops {
                name: name.to_string(),
                count: stops.len(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            stops,
        })
    }

    /// Loads a custom colormap from a TOML file with a `name` and a `stops` array of RGB
    /// triples in `[0, 1]`.
    pub fn load(path: &Path) -> Result<Self, ColormapError> {
        let content = std::fs::read_to_string(path).map_err(|e| ColormapError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: ColormapFile = toml::from_str(&content).map_err(|e| ColormapError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_stops(&file.name, file.stops)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    /// Color at angle `phase` (radians). Any real angle is accepted; non-finite angles map
    /// to the first stop.
    pub fn lookup(&self, phase: f64) -> Rgb {
        if !phase.is_finite() {
            return self.stops[0];
        }
        let count = self.stops.len();
        let position = phase.rem_euclid(TAU) / TAU * count as f64;
        let lower = (position.floor() as usize) % count;
        let upper = (lower + 1) % count;
        let t = position - position.floor();
        let a = self.stops[lower];
        let b = self.stops[upper];
        std::array::from_fn(|k| a[k] + (b[k] - a[k]) * t)
    }
}

impl Default for CyclicColormap {
    fn default() -> Self {
        Self {
            name: DEFAULT_COLORMAP.to_string(),
            stops: TWILIGHT.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use std::fs;
    use tempfile::tempdir;

    fn rgb_approx_equal(a: Rgb, b: Rgb) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn every_builtin_loads() {
        for name in CyclicColormap::builtin_names() {
            let map = CyclicColormap::builtin(name).unwrap();
            assert_eq!(map.name(), name);
            assert!(map.stops().len() >= 2);
        }
        assert!(matches!(
            CyclicColormap::builtin("viridis"),
            Err(ColormapError::UnknownName(_))
        ));
    }

    #[test]
    fn zero_and_full_turn_give_identical_colors() {
        for name in CyclicColormap::builtin_names() {
            let map = CyclicColormap::builtin(name).unwrap();
            assert_eq!(map.lookup(0.0), map.lookup(TAU));
            assert!(rgb_approx_equal(map.lookup(-PI), map.lookup(PI)));
        }
    }

    #[test]
    fn lookup_is_continuous_across_the_wrap() {
        let map = CyclicColormap::builtin("hsv").unwrap();
        let just_below = map.lookup(TAU - 1e-9);
        let at_zero = map.lookup(0.0);
        assert!(just_below
            .iter()
            .zip(at_zero.iter())
            .all(|(a, b)| (a - b).abs() < 1e-6));
    }

    #[test]
    fn lookup_interpolates_between_stops() {
        let map = CyclicColormap::from_stops("rb", vec![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]).unwrap();
        assert!(rgb_approx_equal(map.lookup(PI / 2.0), [0.5, 0.0, 0.5]));
        assert!(rgb_approx_equal(map.lookup(PI), [0.0, 0.0, 1.0]));
        assert!(rgb_approx_equal(map.lookup(3.0 * PI / 2.0), [0.5, 0.0, 0.5]));
    }

    #[test]
    fn duplicated_closing_stop_is_dropped() {
        let map = CyclicColormap::from_stops(
            "loop",
            vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
        )
        .unwrap();
        assert_eq!(map.stops().len(), 3);
    }

    #[test]
    fn invalid_stops_are_rejected() {
        assert!(matches!(
            CyclicColormap::from_stops("one", vec![[0.0, 0.0, 0.0]]),
            Err(ColormapError::TooFewStops { count: 1, .. })
        ));
        assert!(matches!(
            CyclicColormap::from_stops("bad", vec![[0.0, 0.0, 0.0], [1.5, 0.0, 0.0]]),
            Err(ColormapError::ComponentOutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn load_reads_custom_colormap_from_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            r#"
            name = "custom"
            stops = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
            "#,
        )
        .unwrap();
        let map = CyclicColormap::load(&path).unwrap();
        assert_eq!(map.name(), "custom");
        assert_eq!(map.stops().len(), 3);
    }

    #[test]
    fn load_reports_io_and_toml_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            CyclicColormap::load(&missing),
            Err(ColormapError::Io { .. })
        ));
        let malformed = dir.path().join("malformed.toml");
        fs::write(&malformed, "this is not toml").unwrap();
        assert!(matches!(
            CyclicColormap::load(&malformed),
            Err(ColormapError::Toml { .. })
        ));
    }
}
