use super::cyclic::{CyclicColormap, Rgb};
use super::opacity::OpacityCurve;
use crate::core::orbitals::field::{FieldMode, FieldSample};
use crate::core::orbitals::grid::Grid;
use std::f64::consts::TAU;

/// Color assigned to one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSample {
    /// Phase reduced into `[0, 2π)`.
    pub hue: f64,
    pub rgb: Rgb,
    pub opacity: f64,
}

/// Per-sample colors on the grid of the field they were derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorField {
    grid: Grid,
    mode: FieldMode,
    samples: Vec<ColorSample>,
}

impl ColorField {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn mode(&self) -> FieldMode {
        self.mode
    }

    pub fn samples(&self) -> &[ColorSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples with non-zero opacity.
    pub fn visible_count(&self) -> usize {
        self.samples.iter().filter(|s| s.opacity > 0.0).count()
    }
}

/// Maps complex samples to color: phase to hue through a cyclic colormap and normalized
/// magnitude to opacity through a monotone curve.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhaseColormapper {
    colormap: CyclicColormap,
    curve: OpacityCurve,
}

impl PhaseColormapper {
    pub fn new(colormap: CyclicColormap, curve: OpacityCurve) -> Self {
        Self { colormap, curve }
    }

    pub fn colormap(&self) -> &CyclicColormap {
        &self.colormap
    }

    pub fn curve(&self) -> &OpacityCurve {
        &self.curve
    }

    /// Color for a single value given its magnitude already normalized to `[0, 1]`.
    pub fn color(&self, normalized_magnitude: f64, phase: f64) -> ColorSample {
        let hue = match phase.rem_euclid(TAU) {
            h if h.is_finite() && h < TAU => h,
            // Tiny negative phases round up to exactly TAU.
            _ => 0.0,
        };
        ColorSample {
            hue,
            rgb: self.colormap.lookup(hue),
            opacity: self.curve.apply(normalized_magnitude),
        }
    }

    /// Colors a whole field. Magnitudes are normalized by the largest magnitude in the
    /// sample; density samples are drawn at phase 0.
    pub fn colorize(&self, sample: &FieldSample) -> ColorField {
        let max = sample.max_magnitude();
        let scale = if max > 0.0 && max.is_finite() {
            1.0 / max
        } else {
            0.0
        };
        let samples = (0..sample.len())
            .map(|i| {
                let (magnitude, phase) = sample.magnitude_phase(i).unwrap_or((0.0, 0.0));
                let phase = match sample.mode() {
                    FieldMode::Wavefunction => phase,
                    FieldMode::Density => 0.0,
                };
                self.color(magnitude * scale, phase)
            })
            .collect();
        ColorField {
            grid: sample.grid().clone(),
            mode: sample.mode(),
            samples,
        }
    }
}
