use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};

/// Which set of angular functions multiplies the radial part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AngularBasis {
    /// Complex spherical harmonics `Y_l^m` carrying the phase `e^{imφ}`.
    #[default]
    Complex,
    /// Real (chemistry-style) harmonics such as `p_x`, `p_y`, `p_z`.
    Real,
}

/// Associated Legendre function `P_l^m(x)` for `m >= 0`, including the Condon–Shortley phase.
pub fn associated_legendre(l: u8, m: u8, x: f64) -> f64 {
    if m > l {
        return 0.0;
    }
    let x = x.clamp(-1.0, 1.0);
    let somx2 = ((1.0 - x) * (1.0 + x)).sqrt();

    let mut pmm = 1.0;
    let mut fact = 1.0;
    for _ in 0..m {
        pmm *= -fact * somx2;
        fact += 2.0;
    }
    if l == m {
        return pmm;
    }

    let mut pmmp1 = x * (2.0 * m as f64 + 1.0) * pmm;
    if l == m + 1 {
        return pmmp1;
    }

    let mut pll = 0.0;
    for ll in (m + 2)..=l {
        let ll_f = ll as f64;
        let m_f = m as f64;
        pll = ((2.0 * ll_f - 1.0) * x * pmmp1 - (ll_f + m_f - 1.0) * pmm) / (ll_f - m_f);
        pmm = pmmp1;
        pmmp1 = pll;
    }
    pll
}

fn harmonic_norm(l: u8, m: u8) -> f64 {
    // (l - m)! / (l + m)! as a running product keeps the ratio well-conditioned.
    let ratio: f64 = ((l - m + 1)..=(l + m))
        .map(|k| 1.0 / k as f64)
        .product();
    ((2.0 * l as f64 + 1.0) / (4.0 * PI) * ratio).sqrt()
}

/// Spherical harmonic at polar angle `theta` and azimuth `phi`.
///
/// Negative `m` follows `Y_l^{-m} = (-1)^m conj(Y_l^m)`. In the real basis the result has a
/// zero imaginary part.
pub fn spherical_harmonic(l: u8, m: i8, theta: f64, phi: f64, basis: AngularBasis) -> Complex64 {
    let m_abs = m.unsigned_abs();
    if m_abs > l {
        return Complex64::new(0.0, 0.0);
    }
    let legendre = harmonic_norm(l, m_abs) * associated_legendre(l, m_abs, theta.cos());
    let positive = Complex64::from_polar(legendre, m_abs as f64 * phi);
    let sign = if m_abs % 2 == 0 { 1.0 } else { -1.0 };

    match basis {
        AngularBasis::Complex => {
            if m >= 0 {
                positive
            } else {
                positive.conj() * sign
            }
        }
        AngularBasis::Real => {
            let value = match m {
                0 => positive.re,
                m if m > 0 => SQRT_2 * sign * positive.re,
                _ => SQRT_2 * sign * positive.im,
            };
            Complex64::new(value, 0.0)
        }
    }
}
