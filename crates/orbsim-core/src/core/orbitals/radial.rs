/// Bohr radius in Ångström.
pub const BOHR_RADIUS: f64 = 0.529_177_210_9;

/// Generalized Laguerre polynomial `L_k^α(x)` by the three-term recurrence.
pub fn generalized_laguerre(k: u32, alpha: f64, x: f64) -> f64 {
    if k == 0 {
        return 1.0;
    }
    let mut prev = 1.0;
    let mut current = 1.0 + alpha - x;
    for i in 1..k {
        let i = i as f64;
        let next = ((2.0 * i + 1.0 + alpha - x) * current - (i + alpha) * prev) / (i + 1.0);
        prev = current;
        current = next;
    }
    current
}

fn factorial(n: u32) -> f64 {
    (1..=n).map(f64::from).product()
}

/// Normalized hydrogen-like radial function `R_nl(r)` for an effective nuclear charge.
///
/// `r` is in Ångström and the result in Å^{-3/2}, so that ∫ R² r² dr = 1.
pub fn radial_wavefunction(n: u8, l: u8, z_eff: f64, r: f64) -> f64 {
    let n_f = n as f64;
    let scale = 2.0 * z_eff / (n_f * BOHR_RADIUS);
    let rho = scale * r;
    let k = (n - l - 1) as u32;
    let norm = scale.powi(3).sqrt()
        * (factorial(k) / (2.0 * n_f * factorial((n + l) as u32))).sqrt();
    norm * (-rho / 2.0).exp() * rho.powi(l as i32) * generalized_laguerre(k, (2 * l + 1) as f64, rho)
}
