use super::quantum::subshell_letter;
use std::fmt;

/// Aufbau filling order as `(n, l, capacity)`.
pub const SUBSHELL_ORDER: [(u8, u8, u8); 19] = [
    (1, 0, 2),
    (2, 0, 2),
    (2, 1, 6),
    (3, 0, 2),
    (3, 1, 6),
    (4, 0, 2),
    (3, 2, 10),
    (4, 1, 6),
    (5, 0, 2),
    (4, 2, 10),
    (5, 1, 6),
    (6, 0, 2),
    (4, 3, 14),
    (5, 2, 10),
    (6, 1, 6),
    (7, 0, 2),
    (5, 3, 14),
    (6, 2, 10),
    (7, 1, 6),
];

/// Lower bound for the effective charge, so diffuse anion orbitals stay bounded.
const MIN_EFFECTIVE_CHARGE: f64 = 0.1;

/// Known ground-state exceptions, keyed by electron count: electrons move from an `s`
/// subshell into the `d` subshell below it.
fn exception_adjustments(electron_count: u32) -> &'static [((u8, u8), i32)] {
    match electron_count {
        24 => &[((4, 0), -1), ((3, 2), 1)],
        29 => &[((4, 0), -1), ((3, 2), 1)],
        42 => &[((5, 0), -1), ((4, 2), 1)],
        46 => &[((5, 0), -2), ((4, 2), 2)],
        47 => &[((5, 0), -1), ((4, 2), 1)],
        79 => &[((6, 0), -1), ((5, 2), 1)],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subshell {
    pub n: u8,
    pub l: u8,
    pub electrons: u32,
}

impl Subshell {
    pub fn orbital_count(&self) -> u32 {
        2 * self.l as u32 + 1
    }

    /// Unpaired electrons under Hund's rule.
    pub fn unpaired(&self) -> u32 {
        let orbitals = self.orbital_count();
        let electrons = self.electrons.min(2 * orbitals);
        if electrons <= orbitals {
            electrons
        } else {
            2 * orbitals - electrons
        }
    }
}

/// Ground-state electron configuration, subshells listed in filling order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElectronConfiguration {
    subshells: Vec<Subshell>,
}

impl ElectronConfiguration {
    /// Fills subshells in Aufbau order, then applies the known exceptions.
    pub fn ground_state(electron_count: u32) -> Self {
        let mut config = Self::aufbau(electron_count);
        for &((n, l), delta) in exception_adjustments(electron_count) {
            if let Some(shell) = config.subshells.iter_mut().find(|s| s.n == n && s.l == l) {
                shell.electrons = (shell.electrons as i32 + delta).max(0) as u32;
            } else if delta > 0 {
                config.subshells.push(Subshell {
                    n,
                    l,
                    electrons: delta as u32,
                });
            }
        }
        config.subshells.retain(|s| s.electrons > 0);
        config.sort_by_filling_order();
        config
    }

    /// Plain Aufbau filling without exceptions.
    pub fn aufbau(electron_count: u32) -> Self {
        let mut remaining = electron_count;
        let mut subshells = Vec::new();
        for (n, l, capacity) in SUBSHELL_ORDER {
            if remaining == 0 {
                break;
            }
            let fill = remaining.min(capacity as u32);
            subshells.push(Subshell {
                n,
                l,
                electrons: fill,
            });
            remaining -= fill;
        }
        Self { subshells }
    }

    pub fn subshells(&self) -> &[Subshell] {
        &self.subshells
    }

    pub fn total_electrons(&self) -> u32 {
        self.subshells.iter().map(|s| s.electrons).sum()
    }

    pub fn occupancy(&self, n: u8, l: u8) -> u32 {
        self.subshells
            .iter()
            .find(|s| s.n == n && s.l == l)
            .map_or(0, |s| s.electrons)
    }

    pub fn unpaired_electrons(&self) -> u32 {
        self.subshells.iter().map(Subshell::unpaired).sum()
    }

    /// Highest occupied principal quantum number, 0 when there are no electrons.
    pub fn valence_shell(&self) -> u8 {
        self.subshells.iter().map(|s| s.n).max().unwrap_or(0)
    }

    pub fn valence_electrons(&self) -> u32 {
        let shell = self.valence_shell();
        self.subshells
            .iter()
            .filter(|s| s.n == shell)
            .map(|s| s.electrons)
            .sum()
    }

    /// Whether exceptions changed this configuration relative to plain Aufbau filling.
    pub fn is_exception(&self) -> bool {
        *self != Self::aufbau(self.total_electrons())
    }

    /// Every orbital holding at least one electron, in filling order.
    ///
    /// Within a subshell electrons occupy `m = -l..=l` singly before pairing, so a partially
    /// filled subshell lists only the orbitals that actually hold an electron.
    pub fn occupied_orbitals(&self) -> Vec<(u8, u8, i8)> {
        let mut orbitals = Vec::new();
        for shell in &self.subshells {
            let occupied = shell.electrons.min(shell.orbital_count()) as i8;
            let l = shell.l as i8;
            for m in (-l..=l).take(occupied as usize) {
                orbitals.push((shell.n, shell.l, m));
            }
        }
        orbitals
    }

    /// The orbital shown by default: the last occupied orbital in filling order.
    pub fn default_orbital(&self) -> Option<(u8, u8, i8)> {
        self.occupied_orbitals().last().copied()
    }

    fn sort_by_filling_order(&mut self) {
        self.subshells.sort_by_key(|s| {
            SUBSHELL_ORDER
                .iter()
                .position(|&(n, l, _)| n == s.n && l == s.l)
                .unwrap_or(usize::MAX)
        });
    }
}

impl fmt::Display for ElectronConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .subshells
            .iter()
            .map(|s| format!("{}{}{}", s.n, subshell_letter(s.l), s.electrons))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Slater screening group of a subshell: `s` and `p` share a group, `d` and `f` stand alone.
fn slater_group(n: u8, l: u8) -> (u8, u8) {
    (n, l.saturating_sub(1))
}

/// Effective nuclear charge felt by an electron in `(n, l)` under Slater's rules.
///
/// The configuration describes the atom or ion. When the target subshell is occupied, the
/// electron itself is excluded from the screening sum; otherwise the result describes an
/// electron promoted into that subshell on top of the configuration.
pub fn effective_nuclear_charge(
    atomic_number: u8,
    configuration: &ElectronConfiguration,
    n: u8,
    l: u8,
) -> f64 {
    let target = slater_group(n, l);
    let mut shielding = 0.0;
    let mut self_excluded = false;

    for shell in configuration.subshells() {
        let mut count = shell.electrons as f64;
        if !self_excluded && shell.n == n && shell.l == l && shell.electrons > 0 {
            count -= 1.0;
            self_excluded = true;
        }
        if count <= 0.0 {
            continue;
        }
        let group = slater_group(shell.n, shell.l);
        let factor = if group == target {
            if n == 1 { 0.30 } else { 0.35 }
        } else if group > target {
            0.0
        } else if l >= 2 {
            1.0
        } else if shell.n + 1 == n {
            0.85
        } else if shell.n < n {
            1.0
        } else {
            // Inner d/f groups of the same shell do not exist for s/p targets.
            0.0
        };
        shielding += factor * count;
    }

    (atomic_number as f64 - shielding).max(MIN_EFFECTIVE_CHARGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn configuration_strings_follow_filling_order() {
        assert_eq!(ElectronConfiguration::ground_state(1).to_string(), "1s1");
        assert_eq!(
            ElectronConfiguration::ground_state(11).to_string(),
            "1s2 2s2 2p6 3s1"
        );
        assert_eq!(
            ElectronConfiguration::ground_state(26).to_string(),
            "1s2 2s2 2p6 3s2 3p6 4s2 3d6"
        );
        assert_eq!(ElectronConfiguration::ground_state(0).to_string(), "");
    }

    #[test]
    fn chromium_and_copper_exceptions_are_applied() {
        let cr = ElectronConfiguration::ground_state(24);
        assert_eq!(cr.occupancy(4, 0), 1);
        assert_eq!(cr.occupancy(3, 2), 5);
        assert!(cr.is_exception());
        assert_eq!(cr.unpaired_electrons(), 6);

        let cu = ElectronConfiguration::ground_state(29);
        assert_eq!(cu.to_string(), "1s2 2s2 2p6 3s2 3p6 4s1 3d10");
        assert_eq!(cu.unpaired_electrons(), 1);
    }

    #[test]
    fn palladium_empties_its_5s_subshell() {
        let pd = ElectronConfiguration::ground_state(46);
        assert_eq!(pd.occupancy(5, 0), 0);
        assert_eq!(pd.occupancy(4, 2), 10);
        assert_eq!(pd.total_electrons(), 46);
        assert!(pd.subshells().iter().all(|s| s.electrons > 0));
    }

    #[test]
    fn unpaired_electrons_follow_hunds_rule() {
        assert_eq!(ElectronConfiguration::ground_state(6).unpaired_electrons(), 2);
        assert_eq!(ElectronConfiguration::ground_state(7).unpaired_electrons(), 3);
        assert_eq!(ElectronConfiguration::ground_state(8).unpaired_electrons(), 2);
        assert_eq!(ElectronConfiguration::ground_state(10).unpaired_electrons(), 0);
    }

    #[test]
    fn valence_shell_and_electrons() {
        let cl = ElectronConfiguration::ground_state(17);
        assert_eq!(cl.valence_shell(), 3);
        assert_eq!(cl.valence_electrons(), 7);
        assert_eq!(ElectronConfiguration::ground_state(0).valence_shell(), 0);
    }

    #[test]
    fn occupied_orbitals_and_default_orbital() {
        let carbon = ElectronConfiguration::ground_state(6);
        assert_eq!(
            carbon.occupied_orbitals(),
            vec![(1, 0, 0), (2, 0, 0), (2, 1, -1), (2, 1, 0)]
        );
        assert_eq!(carbon.default_orbital(), Some((2, 1, 0)));
        assert_eq!(
            ElectronConfiguration::ground_state(1).default_orbital(),
            Some((1, 0, 0))
        );
        assert_eq!(ElectronConfiguration::ground_state(0).default_orbital(), None);
    }

    #[test]
    fn slater_charge_for_hydrogen_is_one() {
        let config = ElectronConfiguration::ground_state(1);
        assert!(f64_approx_equal(
            effective_nuclear_charge(1, &config, 1, 0),
            1.0
        ));
    }

    #[test]
    fn slater_charge_matches_textbook_values() {
        // Carbon 2p: Z=6, S = 3 * 0.35 + 2 * 0.85 = 2.75.
        let c = ElectronConfiguration::ground_state(6);
        assert!(f64_approx_equal(effective_nuclear_charge(6, &c, 2, 1), 3.25));
        // Sodium 3s: S = 8 * 0.85 + 2 * 1.0 = 8.8.
        let na = ElectronConfiguration::ground_state(11);
        assert!(f64_approx_equal(effective_nuclear_charge(11, &na, 3, 0), 2.2));
        // Iron 3d: S = 5 * 0.35 + 18 * 1.0 = 19.75.
        let fe = ElectronConfiguration::ground_state(26);
        assert!(f64_approx_equal(effective_nuclear_charge(26, &fe, 3, 2), 6.25));
        // Helium 1s: S = 0.30.
        let he = ElectronConfiguration::ground_state(2);
        assert!(f64_approx_equal(effective_nuclear_charge(2, &he, 1, 0), 1.7));
    }

    #[test]
    fn cations_feel_a_larger_effective_charge() {
        let neutral = ElectronConfiguration::ground_state(11);
        let cation = ElectronConfiguration::ground_state(10);
        assert!(
            effective_nuclear_charge(11, &cation, 2, 1)
                > effective_nuclear_charge(11, &neutral, 3, 0)
        );
    }

    #[test]
    fn effective_charge_never_drops_below_floor() {
        let crowded = ElectronConfiguration::ground_state(5);
        assert!(effective_nuclear_charge(1, &crowded, 2, 1) >= MIN_EFFECTIVE_CHARGE);
    }
}
