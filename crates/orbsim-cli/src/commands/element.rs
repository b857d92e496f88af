use super::parse_element;
use crate::cli::ElementArgs;
use crate::error::Result;
use orbsim::core::models::atom::validate_ionization;
use orbsim::core::models::element::Element;
use orbsim::core::orbitals::aufbau::{ElectronConfiguration, effective_nuclear_charge};
use orbsim::core::orbitals::quantum::{QuantumNumberTable, subshell_letter};
use orbsim::engine::error::EngineError;
use std::fmt::Write;
use tracing::debug;

pub async fn run(args: ElementArgs) -> Result<()> {
    let element = parse_element(&args.element)?;
    print!("{}", describe(element, args.ionization, args.n)?);
    Ok(())
}

/// Human-readable report of an element (or ion): reference data, ground-state configuration,
/// and the orbitals the evaluator accepts.
fn describe(element: &'static Element, ionization: i32, shell: Option<u8>) -> Result<String> {
    validate_ionization(element.atomic_number, ionization).map_err(EngineError::from)?;
    let electrons = (element.atomic_number as i32 - ionization) as u32;
    let configuration = ElectronConfiguration::ground_state(electrons);
    debug!(symbol = element.symbol, electrons, "Describing element.");

    let mut out = String::new();
    let charge = match ionization {
        0 => String::new(),
        q if q > 0 => format!(" ({}+ ion)", q),
        q => format!(" ({}- ion)", -q),
    };
    let _ = writeln!(out, "{} ({}), Z = {}{}", element.name, element.symbol, element.atomic_number, charge);
    let _ = writeln!(out, "  Category:          {:?}", element.category);
    match element.electronegativity {
        Some(chi) => {
            let _ = writeln!(out, "  Electronegativity: {:.2}", chi);
        }
        None => {
            let _ = writeln!(out, "  Electronegativity: n/a");
        }
    }
    let _ = writeln!(out, "  Covalent radius:   {:.2} Å", element.covalent_radius);

    let exception = if configuration.is_exception() {
        "  (Aufbau exception)"
    } else {
        ""
    };
    let shown = if electrons == 0 {
        "(bare nucleus)".to_string()
    } else {
        configuration.to_string()
    };
    let _ = writeln!(out, "  Configuration:     {}{}", shown, exception);
    let _ = writeln!(
        out,
        "  Valence:           shell {}, {} electrons, {} unpaired",
        configuration.valence_shell(),
        configuration.valence_electrons(),
        configuration.unpaired_electrons()
    );
    if let Some((n, l, m)) = configuration.default_orbital() {
        let z_eff = effective_nuclear_charge(element.atomic_number, &configuration, n, l);
        let _ = writeln!(
            out,
            "  Default orbital:   {}{} (m={}), Z_eff = {:.2}",
            n,
            subshell_letter(l),
            m,
            z_eff
        );
    }

    let shells: Vec<u8> = match shell {
        Some(n) => vec![n],
        None => (1..=configuration.valence_shell().max(1)).collect(),
    };
    for n in shells {
        let valid = QuantumNumberTable::enumerate_valid(element.atomic_number, n);
        if valid.is_empty() {
            let _ = writeln!(out, "  n = {}: no valid orbitals", n);
            continue;
        }
        let listed: Vec<String> = valid
            .iter()
            .map(|&(l, m)| format!("{}{}({:+})", n, subshell_letter(l), m))
            .collect();
        let _ = writeln!(out, "  n = {}: {}", n, listed.join(" "));
    }
    Ok(out)
}
