use approx::assert_relative_eq;
use quantity::{KELVIN, PASCAL};
use vle_flash::*;

fn tank(names: &[&str], molefracs: &[f64], temperature: f64, pressure: f64) -> FlashResult<FlashTank> {
    let species = Species::from_json(names, "tests/species.json")?;
    let (t, p) = (temperature * KELVIN, pressure * PASCAL);
    let feed = Stream::from_total_molar_flow(species, Phase::Liquid, 10.0, molefracs, t, p)?;
    Ok(FlashTank::new(feed, t, p))
}

fn assert_mass_balance(tank: &FlashTank) {
    let feed = tank.feed().molar_flows();
    let out = tank.vapor().molar_flows() + tank.liquid().molar_flows();
    assert_relative_eq!(out, feed.clone(), max_relative = 1e-9, epsilon = 1e-12);
}

#[test]
fn ideal_binary() -> FlashResult<()> {
    let tank = tank(&["n-pentane", "n-hexane"], &[0.5, 0.5], 328.15, 101325.0)?;
    let solved = tank.isothermal_flash(VleModel::Ideal, SolverOptions::default())?;
    println!("{solved}");

    assert!(solved.converged());
    assert_relative_eq!(solved.vapor_fraction(), 0.776025, max_relative = 1e-5);
    assert_mass_balance(&solved);

    // Raoult's law
    for (i, s) in solved.species().iter().enumerate() {
        let k = s.vapor_pressure(328.15 * KELVIN).convert_into(PASCAL) / 101325.0;
        let (y, x) = (solved.vapor().molefracs()[i], solved.liquid().molefracs()[i]);
        assert_relative_eq!(y / x, k, max_relative = 1e-8);
    }
    assert_relative_eq!(solved.vapor().molefracs().sum(), 1.0, max_relative = 1e-10);
    assert_relative_eq!(solved.liquid().molefracs().sum(), 1.0, max_relative = 1e-10);

    // the input tank is unchanged
    assert!(!tank.converged());
    assert_eq!(tank.vapor().total_molar_flow(), 0.0);
    Ok(())
}

#[test]
fn peng_robinson_binary() -> FlashResult<()> {
    let tank = tank(&["n-pentane", "n-hexane"], &[0.5, 0.5], 328.15, 101325.0)?;
    let solved = tank.solve(
        FlashSpecification::Isothermal,
        VleModel::PengRobinson,
        (SolverOptions::default(), SolverOptions::default()),
    )?;
    assert!(solved.converged());
    assert_relative_eq!(solved.vapor_fraction(), 0.7597, max_relative = 1e-2);
    assert_mass_balance(&solved);

    let (y, x) = (solved.vapor().molefracs(), solved.liquid().molefracs());
    let k = PengRobinson::new(solved.species()).k_values(328.15, 101325.0, y, x)?;
    assert_relative_eq!(y.component_div(x), k, max_relative = 1e-3);

    // light component enriched in the vapor
    assert!(y[0] > 0.5 && x[0] < 0.5);
    Ok(())
}

#[test]
fn heat_duty_of_a_cold_feed() -> FlashResult<()> {
    let tank = tank(&["n-pentane", "n-hexane"], &[0.5, 0.5], 328.15, 101325.0)?;
    let solved = tank.isothermal_flash(VleModel::Ideal, SolverOptions::default())?;
    let expected = solved.vapor().total_enthalpy() + solved.liquid().total_enthalpy()
        - solved.feed().total_enthalpy();
    assert_relative_eq!(solved.heat_duty(), expected, max_relative = 1e-12);
    // partially evaporating a liquid feed at the same temperature needs heat
    assert!(solved.heat_duty() > 0.0);
    Ok(())
}

#[test]
fn non_condensable_leaves_with_the_vapor() -> FlashResult<()> {
    let tank = tank(
        &["n-pentane", "n-hexane", "nitrogen"],
        &[0.45, 0.45, 0.1],
        328.15,
        115000.0,
    )?;
    for model in [VleModel::Ideal, VleModel::PengRobinson] {
        let solved = tank.isothermal_flash(model, SolverOptions::default())?;
        assert!(solved.converged());
        let psi = solved.vapor_fraction();
        assert!(psi > 0.0 && psi < 1.0);
        assert_relative_eq!(solved.vapor().molefracs()[2], 0.1 / psi, max_relative = 1e-10);
        assert!(solved.liquid().molefracs()[2].abs() < 1e-10);
        assert_mass_balance(&solved);
    }
    let ideal = tank.isothermal_flash(VleModel::Ideal, SolverOptions::default())?;
    assert_relative_eq!(ideal.vapor_fraction(), 0.813709, max_relative = 1e-5);
    Ok(())
}

#[test]
fn iteration_limit_without_strict() -> FlashResult<()> {
    let tank = tank(&["n-pentane", "n-hexane"], &[0.5, 0.5], 328.15, 101325.0)?;
    // a single substitution step away from the Wilson estimate is not enough
    let solved = tank.isothermal_flash(VleModel::Ideal, SolverOptions::new().max_iter(1))?;
    assert!(!solved.converged());
    assert!(solved.vapor_fraction() > 0.0 && solved.vapor_fraction() < 1.0);
    assert_mass_balance(&solved);

    let strict = tank.isothermal_flash(VleModel::Ideal, SolverOptions::new().max_iter(1).strict(true));
    assert!(matches!(strict, Err(FlashError::NotConverged(_))));
    Ok(())
}

#[test]
fn supercritical_conditions() -> FlashResult<()> {
    let tank = tank(&["n-pentane", "n-hexane"], &[0.5, 0.5], 600.0, 101325.0)?;
    let result = tank.isothermal_flash(VleModel::PengRobinson, SolverOptions::default());
    assert!(matches!(result, Err(FlashError::DegenerateEosRoot)));
    assert!(result.unwrap_err().is_infeasible());
    Ok(())
}

#[test]
fn species_from_json() -> FlashResult<()> {
    let species = Species::from_json(&["nitrogen", "n-pentane"], "tests/species.json")?;
    assert_eq!(species[0].name, "nitrogen");
    assert_eq!(species[1].name, "n-pentane");
    assert!(!species[0].condensable);

    let missing = Species::from_json(&["n-pentane", "methanol"], "tests/species.json");
    assert!(matches!(missing, Err(FlashError::ComponentsNotFound(ref s)) if s == "methanol"));

    let no_file = Species::from_json(&["n-pentane"], "tests/does_not_exist.json");
    assert!(matches!(no_file, Err(FlashError::FileIO(_))));
    Ok(())
}
