use crate::species::Species;
use nalgebra::DVector;

/// Wilson's K-value correlation.
pub(crate) fn k_values(species: &[Species], temperature: f64, pressure: f64) -> DVector<f64> {
    DVector::from_iterator(
        species.len(),
        species.iter().map(|s| {
            s.pc / pressure * (5.37 * (1.0 + s.acentric_factor) * (1.0 - s.tc / temperature)).exp()
        }),
    )
}

/// Saturation temperature of a pure species estimated from the
/// critical point and the acentric factor.
pub(crate) fn saturation_temperature(species: &Species, pressure: f64) -> f64 {
    species.tc
        / (1.0
            - 3.0 * (pressure / species.pc).ln()
                / (std::f64::consts::LN_10 * (7.0 + 7.0 * species.acentric_factor)))
}
