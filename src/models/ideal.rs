use crate::species::Species;
use nalgebra::DVector;

/// Raoult's law.
pub(super) fn k_values(species: &[Species], temperature: f64, pressure: f64) -> DVector<f64> {
    DVector::from_iterator(
        species.len(),
        species.iter().map(|s| s.psat(temperature) / pressure),
    )
}
