use crate::errors::FlashResult;
use crate::flash_tank::FlashTank;
use crate::numerics::{ridder, RootEstimate};
use crate::SolverOptions;
use nalgebra::DVector;

/// Rachford-Rice residual: sum of z (K - 1) / (1 + psi (K - 1)).
fn residual(feed: &DVector<f64>, k: &DVector<f64>, psi: f64) -> f64 {
    feed.iter()
        .zip(k.iter())
        .map(|(&z, &k)| z * (k - 1.0) / (1.0 + psi * (k - 1.0)))
        .sum()
}

/// Solve the Rachford-Rice equation for the vapor fraction psi = V/F.
///
/// If the residual does not change sign on [0, 1], the vapor fraction is
/// clamped to the single phase limit: psi = 1 if the residual is positive
/// at psi = 1 (all vapor), psi = 0 if it is negative at psi = 0 (all liquid).
/// Otherwise the root is bracketed by the bounds that keep all phase
/// compositions non-negative and found with Ridder's method.
pub fn rachford_rice(
    feed: &DVector<f64>,
    k: &DVector<f64>,
    options: SolverOptions,
) -> FlashResult<RootEstimate> {
    let clamped = |root| RootEstimate {
        root,
        iterations: 0,
        converged: true,
    };
    if residual(feed, k, 1.0) >= 0.0 {
        return Ok(clamped(1.0));
    }
    if residual(feed, k, 0.0) <= 0.0 {
        return Ok(clamped(0.0));
    }

    // look for tighter bounds
    let (mut psi_min, mut psi_max) = (0.0, 1.0);
    for (&k, &z) in k.iter().zip(feed.iter()) {
        if k > 1.0 {
            psi_min = f64::max(psi_min, (k * z - 1.0) / (k - 1.0));
        }
        if k < 1.0 {
            psi_max = f64::min(psi_max, (1.0 - z) / (1.0 - k));
        }
    }
    let bracket = if psi_min < psi_max
        && residual(feed, k, psi_min) > 0.0
        && residual(feed, k, psi_max) < 0.0
    {
        [psi_min, psi_max]
    } else {
        [0.0, 1.0]
    };
    ridder(|psi| Ok(residual(feed, k, psi)), bracket, 0.0, options)
}

impl FlashTank {
    /// Split the feed for fixed K-values and update both outlets.
    ///
    /// The vapor composition follows from the K-values, the liquid
    /// composition from the component mass balance. Returns whether the
    /// Rachford-Rice iteration converged.
    pub(crate) fn equilibrium_step(
        &mut self,
        k: &DVector<f64>,
        options: SolverOptions,
    ) -> FlashResult<bool> {
        let z = self.z().clone();
        let rr = rachford_rice(&z, k, SolverOptions::new().strict(options.strict))?;
        let f = self.feed.total_molar_flow();
        let v = f * rr.root;
        let l = f - v;
        let condensable: Vec<bool> = self.species().iter().map(|s| s.condensable).collect();

        let y = DVector::from_iterator(
            z.len(),
            (0..z.len()).map(|i| match (condensable[i], v > 0.0) {
                (true, true) => f * z[i] * k[i] / (f + v * (k[i] - 1.0)),
                (false, true) => f * z[i] / v,
                (true, false) => k[i] * z[i],
                (false, false) => z[i],
            }),
        );
        let x = if l > 0.0 {
            (&z * f - &y * v) / l
        } else {
            DVector::from_iterator(
                z.len(),
                (0..z.len()).map(|i| if condensable[i] { y[i] / k[i] } else { 0.0 }),
            )
        };

        self.vapor.set_flow_and_composition(v, y);
        self.liquid.set_flow_and_composition(l, x);
        Ok(rr.converged)
    }
}
