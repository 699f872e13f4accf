use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::*;

/// Gas constant in cal/(mol K).
pub const GAS_CONSTANT: f64 = 1.987;

/// Temperatures (K) at which heat capacities are tabulated.
pub const CP_TEMPERATURES: [f64; 7] = [300.0, 400.0, 500.0, 600.0, 800.0, 1000.0, 1500.0];

const T_REF: f64 = 298.0;

/// Standard enthalpy (kcal/mol), entropy (cal/mol/K) and tabulated heat
/// capacities (cal/mol/K) of a species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermoData {
    pub h298: f64,
    pub s298: f64,
    pub cp: [f64; 7],
}

impl ThermoData {
    pub fn new(h298: f64, s298: f64, cp: [f64; 7]) -> Self {
        Self { h298, s298, cp }
    }

    /// Removes the entropy of indistinguishable rotations:
    /// `S - R ln(sigma)`.
    pub fn with_symmetry_correction(self, symmetry_number: u32) -> Self {
        Self {
            s298: self.s298 - GAS_CONSTANT * (symmetry_number.max(1) as f64).ln(),
            ..self
        }
    }

    /// `Cp = a + b T` on each piece of the table, constant beyond its ends.
    fn segments(&self) -> Vec<(f64, f64, f64, f64)> {
        let mut segments = vec![(f64::NEG_INFINITY, CP_TEMPERATURES[0], self.cp[0], 0.0)];
        for i in 0..CP_TEMPERATURES.len() - 1 {
            let (t0, t1) = (CP_TEMPERATURES[i], CP_TEMPERATURES[i + 1]);
            let slope = (self.cp[i + 1] - self.cp[i]) / (t1 - t0);
            segments.push((t0, t1, self.cp[i] - slope * t0, slope));
        }
        segments.push((CP_TEMPERATURES[6], f64::INFINITY, self.cp[6], 0.0));
        segments
    }

    /// Signed integral from 298 K to `temperature` of `piece(a, b, lo, hi)`.
    fn integrate(&self, temperature: f64, piece: impl Fn(f64, f64, f64, f64) -> f64) -> f64 {
        let (from, to, sign) = if temperature >= T_REF {
            (T_REF, temperature, 1.0)
        } else {
            (temperature, T_REF, -1.0)
        };
        let total: f64 = self
            .segments()
            .into_iter()
            .filter_map(|(lo, hi, a, b)| {
                let lo = lo.max(from);
                let hi = hi.min(to);
                (lo < hi).then(|| piece(a, b, lo, hi))
            })
            .sum();
        sign * total
    }

    /// Heat capacity in cal/mol/K, interpolated linearly.
    pub fn calculate_cp(&self, temperature: f64) -> f64 {
        self.segments()
            .into_iter()
            .find(|&(lo, hi, _, _)| temperature >= lo && temperature < hi)
            .map_or(self.cp[6], |(_, _, a, b)| a + b * temperature)
    }

    /// Enthalpy in kcal/mol.
    pub fn calculate_h(&self, temperature: f64) -> f64 {
        let dh = self.integrate(temperature, |a, b, lo, hi| a * (hi - lo) + b / 2.0 * (hi * hi - lo * lo));
        self.h298 + dh / 1000.0
    }

    /// Entropy in cal/mol/K.
    pub fn calculate_s(&self, temperature: f64) -> f64 {
        let ds = self.integrate(temperature, |a, b, lo, hi| a * (hi / lo).ln() + b * (hi - lo));
        self.s298 + ds
    }

    /// Gibbs free energy in kcal/mol.
    pub fn calculate_g(&self, temperature: f64) -> f64 {
        self.calculate_h(temperature) - temperature * self.calculate_s(temperature) / 1000.0
    }
}

impl Display for ThermoData {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "H298={:.2} S298={:.2} Cp=", self.h298, self.s298)?;
        for (i, cp) in self.cp.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{:.2}", cp)?;
        }
        Ok(())
    }
}

/// Source of raw thermo data for a species, such as a group-additivity
/// database. Its results do not yet include the symmetry correction.
pub trait ThermoEstimator {
    fn estimate(&self, species: &ChemGraph) -> anyhow::Result<ThermoData>;
}
