//! Pressure-melting liquidus law and the deltaX anomaly built on it.
//!
//! Pressure is approximated hydrostatically from depth (`g * rho * depth`), the
//! liquidus follows a power law in pressure and the anomaly is the scaled
//! difference between the local temperature and that liquidus.

use crate::constants::{
    ANOMALY_SCALE, DENSITY, GRAVITY, LIQUIDUS_EXPONENT, LIQUIDUS_PRESSURE_SCALE,
    REFERENCE_LIQUIDUS,
};
use serde::{Deserialize, Serialize};

/// What to do when the hydrostatic pressure exceeds the liquidus pressure
/// scale, where `1 - p / p_scale` turns negative and the fractional power has
/// no real value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverpressurePolicy {
    /// Fail the whole batch with a pressure-out-of-range error.
    #[default]
    Reject,
    /// Clamp pressure to the scale, giving a liquidus of zero.
    Clamp,
    /// Write NaN for the offending point only.
    NotANumber,
}

/// Outcome of evaluating the liquidus at one pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Liquidus {
    InDomain(f64),
    Clamped(f64),
    OutOfDomain,
    /// Pressure is NaN or infinite; no policy turns this into a liquidus.
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidusModel {
    pub gravity: f64,
    pub density: f64,
    pub reference_liquidus: f64,
    pub pressure_scale: f64,
    pub exponent: f64,
    pub anomaly_scale: f64,
}

impl Default for LiquidusModel {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            density: DENSITY,
            reference_liquidus: REFERENCE_LIQUIDUS,
            pressure_scale: LIQUIDUS_PRESSURE_SCALE,
            exponent: LIQUIDUS_EXPONENT,
            anomaly_scale: ANOMALY_SCALE,
        }
    }
}

impl LiquidusModel {
    pub fn hydrostatic_pressure(&self, depth: f64) -> f64 {
        self.gravity * self.density * depth
    }

    /// Deepest point at which the liquidus law is still defined.
    pub fn critical_depth(&self) -> f64 {
        self.pressure_scale / (self.gravity * self.density)
    }

    pub fn liquidus_temperature(&self, pressure: f64, policy: OverpressurePolicy) -> Liquidus {
        if !pressure.is_finite() {
            return Liquidus::NonFinite;
        }
        if pressure <= self.pressure_scale {
            return Liquidus::InDomain(self.power_law(pressure));
        }
        match policy {
            OverpressurePolicy::Clamp => Liquidus::Clamped(self.power_law(self.pressure_scale)),
            OverpressurePolicy::Reject | OverpressurePolicy::NotANumber => Liquidus::OutOfDomain,
        }
    }

    fn power_law(&self, pressure: f64) -> f64 {
        self.reference_liquidus * (1.0 - pressure / self.pressure_scale).powf(self.exponent)
    }

    pub fn anomaly(&self, temperature: f64, liquidus: f64) -> f64 {
        self.anomaly_scale * (temperature - liquidus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_defaults_match_reference_constants() {
        let model = LiquidusModel::default();
        assert_eq!(model.gravity, 1.4);
        assert_eq!(model.density, 916.0);
        assert_eq!(model.reference_liquidus, 73.2);
        assert_eq!(model.pressure_scale, 395.0);
        assert_abs_diff_eq!(model.exponent, 1.0 / 9.0, epsilon = 1e-15);
        assert_eq!(model.anomaly_scale, 1500.0);
    }

    #[test]
    fn test_surface_liquidus_is_reference_value() {
        let model = LiquidusModel::default();
        assert_eq!(model.hydrostatic_pressure(0.0), 0.0);
        assert_eq!(
            model.liquidus_temperature(0.0, OverpressurePolicy::Reject),
            Liquidus::InDomain(73.2)
        );
    }

    #[test]
    fn test_liquidus_at_half_scale() {
        let model = LiquidusModel::default();
        let Liquidus::InDomain(t) = model.liquidus_temperature(197.5, OverpressurePolicy::Reject)
        else {
            panic!("half the pressure scale is inside the domain");
        };
        assert_abs_diff_eq!(t, 73.2 * 0.5_f64.powf(1.0 / 9.0), epsilon = 1e-12);
        // 0.5^(1/9) ≈ 0.92587
        assert_abs_diff_eq!(t, 67.774, epsilon = 1e-3);
    }

    #[test]
    fn test_pressure_at_scale_is_in_domain() {
        let model = LiquidusModel::default();
        assert_eq!(
            model.liquidus_temperature(395.0, OverpressurePolicy::Reject),
            Liquidus::InDomain(0.0)
        );
    }

    #[test]
    fn test_overpressure_policies() {
        let model = LiquidusModel::default();
        assert_eq!(
            model.liquidus_temperature(400.0, OverpressurePolicy::Reject),
            Liquidus::OutOfDomain
        );
        assert_eq!(
            model.liquidus_temperature(400.0, OverpressurePolicy::NotANumber),
            Liquidus::OutOfDomain
        );
        assert_eq!(
            model.liquidus_temperature(400.0, OverpressurePolicy::Clamp),
            Liquidus::Clamped(0.0)
        );
    }

    #[test]
    fn test_non_finite_pressure_is_never_clamped() {
        let model = LiquidusModel::default();
        for policy in [
            OverpressurePolicy::Reject,
            OverpressurePolicy::Clamp,
            OverpressurePolicy::NotANumber,
        ] {
            assert_eq!(model.liquidus_temperature(f64::NAN, policy), Liquidus::NonFinite);
            assert_eq!(model.liquidus_temperature(f64::INFINITY, policy), Liquidus::NonFinite);
            assert_eq!(model.liquidus_temperature(f64::NEG_INFINITY, policy), Liquidus::NonFinite);
        }
    }

    #[test]
    fn test_critical_depth() {
        let model = LiquidusModel::default();
        let depth = model.critical_depth();
        assert_abs_diff_eq!(depth, 395.0 / (1.4 * 916.0), epsilon = 1e-15);
        assert_abs_diff_eq!(model.hydrostatic_pressure(depth), 395.0, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_depth_stays_defined() {
        // above the reference surface the base exceeds one
        let model = LiquidusModel::default();
        let pressure = model.hydrostatic_pressure(-0.1);
        let Liquidus::InDomain(t) = model.liquidus_temperature(pressure, OverpressurePolicy::Reject)
        else {
            panic!("negative pressure is inside the domain");
        };
        assert!(t > 73.2);
    }

    #[test]
    fn test_anomaly_scales_difference() {
        let model = LiquidusModel::default();
        assert_abs_diff_eq!(model.anomaly(80.0, 73.2), 1500.0 * 6.8, epsilon = 1e-9);
        assert_abs_diff_eq!(model.anomaly(73.2, 73.2), 0.0);
    }
}
