//! The `deltaX` visualization postprocessor.
//!
//! Outputs `1500 * (T - T_liquidus(p))` per sample point, where `p` is the
//! hydrostatic pressure at the point's depth. The depth-slice count and the two
//! boundary flags are declared, validated and stored, but the anomaly formula
//! does not read them: they describe a depth-averaging scheme that is not part
//! of this postprocessor's output.

use crate::batch::EvaluationBatch;
use crate::constants::{
    DEFAULT_DEPTH_SLICES, DEPTH_SLICES_ENTRY, MAXIMAL_BOTTOM_ENTRY, MINIMAL_SURFACE_ENTRY,
    POSTPROCESSOR_DESCRIPTION, POSTPROCESSOR_NAME, SECTION_PATH,
};
use crate::error::{EvaluationError, ParameterError};
use crate::geometry::DepthProvider;
use crate::introspection::ComponentIndexResolver;
use crate::liquidus::{Liquidus, LiquidusModel, OverpressurePolicy};
use crate::parameters::{entry_path, ParameterHandler, Pattern};
use crate::postprocessor::{HostAccess, VisualizationPostprocessor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaXConfig {
    /// Always >= 1.
    pub depth_slices: u32,
    pub extrapolate_surface: bool,
    pub extrapolate_bottom: bool,
}

impl Default for DeltaXConfig {
    fn default() -> Self {
        DeltaXConfig {
            depth_slices: DEFAULT_DEPTH_SLICES,
            extrapolate_surface: false,
            extrapolate_bottom: false,
        }
    }
}

impl DeltaXConfig {
    pub fn declare_parameters(prm: &mut ParameterHandler) -> Result<(), ParameterError> {
        prm.declare_entry(
            &SECTION_PATH,
            DEPTH_SLICES_ENTRY,
            &DEFAULT_DEPTH_SLICES.to_string(),
            Pattern::integer_at_least(1),
            "Number of depth slices used to define average temperature.",
        )?;
        prm.declare_entry(
            &SECTION_PATH,
            MAXIMAL_BOTTOM_ENTRY,
            "true",
            Pattern::Bool,
            "If true, use the specified boundary temperatures as average temperatures at the surface. \
             If false, extrapolate the temperature gradient between the first and second cells to the surface. \
             This option will only work for models with a fixed surface temperature. ",
        )?;
        prm.declare_entry(
            &SECTION_PATH,
            MINIMAL_SURFACE_ENTRY,
            "true",
            Pattern::Bool,
            "Whether to use the minimal specified boundary temperature as the bottom boundary temperature. \
             This option will only work for models with a fixed bottom boundary temperature. ",
        )?;
        debug!(section = %SECTION_PATH.join("/"), "declared deltaX parameters");
        Ok(())
    }

    pub fn parse_parameters(prm: &ParameterHandler) -> Result<Self, ParameterError> {
        let raw_slices = prm.get_integer(&SECTION_PATH, DEPTH_SLICES_ENTRY)?;
        let depth_slices = u32::try_from(raw_slices)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| ParameterError::InvalidValue {
                path: entry_path(&SECTION_PATH, DEPTH_SLICES_ENTRY),
                value: raw_slices.to_string(),
                pattern: Pattern::Integer {
                    min: Some(1),
                    max: Some(u32::MAX as i64),
                }
                .to_string(),
            })?;

        let config = DeltaXConfig {
            depth_slices,
            extrapolate_surface: !prm.get_bool(&SECTION_PATH, MINIMAL_SURFACE_ENTRY)?,
            extrapolate_bottom: !prm.get_bool(&SECTION_PATH, MAXIMAL_BOTTOM_ENTRY)?,
        };
        debug!(?config, "parsed deltaX parameters");
        Ok(config)
    }
}

pub struct DeltaX {
    geometry: Arc<dyn DepthProvider>,
    introspection: Arc<dyn ComponentIndexResolver>,
    config: DeltaXConfig,
    model: LiquidusModel,
    policy: OverpressurePolicy,
}

impl DeltaX {
    pub fn new(
        geometry: Arc<dyn DepthProvider>,
        introspection: Arc<dyn ComponentIndexResolver>,
    ) -> Self {
        DeltaX {
            geometry,
            introspection,
            config: DeltaXConfig::default(),
            model: LiquidusModel::default(),
            policy: OverpressurePolicy::default(),
        }
    }

    pub fn with_model(mut self, model: LiquidusModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_policy(mut self, policy: OverpressurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &DeltaXConfig {
        &self.config
    }

    pub fn model(&self) -> &LiquidusModel {
        &self.model
    }

    pub fn policy(&self) -> OverpressurePolicy {
        self.policy
    }

    /// Anomaly for a single temperature at a given depth.
    ///
    /// Returns `None` when the pressure is non-finite, or out of the liquidus
    /// domain and the policy does not clamp.
    pub fn delta_x_at_depth(&self, temperature: f64, depth: f64) -> Option<f64> {
        let pressure = self.model.hydrostatic_pressure(depth);
        match self.model.liquidus_temperature(pressure, self.policy) {
            Liquidus::InDomain(t_liquidus) | Liquidus::Clamped(t_liquidus) => {
                Some(self.model.anomaly(temperature, t_liquidus))
            }
            Liquidus::OutOfDomain | Liquidus::NonFinite => None,
        }
    }

    fn check_shape(&self, input: &EvaluationBatch, computed: &[f64]) -> Result<usize, EvaluationError> {
        let n_points = input.evaluation_points.len();
        if input.solution_values.len() != n_points {
            return Err(EvaluationError::BatchSizeMismatch {
                points: n_points,
                solutions: input.solution_values.len(),
            });
        }
        if computed.len() != n_points {
            return Err(EvaluationError::OutputSizeMismatch {
                inputs: n_points,
                outputs: computed.len(),
            });
        }

        let n_components = self.introspection.n_components();
        let temperature_index = self.introspection.temperature_index();
        if temperature_index >= n_components {
            return Err(EvaluationError::TemperatureIndexOutOfRange {
                index: temperature_index,
                n_components,
            });
        }
        if let Some((point, solution)) = input
            .solution_values
            .iter()
            .enumerate()
            .find(|(_, s)| s.len() != n_components)
        {
            return Err(EvaluationError::ComponentCountMismatch {
                point,
                found: solution.len(),
                expected: n_components,
            });
        }
        Ok(temperature_index)
    }
}

impl VisualizationPostprocessor for DeltaX {
    fn create(access: HostAccess) -> Self {
        DeltaX::new(access.geometry, access.introspection)
    }

    fn declare_parameters(prm: &mut ParameterHandler) -> Result<(), ParameterError> {
        DeltaXConfig::declare_parameters(prm)
    }

    fn name(&self) -> &str {
        POSTPROCESSOR_NAME
    }

    fn description(&self) -> &str {
        POSTPROCESSOR_DESCRIPTION
    }

    fn parse_parameters(&mut self, prm: &ParameterHandler) -> Result<(), ParameterError> {
        self.config = DeltaXConfig::parse_parameters(prm)?;

        let maximal_depth = self.geometry.maximal_depth();
        let critical_depth = self.model.critical_depth();
        if maximal_depth > critical_depth {
            warn!(
                maximal_depth,
                critical_depth,
                policy = ?self.policy,
                "model extends below the depth where the liquidus law is defined"
            );
        }
        Ok(())
    }

    fn evaluate_vector_field(
        &self,
        input: &EvaluationBatch,
        computed: &mut [f64],
    ) -> Result<(), EvaluationError> {
        let temperature_index = self.check_shape(input, computed)?;
        trace!(points = input.len(), "evaluating deltaX");

        let mut clamped = 0usize;
        let rows = input.evaluation_points.iter().zip(&input.solution_values);
        for (q, ((position, solution), out)) in rows.zip(computed.iter_mut()).enumerate() {
            let temperature = solution[temperature_index];
            let depth = self.geometry.depth(position);
            let pressure = self.model.hydrostatic_pressure(depth);

            *out = match self.model.liquidus_temperature(pressure, self.policy) {
                Liquidus::InDomain(t_liquidus) => self.model.anomaly(temperature, t_liquidus),
                Liquidus::Clamped(t_liquidus) => {
                    clamped += 1;
                    self.model.anomaly(temperature, t_liquidus)
                }
                Liquidus::OutOfDomain => match self.policy {
                    OverpressurePolicy::NotANumber => f64::NAN,
                    _ => {
                        return Err(EvaluationError::PressureOutOfRange {
                            point: q,
                            depth,
                            pressure,
                            limit: self.model.pressure_scale,
                        });
                    }
                },
                Liquidus::NonFinite => match self.policy {
                    OverpressurePolicy::NotANumber => f64::NAN,
                    _ => {
                        return Err(EvaluationError::NonFinitePressure {
                            point: q,
                            depth,
                            pressure,
                        });
                    }
                },
            };
        }

        if clamped > 0 {
            warn!(clamped, points = input.len(), "pressure clamped to the liquidus pressure scale");
        }
        Ok(())
    }
}
