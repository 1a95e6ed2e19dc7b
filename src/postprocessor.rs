use crate::batch::EvaluationBatch;
use crate::constants::{POSTPROCESSOR_DESCRIPTION, POSTPROCESSOR_NAME};
use crate::delta_x::DeltaX;
use crate::error::{EvaluationError, ParameterError, RegistryError};
use crate::geometry::DepthProvider;
use crate::introspection::ComponentIndexResolver;
use crate::parameters::ParameterHandler;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Collaborators the host hands to every postprocessor it creates.
#[derive(Clone)]
pub struct HostAccess {
    pub geometry: Arc<dyn DepthProvider>,
    pub introspection: Arc<dyn ComponentIndexResolver>,
}

/// A pointwise scalar output derived from the solution for visualization.
pub trait VisualizationPostprocessor: Send + Sync {
    fn create(access: HostAccess) -> Self
    where
        Self: Sized;

    /// Declares this postprocessor's entries; called once before any input is read.
    fn declare_parameters(prm: &mut ParameterHandler) -> Result<(), ParameterError>
    where
        Self: Sized;

    /// The name of this postprocessor (for identification and lookup)
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parse_parameters(&mut self, prm: &ParameterHandler) -> Result<(), ParameterError>;

    /// Writes one scalar per sample point into `computed`, in input order.
    fn evaluate_vector_field(
        &self,
        input: &EvaluationBatch,
        computed: &mut [f64],
    ) -> Result<(), EvaluationError>;
}

type DeclareFn = fn(&mut ParameterHandler) -> Result<(), ParameterError>;
type CreateFn = fn(HostAccess) -> Box<dyn VisualizationPostprocessor>;

#[derive(Clone)]
struct Registration {
    description: String,
    declare: DeclareFn,
    create: CreateFn,
}

fn create_boxed<P: VisualizationPostprocessor + 'static>(
    access: HostAccess,
) -> Box<dyn VisualizationPostprocessor> {
    Box::new(P::create(access))
}

static REGISTRY: Lazy<Mutex<BTreeMap<String, Registration>>> = Lazy::new(|| {
    let mut m = BTreeMap::new();
    m.insert(
        POSTPROCESSOR_NAME.to_string(),
        Registration {
            description: POSTPROCESSOR_DESCRIPTION.to_string(),
            declare: DeltaX::declare_parameters,
            create: create_boxed::<DeltaX>,
        },
    );
    Mutex::new(m)
});

fn registry() -> std::sync::MutexGuard<'static, BTreeMap<String, Registration>> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn register_visualization_postprocessor<P: VisualizationPostprocessor + 'static>(
    name: &str,
    description: &str,
) -> Result<(), RegistryError> {
    let mut registry = registry();
    if registry.contains_key(name) {
        return Err(RegistryError::DuplicateName(name.to_string()));
    }
    registry.insert(
        name.to_string(),
        Registration {
            description: description.to_string(),
            declare: P::declare_parameters,
            create: create_boxed::<P>,
        },
    );
    debug!(name, "registered visualization postprocessor");
    Ok(())
}

/// `(name, description)` of every registered postprocessor, sorted by name.
pub fn registered_postprocessors() -> Vec<(String, String)> {
    registry()
        .iter()
        .map(|(name, reg)| (name.clone(), reg.description.clone()))
        .collect()
}

pub fn create_visualization_postprocessor(
    name: &str,
    access: HostAccess,
) -> Result<Box<dyn VisualizationPostprocessor>, RegistryError> {
    // copy the factory out so the lock is not held while constructing
    let create = registry()
        .get(name)
        .map(|reg| reg.create)
        .ok_or_else(|| RegistryError::UnknownPostprocessor(name.to_string()))?;
    Ok(create(access))
}

/// Declares the entries of every registered postprocessor into `prm`.
pub fn declare_all_parameters(prm: &mut ParameterHandler) -> Result<(), ParameterError> {
    let declares: Vec<DeclareFn> = registry().values().map(|reg| reg.declare).collect();
    for declare in declares {
        declare(prm)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoxGeometry;
    use crate::introspection::Introspection;
    use glam::DVec3;

    fn access() -> HostAccess {
        HostAccess {
            geometry: Arc::new(BoxGeometry::new_2d(1.0, 0.2).unwrap()),
            introspection: Arc::new(Introspection::new(2, 0)),
        }
    }

    #[test]
    fn test_delta_x_is_registered_with_description() {
        let listed = registered_postprocessors();
        let (_, description) = listed
            .iter()
            .find(|(name, _)| name == "deltaX")
            .expect("deltaX registered");
        assert!(description.starts_with("A visualization output postprocessor"));
        assert!(description.contains("Number of depth slices"));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        assert_eq!(
            register_visualization_postprocessor::<DeltaX>("deltaX", "again"),
            Err(RegistryError::DuplicateName("deltaX".to_string()))
        );
    }

    #[test]
    fn test_unknown_name() {
        assert!(matches!(
            create_visualization_postprocessor("no such output", access()),
            Err(RegistryError::UnknownPostprocessor(_))
        ));
    }

    #[test]
    fn test_created_instance_evaluates() {
        let mut prm = ParameterHandler::new();
        declare_all_parameters(&mut prm).unwrap();

        let mut postprocessor = create_visualization_postprocessor("deltaX", access()).unwrap();
        postprocessor.parse_parameters(&prm).unwrap();
        assert_eq!(postprocessor.name(), "deltaX");

        let mut input = EvaluationBatch::new();
        input.push(DVec3::new(0.5, 0.2, 0.0), vec![0.0, 0.0, 0.0, 73.2]);
        let mut out = vec![1.0];
        postprocessor.evaluate_vector_field(&input, &mut out).unwrap();
        assert_eq!(out[0], 0.0);
    }
}
