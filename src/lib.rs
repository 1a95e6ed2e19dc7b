pub mod batch;
pub mod constants;
pub mod delta_x;
pub mod error;
pub mod geometry;
pub mod introspection;
pub mod liquidus;
pub mod parameters;
pub mod postprocessor;

pub use batch::EvaluationBatch;
pub use delta_x::{DeltaX, DeltaXConfig};
pub use error::{EvaluationError, GeometryError, ParameterError, RegistryError};
pub use geometry::{BoxGeometry, DepthProvider, SphericalShell};
pub use introspection::{ComponentIndexResolver, Introspection};
pub use liquidus::{LiquidusModel, OverpressurePolicy};
pub use parameters::{ParameterHandler, Pattern};
pub use postprocessor::{HostAccess, VisualizationPostprocessor};
