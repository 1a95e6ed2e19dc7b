// Material constants baked into the deltaX liquidus law.
pub const GRAVITY: f64 = 1.4; // m/s²
pub const DENSITY: f64 = 916.0; // kg/m³
pub const REFERENCE_LIQUIDUS: f64 = 73.2; // liquidus temperature at zero pressure
pub const LIQUIDUS_PRESSURE_SCALE: f64 = 395.0; // pressure at which the liquidus reaches zero
pub const LIQUIDUS_EXPONENT: f64 = 1.0 / 9.0;
pub const ANOMALY_SCALE: f64 = 1500.0;

// Parameter file layout
pub const SECTION_PATH: [&str; 3] = ["Postprocess", "Visualization", "deltaX"];
pub const DEPTH_SLICES_ENTRY: &str = "Number of depth slices";
pub const MAXIMAL_BOTTOM_ENTRY: &str = "Use maximal temperature for bottom";
pub const MINIMAL_SURFACE_ENTRY: &str = "Use minimal temperature for surface";
pub const DEFAULT_DEPTH_SLICES: u32 = 20;

// Registration
pub const POSTPROCESSOR_NAME: &str = "deltaX";
pub const POSTPROCESSOR_DESCRIPTION: &str = "A visualization output postprocessor that outputs the temperature minus the depth-average of the temperature.\
The average temperature is calculated using the lateral averaging function from the ``depth average'' \
postprocessor and interpolated linearly between the layers specified through ``Number of depth slices''";
