//! Layout of the host's solution vector.

/// Resolves where named components live in a solution vector.
pub trait ComponentIndexResolver: Send + Sync {
    fn n_components(&self) -> usize;

    fn temperature_index(&self) -> usize;

    fn component_index(&self, name: &str) -> Option<usize>;
}

/// Solution layout: velocities (one per dimension), pressure, temperature,
/// then compositional fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Introspection {
    dim: usize,
    compositional_fields: Vec<String>,
}

impl Introspection {
    pub fn new(dim: usize, n_compositional_fields: usize) -> Self {
        let compositional_fields = (0..n_compositional_fields)
            .map(|i| format!("C_{i}"))
            .collect();
        Introspection {
            dim,
            compositional_fields,
        }
    }

    pub fn with_compositional_fields(dim: usize, names: &[&str]) -> Self {
        Introspection {
            dim,
            compositional_fields: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn pressure_index(&self) -> usize {
        self.dim
    }
}

impl ComponentIndexResolver for Introspection {
    fn n_components(&self) -> usize {
        self.dim + 2 + self.compositional_fields.len()
    }

    fn temperature_index(&self) -> usize {
        self.dim + 1
    }

    fn component_index(&self, name: &str) -> Option<usize> {
        const VELOCITY: [&str; 3] = ["velocity_x", "velocity_y", "velocity_z"];
        if let Some(axis) = VELOCITY.iter().take(self.dim).position(|v| *v == name) {
            return Some(axis);
        }
        match name {
            "pressure" => Some(self.pressure_index()),
            "temperature" => Some(self.temperature_index()),
            _ => self
                .compositional_fields
                .iter()
                .position(|f| f == name)
                .map(|i| self.dim + 2 + i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_2d() {
        let introspection = Introspection::new(2, 0);
        assert_eq!(introspection.n_components(), 4);
        assert_eq!(introspection.temperature_index(), 3);
        assert_eq!(introspection.component_index("velocity_y"), Some(1));
        assert_eq!(introspection.component_index("velocity_z"), None);
        assert_eq!(introspection.component_index("pressure"), Some(2));
    }

    #[test]
    fn test_layout_3d_with_fields() {
        let introspection = Introspection::with_compositional_fields(3, &["porosity", "salinity"]);
        assert_eq!(introspection.n_components(), 7);
        assert_eq!(introspection.temperature_index(), 4);
        assert_eq!(introspection.component_index("temperature"), Some(4));
        assert_eq!(introspection.component_index("salinity"), Some(6));
        assert_eq!(introspection.component_index("density"), None);
    }
}
