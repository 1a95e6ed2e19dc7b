use glam::DVec3;

/// Sample points handed over by the host for one output step.
///
/// Row `q` pairs `evaluation_points[q]` with `solution_values[q]`; results go to
/// slot `q` of a caller-owned output buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationBatch {
    pub evaluation_points: Vec<DVec3>,
    pub solution_values: Vec<Vec<f64>>,
}

impl EvaluationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        EvaluationBatch {
            evaluation_points: Vec::with_capacity(n),
            solution_values: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, position: DVec3, solution: Vec<f64>) {
        self.evaluation_points.push(position);
        self.solution_values.push(solution);
    }

    pub fn len(&self) -> usize {
        self.evaluation_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluation_points.is_empty()
    }
}
