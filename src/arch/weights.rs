use ndarray::Array2;

/// The network's parameters: one matrix per layer transition, bias row first.
///
/// Every write goes through this type and bumps `version`, so callers can tell whether the
/// parameters changed between two points in time without comparing matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Weights {
    matrices: Vec<Array2<f64>>,
    version: u64,
}

/// A full copy of the weights taken at a given version.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSnapshot {
    matrices: Vec<Array2<f64>>,
    version: u64,
}

impl Weights {
    pub(crate) fn new(matrices: Vec<Array2<f64>>) -> Self {
        Self {
            matrices,
            version: 0,
        }
    }

    /// Returns the weight matrices in layer order.
    pub fn matrices(&self) -> &[Array2<f64>] {
        &self.matrices
    }

    /// Returns how many times the weights have been written to.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// Gives mutable access to every matrix for a single update.
    ///
    /// The version is bumped once per call, regardless of how many matrices `f` touches.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut [Array2<f64>]),
    {
        f(&mut self.matrices);
        self.version += 1;
    }

    /// Copies the current weights.
    pub fn snapshot(&self) -> WeightSnapshot {
        WeightSnapshot {
            matrices: self.matrices.clone(),
            version: self.version,
        }
    }

    /// Overwrites the weights with a previously taken snapshot.
    ///
    /// Restoring is itself a write, so the version keeps moving forward.
    pub fn restore(&mut self, snapshot: WeightSnapshot) {
        self.matrices = snapshot.matrices;
        self.version += 1;
    }

    pub fn into_matrices(self) -> Vec<Array2<f64>> {
        self.matrices
    }
}

impl WeightSnapshot {
    pub fn matrices(&self) -> &[Array2<f64>] {
        &self.matrices
    }

    /// Returns the version of the weights this snapshot was taken from.
    pub fn version(&self) -> u64 {
        self.version
    }
}
