use ndarray::{Array2, ArrayView2, Zip};

/// The logistic function, the network's only nonlinearity.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sigmoid;

impl Sigmoid {
    pub fn f(&self, z: f64) -> f64 {
        1. / (1. + (-z).exp())
    }

    /// The derivative expressed through the function's own output `a = f(z)`.
    pub fn df(&self, a: f64) -> f64 {
        a * (1. - a)
    }

    /// Applies the function to every weighted sum in place.
    pub fn activate(&self, z: &mut Array2<f64>) {
        z.par_mapv_inplace(|z| self.f(z));
    }

    /// Scales the incoming error by the derivative at each cached output, `err ⊙ a ⊙ (1 - a)`.
    pub fn backprop(&self, mut err: Array2<f64>, a: ArrayView2<f64>) -> Array2<f64> {
        Zip::from(&mut err).and(&a).for_each(|e, &a| *e *= self.df(a));
        err
    }
}
