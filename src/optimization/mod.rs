mod adaptive;
mod gradient_descent;
mod optimizer;

pub use adaptive::{AdaptiveLearningRate, Adjustment};
pub use gradient_descent::GradientDescent;
pub use optimizer::Optimizer;
