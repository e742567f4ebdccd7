pub mod activations;
pub mod backward;
pub mod forward;
pub mod layers;
pub mod loss;
mod network;
mod weights;

pub use backward::Gradients;
pub use forward::ActivationCache;
pub use network::Network;
pub use weights::{WeightSnapshot, Weights};
