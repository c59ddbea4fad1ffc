pub mod dialect; // Per-backend profiles
pub mod dispatcher;
pub mod normalizer;
pub mod renderer;
pub mod workflow;

pub use dispatcher::*;
pub use normalizer::*;
pub use renderer::*;
pub use workflow::*;
