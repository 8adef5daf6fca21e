pub mod fallback;
pub mod normalizer;
pub mod sources;
pub mod transport;

pub use fallback::*;
pub use normalizer::*;
pub use sources::*;
pub use transport::*;
