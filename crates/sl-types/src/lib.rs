pub mod metrics;
pub mod risk;
pub mod view;
pub mod errors;

pub use metrics::*;
pub use risk::*;
pub use view::*;
pub use errors::*;
