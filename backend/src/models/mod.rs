pub mod documents;
pub mod geo;
pub mod layer;
pub mod opacity;
pub mod tiles;
pub mod time;

pub use documents::*;
pub use geo::*;
pub use layer::*;
pub use opacity::*;
pub use tiles::*;
pub use time::*;
