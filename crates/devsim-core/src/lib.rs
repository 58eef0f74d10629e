pub mod advisory;
pub mod error;
pub mod model;
pub mod scenario;
pub mod template;

pub use advisory::{Advisory, validate};
pub use error::ModelError;
pub use model::{Lot, LotUse, RegulationSet, Scenario, Tract, TractKind, Typology};
