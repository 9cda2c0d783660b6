//! Domain value types.

mod date;
mod frequency;
mod ids;
mod tenor;

pub use date::Date;
pub use frequency::Frequency;
pub use ids::{CurveId, InstrumentId};
pub use tenor::{Tenor, TenorUnit};
