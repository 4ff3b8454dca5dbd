//! Domain layer: Unit, Poset (floors, levels, primes), compliance, and
//! parent-selection creation logic (§3, §4.1-§4.4).

mod compliance;
mod creation;
mod error;
mod floor;
mod poset;
mod unit;

pub use compliance::check_compliance;
pub use creation::{adapt_create_delay, select_parents};
pub use error::{ComplianceViolation, PosetError, PosetResult};
pub use floor::{below, combine_floors, in_floor, Floor, UnitLookup};
pub use poset::{InsertOutcome, Poset};
pub use unit::{sign_unit, CoinSharePayload, PreUnit, Unit};
