pub mod geo;
pub mod org;
pub mod role;
pub mod user;

pub use geo::{City, CityRow, Country, State};
pub use org::Org;
pub use role::Role;
pub use user::{Status, User, UserRow};
