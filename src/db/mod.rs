pub mod cities;
pub mod countries;
pub mod orgs;
pub mod permissions;
pub mod roles;
pub mod states;
pub mod users;
