//! Domain records shared by the service and server crates.

pub mod errors;
pub mod movie_info;

pub use movie_info::MovieInfo;
