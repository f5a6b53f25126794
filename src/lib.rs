pub mod config;
pub mod core;
pub mod directions;
pub mod error;
pub mod handlers;
pub mod locators;
pub mod models;
pub mod polyline;
pub mod session;

pub use crate::core::{fetch_route, DirectionsClient, Locator};
pub use error::{FetchCause, RouteError};
pub use models::{Coordinate, DecodedPath, RouteQuery};
pub use polyline::{decode, encode, PolylineError};
