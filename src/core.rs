use crate::error::{FetchCause, RouteError};
use crate::models::{Coordinate, DecodedPath, DirectionsResponse, RouteQuery};
use crate::polyline;
use anyhow::Error;
use std::future::Future;
use std::pin::Pin;

/// Source of the user's current position.
///
/// `Ok(None)` means the position is not available to us (permission denied),
/// in which case no route is fetched.
pub trait Locator {
    fn locate<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Option<Coordinate>, Error>> + 'a>>;
}

/// A directions service answering one query with one response.
pub trait DirectionsClient {
    fn directions<'a>(&'a self, query: &'a RouteQuery) -> Pin<Box<dyn Future<Output = Result<DirectionsResponse, RouteError>> + 'a>>;
}

/// Fetches the route for `query` and decodes the first route's polyline.
///
/// No route in the response is an empty path, not an error. Transport and
/// parse failures are returned as [`RouteError::FetchFailed`]. Nothing is retried.
pub async fn fetch_route<C>(client: &C, query: &RouteQuery) -> Result<DecodedPath, RouteError>
where
    C: DirectionsClient,
{
    log::debug!("fetching route {} -> {}", query.origin, query.destination);
    let resp = client.directions(query).await?;
    if let Some(status) = resp.rejection() {
        return Err(FetchCause::Api {
            status: status.to_owned(),
            message: resp.error_message.clone().unwrap_or_default(),
        }
        .into());
    }
    let route = match resp.routes.first() {
        Some(route) => route,
        None => {
            log::info!("no route between {} and {}", query.origin, query.destination);
            return Ok(Vec::new());
        }
    };
    let path = polyline::decode(&route.polyline.points)?;
    Ok(path)
}
