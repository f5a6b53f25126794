use crate::config::Config;
use crate::core::DirectionsClient;
use crate::error::{Error, RequestError};
use crate::locators::FixedLocator;
use crate::models::Coordinate;
use crate::session::{Sessions, Snapshot};
use actix_header::actix_header;
use actix_web::web::{get, Data, Header, Json, Query, ServiceConfig};
use serde::{Deserialize, Serialize};

#[actix_header("UID")]
pub struct UID(String);

impl From<String> for UID {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<UID> for String {
    fn from(u: UID) -> Self {
        u.0
    }
}

pub fn routes<C>(cfg: &mut ServiceConfig)
where
    C: DirectionsClient + 'static,
{
    cfg.route("/route", get().to(refresh_route::<C>))
        .route("/route/current", get().to(current_route));
}

/// Device position as reported by the client. Both fields absent means the
/// client has no location permission.
#[derive(Deserialize)]
pub(crate) struct RouteParams {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl RouteParams {
    fn position(&self) -> Result<Option<Coordinate>, RequestError> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => {
                let position = Coordinate::new(latitude, longitude);
                if !position.is_valid() {
                    return Err(RequestError::OutOfRange(position));
                }
                Ok(Some(position))
            }
            (None, None) => Ok(None),
            _ => Err(RequestError::MissingCoordinate),
        }
    }
}

/// Everything needed to draw the two markers and the route line.
#[derive(Serialize)]
pub(crate) struct RouteView {
    #[serde(flatten)]
    snapshot: Snapshot,
    destination: Coordinate,
}

pub(crate) async fn refresh_route<C>(
    Header(UID(uid)): Header<UID>,
    Query(params): Query<RouteParams>,
    client: Data<C>,
    sessions: Data<Sessions>,
    config: Data<Config>,
) -> Result<Json<RouteView>, Error>
where
    C: DirectionsClient + 'static,
{
    let locator = FixedLocator::from(params.position()?);
    let session = sessions.get_or_create(&uid);
    session.refresh(&locator, client.get_ref(), config.destination).await?;
    Ok(Json(RouteView {
        snapshot: session.snapshot(),
        destination: config.destination,
    }))
}

pub(crate) async fn current_route(Header(UID(uid)): Header<UID>, sessions: Data<Sessions>, config: Data<Config>) -> Result<Json<RouteView>, Error> {
    let snapshot = sessions.get(&uid).map(|s| s.snapshot()).unwrap_or_default();
    Ok(Json(RouteView {
        snapshot,
        destination: config.destination,
    }))
}
