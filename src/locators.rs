use crate::core::Locator;
use crate::models::Coordinate;
use anyhow::Error;
use std::future::Future;
use std::pin::Pin;

/// A position handed to us by the caller, or none when the caller could not
/// obtain one.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator {
    position: Option<Coordinate>,
}

impl FixedLocator {
    pub fn new(position: Coordinate) -> Self {
        Self { position: Some(position) }
    }

    pub fn denied() -> Self {
        Self { position: None }
    }
}

impl From<Option<Coordinate>> for FixedLocator {
    fn from(position: Option<Coordinate>) -> Self {
        Self { position }
    }
}

impl Locator for FixedLocator {
    fn locate<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Option<Coordinate>, Error>> + 'a>> {
        Box::pin(async move { Ok(self.position) })
    }
}
