//! Stop schedule model, deserialized from the in-memory schedule body.
//!
//! Strings borrow from the receive buffer, so a [`Stop`] lives only as long
//! as the body it was parsed from.
//!
//! ```rust
//! use transit_sign::schedule;
//!
//! let body = br#"{"last_updated":1700000000,"id":"73","route_directions":[
//!     {"direction_code":"N","id":20001,"departures":[
//!         {"skipped":false,"etd":300,"trip":{"direction_code":"N"}}]}]}"#;
//!
//! let stop = schedule::parse(body).unwrap();
//! assert_eq!(stop.id, "73");
//! assert_eq!(stop.route(20001, "N").unwrap().departures[0].etd, 300);
//! ```

use heapless::Vec;
use serde::Deserialize;

/// Routes kept per stop.
pub const MAX_ROUTES: usize = 6;

/// Departures kept per route direction.
pub const MAX_DEPARTURES: usize = 4;

/// Trip a departure belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Trip<'a> {
    pub direction_code: &'a str,
}

/// A single departure from the stop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Departure<'a> {
    pub skipped: bool,
    /// Estimated time of departure, seconds from now.
    pub etd: u32,
    #[serde(borrow)]
    pub trip: Trip<'a>,
}

/// One route in one direction at the stop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteDirection<'a> {
    pub direction_code: &'a str,
    pub id: u32,
    #[serde(borrow)]
    pub departures: Vec<Departure<'a>, MAX_DEPARTURES>,
}

impl<'a> RouteDirection<'a> {
    /// Departures that are not skipped, in schedule order.
    pub fn upcoming(&self) -> impl Iterator<Item = &Departure<'a>> {
        self.departures.iter().filter(|d| !d.skipped)
    }
}

/// Departure board for one stop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Stop<'a> {
    /// Unix timestamp of the backend's last update.
    pub last_updated: u64,
    pub id: &'a str,
    #[serde(borrow)]
    pub route_directions: Vec<RouteDirection<'a>, MAX_ROUTES>,
}

impl<'a> Stop<'a> {
    /// Route `id` in `direction_code`, if the stop serves it.
    pub fn route(&self, id: u32, direction_code: &str) -> Option<&RouteDirection<'a>> {
        self.route_directions
            .iter()
            .find(|r| r.id == id && r.direction_code == direction_code)
    }
}

/// Why a schedule body was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The body is not a schedule document, or exceeds the route or
    /// departure limits.
    Json,
    /// Something other than whitespace follows the document.
    TrailingData,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Json => defmt::write!(f, "Json"),
            Error::TrailingData => defmt::write!(f, "TrailingData"),
        }
    }
}

/// Parse a schedule body as returned by the schedule fetch.
///
/// A trailing NUL terminator is accepted.
pub fn parse(body: &[u8]) -> Result<Stop<'_>, Error> {
    let end = body.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    let (stop, _) = serde_json_core::from_slice::<Stop<'_>>(&body[..end]).map_err(|e| {
        error!("Schedule JSON rejected");
        match e {
            serde_json_core::de::Error::TrailingCharacters => Error::TrailingData,
            _ => Error::Json,
        }
    })?;
    debug!(
        "Stop {} updated {} with {} routes",
        stop.id,
        stop.last_updated,
        stop.route_directions.len()
    );
    Ok(stop)
}
