use std::fmt;

/// Joins the two port halves of a key. Port codes never contain it.
pub const KEY_SEPARATOR: char = '_';

/// Canonical, directional identifier of a route in the status cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey(String);

impl RouteKey {
    pub fn new(departure: &str, arrival: &str) -> Self {
        let departure = departure.to_lowercase();
        let arrival = arrival.to_lowercase();
        let mut key = String::with_capacity(departure.len() + arrival.len() + 1);
        key.push_str(&departure);
        key.push(KEY_SEPARATOR);
        key.push_str(&arrival);
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized cache key for a departure/arrival pair.
pub fn route_key(departure: &str, arrival: &str) -> RouteKey {
    RouteKey::new(departure, arrival)
}
