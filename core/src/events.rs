/// Recorded after every successful network fetch (never for cache fallbacks).
pub const FETCHED: &str = "fetched";
