/// Memoization key for a resolved location.
///
/// An external id wins; otherwise name plus coordinates rounded to three
/// decimals (~100 m), so re-selecting the same place hits the cache.
pub fn location_key(id: Option<&str>, name: &str, lat: f64, lng: f64) -> String {
    match id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("{name}_{lat:.3}_{lng:.3}"),
    }
}
