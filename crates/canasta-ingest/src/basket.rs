//! Name-containment matching for the basket scrape path.
//!
//! The basket run searches by product name instead of browsing categories,
//! so results are matched back to basket products by best-effort substring
//! containment. Lower precision than exact category browsing is accepted in
//! exchange for a much cheaper, more frequent run.

/// Returns `true` if the offer name contains any basket product name
/// (case-insensitive). `basket_names` must already be lowercased.
pub(crate) fn matches_any_basket_name(offer_name: &str, basket_names: &[String]) -> bool {
    let lowered = offer_name.to_lowercase();
    basket_names.iter().any(|name| lowered.contains(name))
}

/// Lowercases and drops blank names; the result feeds both the search terms
/// and the containment filter.
pub(crate) fn normalized_basket_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_lowercase)
        .collect()
}
