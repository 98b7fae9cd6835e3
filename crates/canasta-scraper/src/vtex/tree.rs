//! Pure category-tree logic: name filtering, `resources` header parsing,
//! and the pagination plan for a counted category.

use super::types::CategoryNode;

/// VTEX refuses search offsets at or beyond this index, so a single category
/// can only ever be paginated this deep. Categories reporting more products
/// must be subdivided into children.
pub const PAGINATION_CEILING: u32 = 2_500;

/// Fixed `_from`/`_to` window size for search pagination.
pub const PAGE_SIZE: u32 = 50;

/// Substrings (lowercase) that admit a category into the scrape scope:
/// groceries, beverages, fresh food, cleaning, personal care, and
/// school/office supplies.
const ALLOW_PATTERNS: &[&str] = &[
    "abarrote",
    "despensa",
    "alimento",
    "desayuno",
    "bebida",
    "lacteo",
    "lácteo",
    "fruta",
    "verdura",
    "carne",
    "pollo",
    "pescado",
    "congelado",
    "panader",
    "limpieza",
    "cuidado personal",
    "higiene",
    "aseo",
    "escolar",
    "utiles",
    "útiles",
    "oficina",
    "papeler",
];

/// Substrings (lowercase) that exclude a category even when an allow pattern
/// also matches (e.g. "Alimentos para mascotas").
const DENY_PATTERNS: &[&str] = &[
    "electro",
    "tecnolog",
    "computo",
    "cómputo",
    "celular",
    "televisor",
    "mueble",
    "colchon",
    "colchón",
    "dormitorio",
    "ropa",
    "moda",
    "calzado",
    "zapatilla",
    "juguete",
    "deporte",
    "ferreter",
    "automotriz",
    "mascota",
];

/// Decides whether a category name is in scope for grocery scraping.
///
/// Deny patterns win over allow patterns; names matching neither list are
/// excluded.
#[must_use]
pub fn category_in_scope(name: &str) -> bool {
    let lowered = name.to_lowercase();
    if DENY_PATTERNS.iter().any(|p| lowered.contains(p)) {
        return false;
    }
    ALLOW_PATTERNS.iter().any(|p| lowered.contains(p))
}

/// Parses the total result count from a VTEX `resources` header
/// (`"start-end/total"`, e.g. `"0-49/1375"`).
#[must_use]
pub fn parse_resources_total(header: &str) -> Option<u32> {
    header.rsplit('/').next()?.trim().parse().ok()
}

/// How to scrape one counted category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryPlan {
    /// Nothing to fetch.
    Skip,
    /// Paginate the category directly for the first `limit` products.
    Paginate { limit: u32 },
    /// Too large for direct pagination; descend into child categories.
    Recurse,
}

/// Plans the scrape for a category given its reported product count.
///
/// Counts under the pagination ceiling paginate directly. Larger categories
/// recurse into their children; a large category without children falls back
/// to the first `PAGINATION_CEILING` products.
#[must_use]
pub fn plan_category(total: u32, node: &CategoryNode) -> CategoryPlan {
    if total == 0 {
        return CategoryPlan::Skip;
    }
    if total < PAGINATION_CEILING {
        return CategoryPlan::Paginate { limit: total };
    }
    if node.children.is_empty() {
        return CategoryPlan::Paginate {
            limit: PAGINATION_CEILING,
        };
    }
    CategoryPlan::Recurse
}

/// Returns the `(_from, _to)` windows that cover `limit` products.
#[must_use]
pub fn page_windows(limit: u32) -> Vec<(u32, u32)> {
    let mut windows = Vec::new();
    let mut from = 0u32;
    while from < limit {
        let to = (from + PAGE_SIZE - 1).min(limit - 1);
        windows.push((from, to));
        from += PAGE_SIZE;
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, children: Vec<CategoryNode>) -> CategoryNode {
        CategoryNode {
            id: 1,
            name: name.to_string(),
            has_children: !children.is_empty(),
            children,
        }
    }

    #[test]
    fn grocery_and_cleaning_categories_are_in_scope() {
        assert!(category_in_scope("Abarrotes"));
        assert!(category_in_scope("Bebidas"));
        assert!(category_in_scope("Limpieza del Hogar"));
        assert!(category_in_scope("Cuidado Personal"));
        assert!(category_in_scope("Útiles Escolares"));
    }

    #[test]
    fn electronics_furniture_and_apparel_are_excluded() {
        assert!(!category_in_scope("Electrohogar"));
        assert!(!category_in_scope("Tecnología"));
        assert!(!category_in_scope("Muebles"));
        assert!(!category_in_scope("Moda Mujer"));
    }

    #[test]
    fn deny_patterns_win_over_allow_patterns() {
        assert!(!category_in_scope("Alimentos para Mascotas"));
    }

    #[test]
    fn unmatched_names_are_excluded() {
        assert!(!category_in_scope("Viajes"));
    }

    #[test]
    fn parses_resources_header_total() {
        assert_eq!(parse_resources_total("0-49/1375"), Some(1_375));
        assert_eq!(parse_resources_total("0-0/0"), Some(0));
    }

    #[test]
    fn malformed_resources_header_yields_none() {
        assert_eq!(parse_resources_total("not-a-range"), None);
        assert_eq!(parse_resources_total("0-49/many"), None);
    }

    #[test]
    fn empty_category_is_skipped() {
        assert_eq!(plan_category(0, &node("Abarrotes", vec![])), CategoryPlan::Skip);
    }

    #[test]
    fn small_category_paginates_directly() {
        assert_eq!(
            plan_category(1_375, &node("Abarrotes", vec![])),
            CategoryPlan::Paginate { limit: 1_375 }
        );
    }

    #[test]
    fn oversized_category_with_children_recurses() {
        // A 5,000-item category with 2,400/2,600-item children must paginate
        // per child, never attempt a single 5,000-item walk.
        let parent = node(
            "Abarrotes",
            vec![node("Arroz y Menestras", vec![]), node("Aceites", vec![])],
        );
        assert_eq!(plan_category(5_000, &parent), CategoryPlan::Recurse);

        let child_a = node("Arroz y Menestras", vec![]);
        let child_b = node("Aceites", vec![]);
        assert_eq!(
            plan_category(2_400, &child_a),
            CategoryPlan::Paginate { limit: 2_400 }
        );
        assert_eq!(
            plan_category(2_600, &child_b),
            CategoryPlan::Paginate { limit: 2_500 },
            "an oversized leaf falls back to the first {PAGINATION_CEILING} items"
        );
    }

    #[test]
    fn oversized_category_without_children_truncates_at_ceiling() {
        assert_eq!(
            plan_category(9_999, &node("Abarrotes", vec![])),
            CategoryPlan::Paginate {
                limit: PAGINATION_CEILING
            }
        );
    }

    #[test]
    fn page_windows_cover_the_limit_in_fixed_steps() {
        assert_eq!(page_windows(50), vec![(0, 49)]);
        assert_eq!(page_windows(120), vec![(0, 49), (50, 99), (100, 119)]);
        assert!(page_windows(0).is_empty());
    }

    #[test]
    fn page_windows_at_the_ceiling() {
        let windows = page_windows(PAGINATION_CEILING);
        assert_eq!(windows.len(), 50);
        assert_eq!(windows.last(), Some(&(2_450, 2_499)));
    }
}
