//! Curated grocery search terms for the search-term strategy.
//!
//! Order is irrelevant; coverage is what matters. The tail of popular local
//! brands catches products that never surface under a generic term.

pub const SEARCH_TERMS: &[&str] = &[
    // Lácteos
    "leche",
    "leche evaporada",
    "yogurt",
    "queso",
    "mantequilla",
    "crema de leche",
    "manjar",
    "leche condensada",
    // Carnes y proteínas
    "pollo",
    "carne",
    "cerdo",
    "huevos",
    "jamon",
    "salchicha",
    "chorizo",
    "hamburguesa",
    "pescado",
    "atun",
    "sardina",
    "pavo",
    // Frutas y verduras
    "papa",
    "cebolla",
    "tomate",
    "limon",
    "platano",
    "manzana",
    "naranja",
    "zanahoria",
    "palta",
    "lechuga",
    "mandarina",
    "uva",
    "fresa",
    "camote",
    "choclo",
    // Granos, cereales y pastas
    "arroz",
    "fideos",
    "avena",
    "pan",
    "pan de molde",
    "harina",
    "lenteja",
    "frijol",
    "quinua",
    "cereal",
    "granola",
    "spaghetti",
    // Panadería y snacks
    "galletas",
    "chocolate",
    "caramelo",
    "wafer",
    "snack",
    "papas fritas",
    "piqueo",
    // Bebidas
    "agua",
    "gaseosa",
    "jugo",
    "cerveza",
    "vino",
    "cafe",
    "te",
    "infusion",
    "nectar",
    "energizante",
    "refresco",
    // Limpieza
    "detergente",
    "lejia",
    "jabon",
    "suavizante",
    "lavavajilla",
    "desinfectante",
    "papel higienico",
    "servilleta",
    "bolsa basura",
    "esponja",
    // Higiene personal
    "shampoo",
    "crema dental",
    "desodorante",
    "toalla higienica",
    "panal",
    "acondicionador",
    // Aceites y básicos
    "aceite",
    "azucar",
    "sal",
    "vinagre",
    "margarina",
    // Enlatados y salsas
    "conserva",
    "salsa de tomate",
    "ketchup",
    "mayonesa",
    "mostaza",
    "sopa instantanea",
    // Marcas populares
    "gloria",
    "laive",
    "bimbo",
    "alicorp",
    "molitalia",
    "nestle",
    "colgate",
    "bolivar",
    "sapolio",
    "coca cola",
    "inca kola",
    "san luis",
    "pilsen",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for term in SEARCH_TERMS {
            assert!(seen.insert(term), "duplicate search term: {term}");
        }
    }

    #[test]
    fn covers_the_required_domains() {
        // One representative per domain the term list must span.
        for needle in [
            "leche",
            "pollo",
            "papa",
            "arroz",
            "gaseosa",
            "detergente",
            "shampoo",
            "aceite",
        ] {
            assert!(
                SEARCH_TERMS.contains(&needle),
                "missing coverage for {needle}"
            );
        }
    }
}
