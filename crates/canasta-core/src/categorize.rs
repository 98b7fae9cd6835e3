//! Name-based product classifier.
//!
//! Scraped catalogs carry no category we can trust, so freshly created
//! products are classified from their display name. Three phases:
//! skip rules drop items that only look like groceries (pet snacks, utensils),
//! type rules match on what the product *is*, and ingredient rules match
//! names that *start with* a primary ingredient. First match wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::ProductCategory;

struct TypeRule {
    category: ProductCategory,
    patterns: &'static [&'static str],
}

const SKIP_PATTERNS: &[&str] = &[
    r"(?i)alimento\s+(h[uú]medo\s+)?(para|p/)\s+(perro|gato|mascota)",
    r"(?i)\b(snack|galleta|hueso)\s+(para|p/)\s+(perro|gato)",
    r"(?i)extractor\s+de\s+leche",
    r"(?i)\bcuchillo\b.*\bcarne\b",
    r"(?i)\bcontenedor\s+de\s+cereal",
    r"(?i)\bcrema\s+de\s+mano",
];

const PRODUCT_TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        category: ProductCategory::Escolar,
        patterns: &[
            r"(?i)\bcuaderno",
            r"(?i)\bl[aá]piz\b",
            r"(?i)\blapicero",
            r"(?i)\bplum[oó]n",
            r"(?i)\bcrayola?",
            r"(?i)\bborrador\b",
            r"(?i)\btajador\b",
            r"(?i)\bcartulina",
            r"(?i)\bpegamento\b",
            r"(?i)\bgoma\s+(en\s+barra|l[ií]quida|escolar)",
            r"(?i)\btijera\s+(escolar|punta\s+roma)",
            r"(?i)\bmochila\b",
            r"(?i)\bfolder",
        ],
    },
    TypeRule {
        category: ProductCategory::Higiene,
        patterns: &[
            r"(?i)\bshampoo\b",
            r"(?i)\bchampu\b",
            r"(?i)\b(crema|pasta|cepillo)\s+dental",
            r"(?i)\bdesodorante\b",
            r"(?i)\btoalla\s+higi[eé]nica",
            r"(?i)\bpa[ñn]al(es)?\b",
            r"(?i)\bacondicionador\b",
            r"(?i)\bjab[oó]n\b",
            r"(?i)\bgel\s+(de\s+)?ba[ñn]o",
            r"(?i)\benjuague\s+bucal",
        ],
    },
    TypeRule {
        category: ProductCategory::Limpieza,
        patterns: &[
            r"(?i)\bdetergente\b",
            r"(?i)\blej[ií]a\b",
            r"(?i)\bdesinfectante\b",
            r"(?i)\bpapel\s+higi[eé]nico",
            r"(?i)\bservilleta",
            r"(?i)\bbolsa\s+(de\s+)?basura",
            r"(?i)\bsuavizante\b",
            r"(?i)\blavavajilla",
            r"(?i)\besponja\b",
            r"(?i)\blimpiador\b",
            r"(?i)\bquitamanchas\b",
        ],
    },
    TypeRule {
        category: ProductCategory::Bebidas,
        patterns: &[
            r"(?i)\bagua\s+(mineral|de\s+mesa|sin\s+gas|con\s+gas)",
            r"(?i)\bgaseosa\b",
            r"(?i)^jugo\b",
            r"(?i)\bn[eé]ctar\b",
            r"(?i)\bcerveza\b",
            r"(?i)\bvino\b",
            r"(?i)\bpisco\b",
            r"(?i)\benergizante\b",
            r"(?i)\brefresco\b",
            r"(?i)\binca\s*kola\b",
            r"(?i)\bcoca.cola\b",
            r"(?i)^caf[eé]\b",
            r"(?i)^t[eé]\b",
            r"(?i)\binfusi[oó]n",
        ],
    },
    TypeRule {
        category: ProductCategory::Enlatados,
        patterns: &[
            r"(?i)\bconserva\b",
            r"(?i)\ben\s+alm[ií]bar",
            r"(?i)\bsalsa\s+de\s+tomate",
            r"(?i)\bketchup\b",
            r"(?i)\bmayonesa\b",
            r"(?i)\bmostaza\b",
            r"(?i)\bsopa\s+instant[aá]nea",
            r"(?i)\bramen\b",
        ],
    },
    TypeRule {
        category: ProductCategory::Panaderia,
        patterns: &[
            r"(?i)^pan\s",
            r"(?i)^pan$",
            r"(?i)\bgalleta",
            r"(?i)\bbizcocho",
            r"(?i)\btostada",
            r"(?i)\bwafer\b",
            r"(?i)\bpanet[oó]n",
            r"(?i)\bchocolate\b",
            r"(?i)\bcaramelo",
            r"(?i)\bchicle\b",
            r"(?i)^snack\b",
            r"(?i)\bpapas\s+(fritas|lays|inka)",
            r"(?i)\bpiqueo",
        ],
    },
    TypeRule {
        category: ProductCategory::Aceites,
        patterns: &[
            r"(?i)^aceite\b",
            r"(?i)\bmanteca\b",
            r"(?i)\bmargarina\b",
            r"(?i)\bvinagre\b",
        ],
    },
    TypeRule {
        category: ProductCategory::GranosCereales,
        patterns: &[
            r"(?i)^arroz\b",
            r"(?i)\bfideo\b",
            r"(?i)^pasta\b",
            r"(?i)\bavena\b",
            r"(?i)^cereal\b",
            r"(?i)\bquinua\b",
            r"(?i)\blenteja",
            r"(?i)\bfrijol",
            r"(?i)^harina\b",
            r"(?i)\btallar[ií]n",
            r"(?i)\bspaghetti\b",
            r"(?i)\bgranola\b",
        ],
    },
];

const INGREDIENT_RULES: &[TypeRule] = &[
    TypeRule {
        category: ProductCategory::Lacteos,
        patterns: &[
            r"(?i)^leche\b",
            r"(?i)^yogurt?\b",
            r"(?i)^queso\b",
            r"(?i)^mantequilla\b",
            r"(?i)^crema\s+de\s+leche",
            r"(?i)^manjar\b",
            r"(?i)^leche\s+condensad",
        ],
    },
    TypeRule {
        category: ProductCategory::Carnes,
        patterns: &[
            r"(?i)^pollo\b",
            r"(?i)^carne\b",
            r"(?i)^cerdo\b",
            r"(?i)^pechuga",
            r"(?i)^chuleta\b",
            r"(?i)^pavo\b",
            r"(?i)^chorizo\b",
            r"(?i)^salchicha\b",
            r"(?i)^jam[oó]n\b",
            r"(?i)^hamburguesa\b",
            r"(?i)^pescado\b",
            r"(?i)^at[uú]n\b",
            r"(?i)^trucha\b",
            r"(?i)^langostino",
        ],
    },
    TypeRule {
        category: ProductCategory::FrutasVerduras,
        patterns: &[
            r"(?i)^manzana",
            r"(?i)^pl[aá]tano",
            r"(?i)^papaya",
            r"(?i)^naranja",
            r"(?i)^lim[oó]n\b",
            r"(?i)^tomate\b",
            r"(?i)^cebolla",
            r"(?i)^papa\b",
            r"(?i)^lechuga",
            r"(?i)^zanahoria",
            r"(?i)^palta",
            r"(?i)^mandarina",
            r"(?i)^uva\b",
            r"(?i)^fresa\b",
            r"(?i)^camote",
            r"(?i)^choclo",
        ],
    },
];

static COMPILED_SKIP: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SKIP_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("invalid skip pattern"))
        .collect()
});

static COMPILED_RULES: LazyLock<Vec<(ProductCategory, Vec<Regex>)>> = LazyLock::new(|| {
    PRODUCT_TYPE_RULES
        .iter()
        .chain(INGREDIENT_RULES.iter())
        .map(|rule| {
            let patterns = rule
                .patterns
                .iter()
                .map(|p| Regex::new(p).expect("invalid category pattern"))
                .collect();
            (rule.category, patterns)
        })
        .collect()
});

/// Classify a product by its display name. Returns `None` for names that
/// match no rule or hit a skip pattern.
#[must_use]
pub fn categorize_product(name: &str) -> Option<ProductCategory> {
    for pattern in COMPILED_SKIP.iter() {
        if pattern.is_match(name) {
            return None;
        }
    }

    for (category, patterns) in COMPILED_RULES.iter() {
        for pattern in patterns {
            if pattern.is_match(name) {
                return Some(*category);
            }
        }
    }

    None
}
