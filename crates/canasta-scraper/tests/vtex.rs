//! Integration tests for the VTEX scraper using wiremock HTTP mocks.

use canasta_core::{Backend, ChainConfig};
use canasta_scraper::{ScrapePolicy, VtexScraper};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn policy() -> ScrapePolicy {
    ScrapePolicy {
        request_timeout_secs: 5,
        user_agent: "canasta-test/0".to_owned(),
        category_delay_ms: 0,
        term_delay_ms: 0,
        max_retries: 2,
        backoff_base_ms: 0,
    }
}

fn chain(base_url: &str) -> ChainConfig {
    ChainConfig {
        slug: "plaza_vea".to_owned(),
        label: "Plaza Vea".to_owned(),
        backend: Backend::Vtex,
        base_url: Some(base_url.to_owned()),
        graphql_url: None,
        website_id: None,
        menu_id: None,
    }
}

fn vtex_product(name: &str, ean: &str, price: f64, list_price: f64) -> serde_json::Value {
    serde_json::json!({
        "productName": name,
        "brand": "Gloria",
        "link": "/p/leche",
        "items": [{
            "ean": ean,
            "images": [{"imageUrl": "https://img.example/x.jpg"}],
            "sellers": [{
                "commertialOffer": {
                    "Price": price,
                    "ListPrice": list_price,
                    "AvailableQuantity": 10,
                    "IsAvailable": true
                }
            }]
        }]
    })
}

fn tree_body() -> serde_json::Value {
    serde_json::json!([
        { "id": 10, "name": "Abarrotes", "hasChildren": false, "children": [] },
        { "id": 20, "name": "Electrohogar", "hasChildren": false, "children": [] }
    ])
}

#[tokio::test]
async fn scrapes_in_scope_categories_and_skips_denied_ones() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/category/tree/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tree_body()))
        .mount(&server)
        .await;

    // Count probe for the grocery category: 2 products.
    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .and(query_param("fq", "C:10"))
        .and(query_param("_from", "0"))
        .and(query_param("_to", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("resources", "0-0/2")
                .set_body_json(serde_json::json!([])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .and(query_param("fq", "C:10"))
        .and(query_param("_from", "0"))
        .and(query_param("_to", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            vtex_product("Leche Gloria Entera 400g", "7751271001234", 4.5, 5.0),
            vtex_product("Arroz Costeño 5kg", "7750243001111", 21.9, 21.9),
        ])))
        .mount(&server)
        .await;

    // The denied category must never be probed.
    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .and(query_param("fq", "C:20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let scraper = VtexScraper::new(&policy(), &chain(&server.uri())).expect("scraper");
    let offers = scraper.scrape().await;

    assert_eq!(offers.len(), 2);
    let milk = offers
        .iter()
        .find(|o| o.external_id == "7751271001234")
        .expect("milk offer");
    assert!(milk.is_on_sale);
    assert_eq!(milk.sale_percentage, 10);
    assert!((milk.price - 4.5).abs() < f64::EPSILON);
    assert!(milk.is_available);

    let rice = offers
        .iter()
        .find(|o| o.external_id == "7750243001111")
        .expect("rice offer");
    assert!(!rice.is_on_sale);
    assert_eq!(rice.sale_percentage, 0);
}

#[tokio::test]
async fn discards_offers_without_price_or_barcode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/category/tree/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 10, "name": "Abarrotes", "hasChildren": false, "children": [] }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .and(query_param("_to", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("resources", "0-0/3")
                .set_body_json(serde_json::json!([])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .and(query_param("_to", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            vtex_product("Sin precio", "7750000000001", 0.0, 0.0),
            vtex_product("Sin barcode", "", 3.0, 3.0),
            vtex_product("Leche Gloria", "7751271001234", 4.5, 4.5),
        ])))
        .mount(&server)
        .await;

    let scraper = VtexScraper::new(&policy(), &chain(&server.uri())).expect("scraper");
    let offers = scraper.scrape().await;

    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].external_id, "7751271001234");
}

#[tokio::test]
async fn deduplicates_by_external_id_and_price_within_a_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/category/tree/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 10, "name": "Abarrotes", "hasChildren": false, "children": [] }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .and(query_param("_to", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("resources", "0-0/3")
                .set_body_json(serde_json::json!([])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .and(query_param("_to", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            vtex_product("Leche Gloria", "7751271001234", 4.5, 4.5),
            vtex_product("Leche Gloria", "7751271001234", 4.5, 4.5),
            // Same barcode at a different price is a distinct observation.
            vtex_product("Leche Gloria", "7751271001234", 4.2, 4.5),
        ])))
        .mount(&server)
        .await;

    let scraper = VtexScraper::new(&policy(), &chain(&server.uri())).expect("scraper");
    let offers = scraper.scrape().await;

    assert_eq!(offers.len(), 2);
}

#[tokio::test]
async fn oversized_category_descends_into_children() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/category/tree/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "id": 10,
            "name": "Abarrotes",
            "hasChildren": true,
            "children": [
                { "id": 11, "name": "Arroz y Menestras", "hasChildren": false, "children": [] },
                { "id": 12, "name": "Aceites", "hasChildren": false, "children": [] }
            ]
        }])))
        .mount(&server)
        .await;

    // Parent reports 5,000 products — over the ceiling, so it must never be
    // paginated directly.
    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .and(query_param("fq", "C:10"))
        .and(query_param("_to", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("resources", "0-0/5000")
                .set_body_json(serde_json::json!([])),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Each child reports 2 products (probe), then serves them on its one
    // real page (_from=0&_to=1).
    for (id, ean) in [(11, "7750000000011"), (12, "7750000000012")] {
        Mock::given(method("GET"))
            .and(path("/api/catalog_system/pub/products/search"))
            .and(query_param("fq", format!("C:{id}")))
            .and(query_param("_to", "0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("resources", "0-0/2")
                    .set_body_json(serde_json::json!([])),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/catalog_system/pub/products/search"))
            .and(query_param("fq", format!("C:{id}")))
            .and(query_param("_to", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                vtex_product("Producto", ean, 10.0, 10.0),
            ])))
            .mount(&server)
            .await;
    }

    let scraper = VtexScraper::new(&policy(), &chain(&server.uri())).expect("scraper");
    let offers = scraper.scrape().await;

    let mut ids: Vec<&str> = offers.iter().map(|o| o.external_id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["7750000000011", "7750000000012"]);
}

#[tokio::test]
async fn retries_transient_page_failures_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/category/tree/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 10, "name": "Abarrotes", "hasChildren": false, "children": [] }
        ])))
        .mount(&server)
        .await;

    // First two probe attempts fail with 503; the retry policy (2 retries)
    // must recover on the third.
    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .and(query_param("_to", "0"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .and(query_param("_to", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("resources", "0-0/2")
                .set_body_json(serde_json::json!([])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            vtex_product("Leche Gloria", "7751271001234", 4.5, 4.5),
        ])))
        .mount(&server)
        .await;

    let scraper = VtexScraper::new(&policy(), &chain(&server.uri())).expect("scraper");
    let offers = scraper.scrape().await;

    assert_eq!(offers.len(), 1);
}

#[tokio::test]
async fn unavailable_tree_falls_back_to_search_terms() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/category/tree/3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // One term yields a product; every other term search returns empty.
    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search/leche"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            vtex_product("Leche Gloria Entera 400g", "7751271001234", 4.5, 5.0),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let scraper = VtexScraper::new(&policy(), &chain(&server.uri())).expect("scraper");
    let offers = scraper.scrape().await;

    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].external_id, "7751271001234");
}
