//! Integration tests for the Justo (GraphQL) and Tottus (embedded-JSON)
//! backends using wiremock HTTP mocks.

use canasta_core::{Backend, ChainConfig};
use canasta_scraper::{JustoScraper, ScrapePolicy, TottusScraper};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn policy() -> ScrapePolicy {
    ScrapePolicy {
        request_timeout_secs: 5,
        user_agent: "canasta-test/0".to_owned(),
        category_delay_ms: 0,
        term_delay_ms: 0,
        max_retries: 1,
        backoff_base_ms: 0,
    }
}

fn justo_chain(graphql_url: &str) -> ChainConfig {
    ChainConfig {
        slug: "tambo".to_owned(),
        label: "Tambo".to_owned(),
        backend: Backend::Justo,
        base_url: None,
        graphql_url: Some(graphql_url.to_owned()),
        website_id: Some("site-1".to_owned()),
        menu_id: Some("menu-1".to_owned()),
    }
}

fn tottus_chain(base_url: &str) -> ChainConfig {
    ChainConfig {
        slug: "tottus".to_owned(),
        label: "Tottus".to_owned(),
        backend: Backend::Tottus,
        base_url: Some(base_url.to_owned()),
        graphql_url: None,
        website_id: None,
        menu_id: None,
    }
}

fn justo_body(items: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "data": { "products": { "totalCount": 1, "items": items } } })
}

#[tokio::test]
async fn justo_parses_offers_and_dedups_across_terms() {
    let server = MockServer::start().await;

    // The same product comes back for every term; it must appear once.
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(serde_json::json!({
            "variables": { "websiteId": "site-1", "menuId": "menu-1" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(justo_body(serde_json::json!([{
                "_id": "justo-1",
                "name": "Agua San Luis 625ml",
                "image": { "url": "https://img.justo/agua.jpg" },
                "availability": [{ "basePrice": 2.0, "finalPrice": 1.5 }]
            }]))),
        )
        .mount(&server)
        .await;

    let scraper =
        JustoScraper::new(&policy(), &justo_chain(&format!("{}/graphql", server.uri())))
            .expect("scraper");
    let offers = scraper.scrape().await;

    assert_eq!(offers.len(), 1, "same _id must be deduplicated across terms");
    let offer = &offers[0];
    assert_eq!(offer.external_id, "justo-1");
    assert_eq!(offer.brand, "Tambo");
    assert!(offer.is_on_sale);
    assert_eq!(offer.sale_percentage, 25);
}

#[tokio::test]
async fn justo_discards_products_without_a_positive_price() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(justo_body(serde_json::json!([{
                "_id": "justo-free",
                "name": "Producto sin precio",
                "availability": [{ "basePrice": 0.0, "finalPrice": 0.0 }]
            }]))),
        )
        .mount(&server)
        .await;

    let scraper =
        JustoScraper::new(&policy(), &justo_chain(&format!("{}/graphql", server.uri())))
            .expect("scraper");
    let offers = scraper.scrape().await;

    assert!(offers.is_empty());
}

#[tokio::test]
async fn justo_survives_failing_terms() {
    let server = MockServer::start().await;

    // Every request 404s; the scraper must come back empty, not error.
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let scraper =
        JustoScraper::new(&policy(), &justo_chain(&format!("{}/graphql", server.uri())))
            .expect("scraper");
    let offers = scraper.scrape().await;

    assert!(offers.is_empty());
}

fn tottus_page(results_json: &str) -> String {
    format!(
        "<html><body><script id=\"__NEXT_DATA__\" type=\"application/json\">\
         {{\"props\":{{\"pageProps\":{{\"results\":{results_json}}}}}}}\
         </script></body></html>"
    )
}

#[tokio::test]
async fn tottus_parses_embedded_json_and_dedups_by_sku() {
    let server = MockServer::start().await;

    let page = tottus_page(
        r#"[{
            "productId": "PROD-1",
            "skuId": "SKU-1",
            "displayName": "Leche Gloria Entera 400g",
            "brand": "Gloria",
            "url": "/tottus-pe/p/leche-gloria",
            "mediaUrls": ["https://img.tottus.pe/leche.jpg"],
            "prices": [
                {"type": "internetPrice", "crossed": false, "price": ["S/ 4.00"], "symbol": "S/"},
                {"type": "normalPrice", "crossed": true, "price": ["S/ 5.00"], "symbol": "S/"}
            ]
        }]"#,
    );

    Mock::given(method("GET"))
        .and(path("/tottus-pe/buscar"))
        .and(query_param("Ntt", "leche"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page.clone()))
        .mount(&server)
        .await;

    // Another term returns the same SKU — must not duplicate.
    Mock::given(method("GET"))
        .and(path("/tottus-pe/buscar"))
        .and(query_param("Ntt", "gloria"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tottus-pe/buscar"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let scraper = TottusScraper::new(&policy(), &tottus_chain(&server.uri())).expect("scraper");
    let offers = scraper.scrape().await;

    assert_eq!(offers.len(), 1);
    let offer = &offers[0];
    assert_eq!(offer.external_id, "SKU-1");
    assert!((offer.price - 4.0).abs() < f64::EPSILON);
    assert!(offer.is_on_sale);
    assert_eq!(offer.sale_percentage, 20);
    assert_eq!(
        offer.product_url,
        format!("{}/tottus-pe/p/leche-gloria", server.uri())
    );
}

#[tokio::test]
async fn tottus_pages_without_embedded_data_yield_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tottus-pe/buscar"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no data</html>"))
        .mount(&server)
        .await;

    let scraper = TottusScraper::new(&policy(), &tottus_chain(&server.uri())).expect("scraper");
    let offers = scraper.scrape().await;

    assert!(offers.is_empty());
}
