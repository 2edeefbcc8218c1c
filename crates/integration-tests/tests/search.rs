//! Substring search and per-identity rate limiting.

use axum::http::StatusCode;

use cartwheel_integration_tests::TestContext;

#[tokio::test]
async fn search_matches_title_or_description() {
    let ctx = TestContext::new().await;
    ctx.seed_product("Linen SHIRT", "summer wear", 2999, "clothing")
        .await;
    ctx.seed_product("Mug", "a shirt print mug", 999, "kitchen")
        .await;
    ctx.seed_product("Socks", "wool", 599, "clothing").await;

    let response = ctx.get("/products/search?q=shirt").await;
    assert_eq!(response.status, StatusCode::OK);

    let titles: Vec<_> = response
        .body
        .as_array()
        .expect("array")
        .iter()
        .map(|p| p["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, ["Linen SHIRT", "Mug"]);
}

#[tokio::test]
async fn search_results_use_the_detail_representation() {
    let ctx = TestContext::new().await;
    ctx.seed_product("Linen Shirt", "summer wear", 2999, "clothing")
        .await;

    let response = ctx.get("/products/search?q=linen").await;
    let product = &response.body[0];

    assert_eq!(product["rating"], 0.0);
    assert_eq!(product["likes"], 0);
    assert!(product.get("reviews").is_some());
}

#[tokio::test]
async fn missing_or_empty_query_is_rejected() {
    let ctx = TestContext::new().await;

    let missing = ctx.get("/products/search").await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert!(missing.body.get("q").is_some());

    let empty = ctx.get("/products/search?q=").await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_budget_exhaustion_yields_429() {
    let ctx = TestContext::with_search_rate_limit(2).await;
    let user = ctx.seed_user("Ada", "Lovelace", false).await;

    for _ in 0..2 {
        let ok = ctx
            .get_auth("/products/search?q=shirt", &user.token)
            .await;
        assert_eq!(ok.status, StatusCode::OK);
    }

    let throttled = ctx
        .get_auth("/products/search?q=shirt", &user.token)
        .await;
    assert_eq!(throttled.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn identities_have_independent_budgets() {
    let ctx = TestContext::with_search_rate_limit(1).await;
    let ada = ctx.seed_user("Ada", "Lovelace", false).await;
    let bob = ctx.seed_user("Bob", "Byron", false).await;

    let first = ctx.get_auth("/products/search?q=x", &ada.token).await;
    assert_eq!(first.status, StatusCode::OK);

    // Ada's budget is spent; Bob's is untouched.
    let ada_again = ctx.get_auth("/products/search?q=x", &ada.token).await;
    assert_eq!(ada_again.status, StatusCode::TOO_MANY_REQUESTS);

    let bob_first = ctx.get_auth("/products/search?q=x", &bob.token).await;
    assert_eq!(bob_first.status, StatusCode::OK);
}

#[tokio::test]
async fn anonymous_identities_are_keyed_by_client_ip() {
    let ctx = TestContext::with_search_rate_limit(1).await;

    let first = ctx
        .request(
            "GET",
            "/products/search?q=x",
            None,
            None,
            &[("x-real-ip", "203.0.113.7")],
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let same_ip = ctx
        .request(
            "GET",
            "/products/search?q=x",
            None,
            None,
            &[("x-real-ip", "203.0.113.7")],
        )
        .await;
    assert_eq!(same_ip.status, StatusCode::TOO_MANY_REQUESTS);

    let other_ip = ctx
        .request(
            "GET",
            "/products/search?q=x",
            None,
            None,
            &[("x-real-ip", "203.0.113.8")],
        )
        .await;
    assert_eq!(other_ip.status, StatusCode::OK);
}
