//! Like/Favorite/Cart toggle semantics and the saved-product listings.

use axum::http::StatusCode;

use cartwheel_integration_tests::TestContext;

#[tokio::test]
async fn like_toggles_between_liked_and_disliked() {
    let ctx = TestContext::new().await;
    let user = ctx.seed_user("Ada", "Lovelace", false).await;
    let product = ctx.seed_product("Shirt", "", 1999, "clothing").await;
    let path = format!("/products/{product}/like");

    let on = ctx.post(&path, Some(&user.token), None).await;
    assert_eq!(on.status, StatusCode::OK);
    assert_eq!(on.body["state"], "on");
    assert_eq!(on.body["detail"], "liked");

    let off = ctx.post(&path, Some(&user.token), None).await;
    assert_eq!(off.body["state"], "off");
    assert_eq!(off.body["detail"], "disliked");
}

#[tokio::test]
async fn unliked_row_survives_with_flag_cleared() {
    let ctx = TestContext::new().await;
    let user = ctx.seed_user("Ada", "Lovelace", false).await;
    let product = ctx.seed_product("Shirt", "", 1999, "clothing").await;
    let path = format!("/products/{product}/like");

    ctx.post(&path, Some(&user.token), None).await;
    ctx.post(&path, Some(&user.token), None).await;

    // The wishlist row is a durable signal: still present, flag off.
    assert_eq!(ctx.row_count("wishlist").await, 1);
    let is_liked: bool = sqlx::query_scalar("SELECT is_liked FROM wishlist")
        .fetch_one(&ctx.pool)
        .await
        .expect("flag");
    assert!(!is_liked);
}

#[tokio::test]
async fn favorite_row_vanishes_on_double_toggle() {
    let ctx = TestContext::new().await;
    let user = ctx.seed_user("Ada", "Lovelace", false).await;
    let product = ctx.seed_product("Shirt", "", 1999, "clothing").await;
    let path = format!("/products/{product}/favorite");

    let on = ctx.post(&path, Some(&user.token), None).await;
    assert_eq!(on.body["detail"], "added to favorites");
    assert_eq!(ctx.row_count("favorite").await, 1);

    let off = ctx.post(&path, Some(&user.token), None).await;
    assert_eq!(off.body["detail"], "removed from favorites");
    assert_eq!(ctx.row_count("favorite").await, 0);
}

#[tokio::test]
async fn cart_row_vanishes_on_double_toggle() {
    let ctx = TestContext::new().await;
    let user = ctx.seed_user("Ada", "Lovelace", false).await;
    let product = ctx.seed_product("Shirt", "", 1999, "clothing").await;
    let path = format!("/products/{product}/cart");

    let on = ctx.post(&path, Some(&user.token), None).await;
    assert_eq!(on.body["detail"], "added to cart");
    assert_eq!(ctx.row_count("cart_item").await, 1);

    let off = ctx.post(&path, Some(&user.token), None).await;
    assert_eq!(off.body["detail"], "removed from cart");
    assert_eq!(ctx.row_count("cart_item").await, 0);
}

#[tokio::test]
async fn likes_aggregate_counts_only_active_likes() {
    let ctx = TestContext::new().await;
    let ada = ctx.seed_user("Ada", "Lovelace", false).await;
    let bob = ctx.seed_user("Bob", "Byron", false).await;
    let product = ctx.seed_product("Shirt", "", 1999, "clothing").await;
    let path = format!("/products/{product}/like");

    ctx.post(&path, Some(&ada.token), None).await;
    ctx.post(&path, Some(&bob.token), None).await;

    let detail = ctx.get(&format!("/products/{product}")).await;
    assert_eq!(detail.body["likes"], 2);

    // Bob un-likes: his row stays but no longer counts.
    ctx.post(&path, Some(&bob.token), None).await;
    let detail = ctx.get(&format!("/products/{product}")).await;
    assert_eq!(detail.body["likes"], 1);
}

#[tokio::test]
async fn toggles_require_authentication() {
    let ctx = TestContext::new().await;
    let product = ctx.seed_product("Shirt", "", 1999, "clothing").await;

    for action in ["like", "favorite", "cart"] {
        let response = ctx
            .post(&format!("/products/{product}/{action}"), None, None)
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{action}");
    }
}

#[tokio::test]
async fn toggling_an_unknown_product_is_404() {
    let ctx = TestContext::new().await;
    let user = ctx.seed_user("Ada", "Lovelace", false).await;

    let response = ctx.post("/products/999/like", Some(&user.token), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favorites_listing_is_isolated_per_user() {
    let ctx = TestContext::new().await;
    let ada = ctx.seed_user("Ada", "Lovelace", false).await;
    let bob = ctx.seed_user("Bob", "Byron", false).await;
    let shirt = ctx.seed_product("Shirt", "", 1999, "clothing").await;
    let mug = ctx.seed_product("Mug", "", 999, "kitchen").await;

    ctx.post(&format!("/products/{shirt}/favorite"), Some(&ada.token), None)
        .await;
    ctx.post(&format!("/products/{mug}/favorite"), Some(&bob.token), None)
        .await;

    let response = ctx.get_auth("/favorites", &ada.token).await;
    assert_eq!(response.status, StatusCode::OK);

    let favorites = response.body.as_array().expect("array");
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0]["product"]["title"], "Shirt");
    assert_eq!(favorites[0]["product"]["price"], "19.99");
}

#[tokio::test]
async fn cart_listing_returns_only_the_callers_items() {
    let ctx = TestContext::new().await;
    let ada = ctx.seed_user("Ada", "Lovelace", false).await;
    let bob = ctx.seed_user("Bob", "Byron", false).await;
    let shirt = ctx.seed_product("Shirt", "", 1999, "clothing").await;
    let mug = ctx.seed_product("Mug", "", 999, "kitchen").await;

    ctx.post(&format!("/products/{shirt}/cart"), Some(&ada.token), None)
        .await;
    ctx.post(&format!("/products/{mug}/cart"), Some(&bob.token), None)
        .await;

    let response = ctx.get_auth("/cart", &bob.token).await;
    let items = response.body.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product"]["title"], "Mug");
}

#[tokio::test]
async fn saved_listings_require_authentication() {
    let ctx = TestContext::new().await;

    assert_eq!(ctx.get("/favorites").await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.get("/cart").await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn relations_between_users_and_products_are_independent() {
    let ctx = TestContext::new().await;
    let user = ctx.seed_user("Ada", "Lovelace", false).await;
    let shirt = ctx.seed_product("Shirt", "", 1999, "clothing").await;
    let mug = ctx.seed_product("Mug", "", 999, "kitchen").await;

    // Liking one product and carting another never cross-contaminates.
    ctx.post(&format!("/products/{shirt}/like"), Some(&user.token), None)
        .await;
    ctx.post(&format!("/products/{mug}/cart"), Some(&user.token), None)
        .await;

    assert_eq!(ctx.row_count("wishlist").await, 1);
    assert_eq!(ctx.row_count("cart_item").await, 1);
    assert_eq!(ctx.row_count("favorite").await, 0);

    let cart = ctx.get_auth("/cart", &user.token).await;
    let items = cart.body.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product"]["title"], "Mug");
}
