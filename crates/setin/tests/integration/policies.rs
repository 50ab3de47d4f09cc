//! Integration tests for error policies, configuration and re-expansion.

use crate::common::{Blog, Order, orders, posts};
use setin::{
    BoxError, Context, Error, ErrorHandling, ExpandConfig, HandlerMapping, Relation, fetch_fn,
};
use std::collections::HashMap;

#[tokio::test]
async fn test_fail_fast_keeps_earlier_merges() {
    let blog = Blog::new();
    let mut posts = posts();

    let err = blog
        .post_setiner()
        .expand_values(&Context::new(), &mut posts, &["Author", "Bogus", "Tags"])
        .await
        .unwrap_err();

    assert!(err.is_unknown_relation());
    assert!(posts.iter().all(|post| post.author.is_some()));
    assert!(posts.iter().all(|post| post.tags.is_empty()));
    assert!(blog.log.keys_for("tags").is_empty());
}

#[tokio::test]
async fn test_collect_reports_every_failure() {
    let blog = Blog::new();
    let config = ExpandConfig::from_toml_str("error_handling = \"collect\"").unwrap();
    let mut posts = posts();

    let err = blog
        .post_setiner()
        .with_config(config)
        .expand_values(
            &Context::new(),
            &mut posts,
            &["Bogus", "Author", "Comments", "Comments-Author", "(Tags"],
        )
        .await
        .unwrap_err();

    let Error::Aggregate { errors } = err else {
        unreachable!("Expected Aggregate error variant");
    };
    assert_eq!(errors.len(), 3);
    assert!(errors[0].is_unknown_relation());
    assert!(matches!(errors[1], Error::UnregisteredType { .. }));
    assert!(errors[2].is_parse());

    // the paths in between still ran
    assert!(posts.iter().all(|post| post.author.is_some()));
    assert_eq!(posts[0].comments.len(), 2);
}

#[tokio::test]
async fn test_collect_with_single_failure_returns_it_directly() {
    let blog = Blog::new();
    let mut posts = posts();

    let err = blog
        .post_setiner()
        .with_config(ExpandConfig::default().with_error_handling(ErrorHandling::Collect))
        .expand_values(&Context::new(), &mut posts, &["Author", "Bogus"])
        .await
        .unwrap_err();

    assert!(err.is_unknown_relation());
}

#[tokio::test]
async fn test_re_expansion_fetches_again_and_overwrites() {
    let blog = Blog::new();
    let setiner = blog.post_setiner();
    let ctx = Context::new();
    let mut posts = posts();

    setiner.expand_values(&ctx, &mut posts, &["Author"]).await.unwrap();
    let first = posts.clone();
    setiner.expand_values(&ctx, &mut posts, &["Author"]).await.unwrap();

    assert_eq!(posts, first);
    assert_eq!(blog.log.keys_for("users"), vec![vec![1, 2], vec![1, 2]]);
}

#[tokio::test]
async fn test_fetcher_observes_cancellation() {
    let setiner = HandlerMapping::new()
        .with_handler(
            "Customer",
            Relation::new(
                |order: &Order| [order.customer_id],
                fetch_fn(|ctx: Context, _keys: Vec<u32>| async move {
                    if ctx.is_cancelled() {
                        return Err::<Vec<(u32, String)>, BoxError>("request cancelled".into());
                    }
                    Ok(Vec::new())
                }),
                |row: &(u32, String)| row.0,
                |_order: &mut Order, _found: &HashMap<u32, (u32, String)>| {},
            ),
        )
        .into_setiner();
    let ctx = Context::new();
    let mut orders = orders(&[1]);

    setiner
        .expand_values(&ctx, &mut orders, &["Customer"])
        .await
        .unwrap();

    ctx.cancel();
    let err = setiner
        .expand_values(&ctx, &mut orders, &["Customer"])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "request cancelled");
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = ExpandConfig::default()
        .with_error_handling(ErrorHandling::Collect)
        .with_registry_fallback(false);

    let text = config.to_toml_string().unwrap();
    let parsed = ExpandConfig::from_toml_str(&text).unwrap();

    assert_eq!(parsed.error_handling, ErrorHandling::Collect);
    assert!(!parsed.registry_fallback);
}
