//! Integration tests for nested expansion across the blog graph.
//!
//! Every path only expands its last segment; earlier segments navigate data
//! that an earlier path already loaded.

use crate::common::{Blog, Post, posts};
use setin::{Context, Error, HandlerRegistry, SetinAction};
use std::sync::Arc;

fn author_names(posts: &[Post]) -> Vec<Option<&str>> {
    posts
        .iter()
        .map(|post| post.author.as_ref().map(|user| user.name.as_str()))
        .collect()
}

#[tokio::test]
async fn test_top_level_relations_batch_per_relation() {
    let blog = Blog::new();
    let mut posts = posts();

    blog.post_setiner()
        .expand_values(&Context::new(), &mut posts, &["Author", "Comments", "Tags"])
        .await
        .unwrap();

    assert_eq!(
        blog.log.calls(),
        vec![
            ("users", vec![1, 2]),
            ("comments", vec![100, 101, 102]),
            ("tags", vec![7, 8]),
        ]
    );
    assert_eq!(author_names(&posts), vec![Some("ana"), Some("ben"), Some("ana")]);
    assert_eq!(posts[0].comments.len(), 2);
    assert_eq!(posts[1].comments.len(), 1);
    assert!(posts[2].comments.is_empty());

    let labels: Vec<&str> = posts[0].tags.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["rust", "async"]);
    assert!(posts[2].tags.is_empty());
}

#[tokio::test]
async fn test_nested_paths_cross_types_through_registry() {
    let blog = Blog::new();
    let ctx = blog.context();
    let mut posts = posts();

    blog.post_setiner()
        .expand_values(
            &ctx,
            &mut posts,
            &["Comments", "Comments-Author", "Comments-Author-Profile"],
        )
        .await
        .unwrap();

    // one fetch per level, covering every comment of every post
    assert_eq!(
        blog.log.calls(),
        vec![
            ("comments", vec![100, 101, 102]),
            ("users", vec![2, 3, 1]),
            ("profiles", vec![20, 30, 10]),
        ]
    );

    let first = &posts[0].comments[0];
    let author = first.author.as_ref().unwrap();
    assert_eq!(author.name, "ben");
    assert_eq!(author.profile.as_ref().unwrap().bio, "gopher");

    // cy's profile does not exist
    let second = posts[0].comments[1].author.as_ref().unwrap();
    assert!(second.profile.is_none());
}

#[tokio::test]
async fn test_group_shares_roots() {
    let blog = Blog::new();
    let ctx = blog.context();
    let mut posts = posts();

    blog.post_setiner()
        .expand_values(&ctx, &mut posts, &["(Author)(Comments)", "Author(-Profile)"])
        .await
        .unwrap();

    assert_eq!(blog.log.keys_for("profiles"), vec![vec![10, 20]]);
    let author = posts[1].author.as_ref().unwrap();
    assert_eq!(author.profile.as_ref().unwrap().id, 20);
    assert_eq!(posts[0].comments.len(), 2);
}

#[tokio::test]
async fn test_navigation_through_unloaded_relation_is_empty() {
    let blog = Blog::new();
    let ctx = blog.context();
    let mut posts = posts();

    // Author has not been loaded, so there is nothing to expand Profile on
    blog.post_setiner()
        .expand_values(&ctx, &mut posts, &["Author-Profile"])
        .await
        .unwrap();

    assert_eq!(blog.log.keys_for("profiles"), Vec::<Vec<u32>>::new());
    assert!(posts.iter().all(|post| post.author.is_none()));
}

#[tokio::test]
async fn test_unknown_nested_relation_names_owner() {
    let blog = Blog::new();
    let ctx = blog.context();
    let mut posts = posts();

    let err = blog
        .post_setiner()
        .expand_values(&ctx, &mut posts, &["Comments", "Comments-Likes"])
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Unknown relation: Likes (in comments)");
    assert_eq!(posts[0].comments.len(), 2);
}

#[tokio::test]
async fn test_nested_path_without_registry() {
    let blog = Blog::new();
    let mut posts = posts();

    let err = blog
        .post_setiner()
        .expand_values(&Context::new(), &mut posts, &["Comments", "Comments-Author"])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnregisteredType { .. }));
}

#[tokio::test]
async fn test_bound_registry_instead_of_context() {
    let blog = Blog::new();
    let registry = Arc::new(blog.registry());
    let mut posts = posts();

    blog.post_setiner()
        .with_registry(registry)
        .expand_values(&Context::new(), &mut posts, &["Author", "Author-Profile"])
        .await
        .unwrap();

    assert!(posts.iter().all(|post| {
        post.author
            .as_ref()
            .and_then(|user| user.profile.as_ref())
            .is_some()
    }));
}

#[tokio::test]
async fn test_registry_dispatch_from_the_top() {
    let blog = Blog::new();
    let registry: HandlerRegistry = blog.registry();
    let mut posts = posts();

    registry
        .dispatch_value(&Context::new(), &mut posts, &["-Author", "Author-Profile"])
        .await
        .unwrap();

    assert_eq!(author_names(&posts), vec![Some("ana"), Some("ben"), Some("ana")]);
    assert_eq!(blog.log.keys_for("profiles"), vec![vec![10, 20]]);
}

#[tokio::test]
async fn test_action_with_default_paths() {
    let blog = Blog::new();
    let setiner = blog.post_setiner();
    let ctx = blog.context();
    let mut posts = posts();

    let mut action: SetinAction<'_, '_, Post> = setiner
        .action()
        .with_values(&mut posts)
        .with_paths(["Author", "Comments", "Comments-Author"]);
    action.expand(&ctx).await.unwrap();

    assert_eq!(blog.log.count(), 3);
    assert!(posts[0].comments.iter().all(|c| c.author.is_some()));
}
