//! Common fixtures for the Setin test suites: a small blog (posts, users,
//! profiles, comments, tags) and an order book, backed by in-memory tables
//! that record every fetch.

#![allow(dead_code)]

use setin::{
    BoxError, Context, Fetcher, HandlerMapping, HandlerRegistry, Identified, ManyRelation, Node,
    Relation, ReversedRelation, Setiner, async_trait,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ============================================================================
// Blog model
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub id: u32,
    pub bio: String,
}

impl Node for Profile {}

impl Identified for Profile {
    type Id = u32;
    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub profile_id: u32,
    pub profile: Option<Box<Profile>>,
}

impl Node for User {
    fn field(&mut self, name: &str) -> Option<&mut dyn Node> {
        match name {
            "Profile" => Some(&mut self.profile),
            _ => None,
        }
    }
}

impl Identified for User {
    type Id = u32;
    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comment {
    pub id: u32,
    pub post_id: u32,
    pub author_id: u32,
    pub author: Option<User>,
}

impl Node for Comment {
    fn field(&mut self, name: &str) -> Option<&mut dyn Node> {
        match name {
            "Author" => Some(&mut self.author),
            _ => None,
        }
    }
}

impl Identified for Comment {
    type Id = u32;
    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub id: u32,
    pub label: String,
}

impl Node for Tag {}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Post {
    pub id: u32,
    pub author_id: u32,
    pub tag_ids: Vec<u32>,
    pub author: Option<User>,
    pub comments: Vec<Comment>,
    pub tags: Vec<Tag>,
}

impl Node for Post {
    fn field(&mut self, name: &str) -> Option<&mut dyn Node> {
        match name {
            "Author" => Some(&mut self.author),
            "Comments" => Some(&mut self.comments),
            "Tags" => Some(&mut self.tags),
            _ => None,
        }
    }
}

impl Identified for Post {
    type Id = u32;
    fn id(&self) -> u32 {
        self.id
    }
}

// ============================================================================
// Order book model
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: u32,
    pub name: String,
}

impl Identified for Customer {
    type Id = u32;
    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u32,
    pub customer_id: u32,
    pub customer: Option<Customer>,
}

impl Node for Order {}

pub fn orders(customer_ids: &[u32]) -> Vec<Order> {
    customer_ids
        .iter()
        .enumerate()
        .map(|(i, customer_id)| Order {
            id: i as u32 + 1,
            customer_id: *customer_id,
            customer: None,
        })
        .collect()
}

// ============================================================================
// Fetch recording
// ============================================================================

/// Shared log of `(table, keys)` for every fetch issued.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<(&'static str, Vec<u32>)>>>);

impl CallLog {
    pub fn record(&self, table: &'static str, keys: &[u32]) {
        self.0.lock().unwrap().push((table, keys.to_vec()));
    }

    pub fn calls(&self) -> Vec<(&'static str, Vec<u32>)> {
        self.0.lock().unwrap().clone()
    }

    /// Key lists of every fetch against `table`, in call order.
    pub fn keys_for(&self, table: &'static str) -> Vec<Vec<u32>> {
        self.calls()
            .into_iter()
            .filter(|(name, _)| *name == table)
            .map(|(_, keys)| keys)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// In-memory table returning every row that matches one of the keys.
pub struct Table<S> {
    name: &'static str,
    rows: Vec<S>,
    matches: fn(&S, u32) -> bool,
    log: CallLog,
}

impl<S> Table<S> {
    pub fn new(
        name: &'static str,
        rows: Vec<S>,
        matches: fn(&S, u32) -> bool,
        log: &CallLog,
    ) -> Self {
        Self {
            name,
            rows,
            matches,
            log: log.clone(),
        }
    }
}

#[async_trait]
impl<S: Clone + Send + Sync + 'static> Fetcher<u32, S> for Table<S> {
    async fn fetch(&self, _ctx: &Context, keys: Vec<u32>) -> Result<Vec<S>, BoxError> {
        self.log.record(self.name, &keys);
        Ok(self
            .rows
            .iter()
            .filter(|row| keys.iter().any(|key| (self.matches)(row, *key)))
            .cloned()
            .collect())
    }
}

/// Fetcher that always fails with `message`.
pub struct Unavailable {
    pub message: &'static str,
}

#[async_trait]
impl<S: Send + 'static> Fetcher<u32, S> for Unavailable {
    async fn fetch(&self, _ctx: &Context, _keys: Vec<u32>) -> Result<Vec<S>, BoxError> {
        Err(self.message.into())
    }
}

// ============================================================================
// Blog data and handlers
// ============================================================================

fn profile(id: u32, bio: &str) -> Profile {
    Profile {
        id,
        bio: bio.to_string(),
    }
}

fn user(id: u32, name: &str, profile_id: u32) -> User {
    User {
        id,
        name: name.to_string(),
        profile_id,
        profile: None,
    }
}

fn comment(id: u32, post_id: u32, author_id: u32) -> Comment {
    Comment {
        id,
        post_id,
        author_id,
        author: None,
    }
}

fn tag(id: u32, label: &str) -> Tag {
    Tag {
        id,
        label: label.to_string(),
    }
}

fn post(id: u32, author_id: u32, tag_ids: &[u32]) -> Post {
    Post {
        id,
        author_id,
        tag_ids: tag_ids.to_vec(),
        ..Post::default()
    }
}

pub fn profiles() -> Vec<Profile> {
    vec![profile(10, "rustacean"), profile(20, "gopher")]
}

/// User 3 points at a profile that does not exist.
pub fn users() -> Vec<User> {
    vec![user(1, "ana", 10), user(2, "ben", 20), user(3, "cy", 30)]
}

pub fn comments() -> Vec<Comment> {
    vec![
        comment(1000, 100, 2),
        comment(1001, 100, 3),
        comment(1002, 101, 1),
    ]
}

pub fn tags() -> Vec<Tag> {
    vec![tag(7, "rust"), tag(8, "async")]
}

/// Post 102 has no comments and no tags.
pub fn posts() -> Vec<Post> {
    vec![post(100, 1, &[7, 8]), post(101, 2, &[8]), post(102, 1, &[])]
}

/// The blog's handlers, all recording into one [`CallLog`].
#[derive(Debug, Default)]
pub struct Blog {
    pub log: CallLog,
}

impl Blog {
    pub fn new() -> Self {
        Self::default()
    }

    fn user_table(&self) -> Table<User> {
        Table::new("users", users(), |user, key| user.id == key, &self.log)
    }

    pub fn post_mapping(&self) -> HandlerMapping<Post> {
        HandlerMapping::new()
            .with_handler(
                "Author",
                Relation::by_id(
                    |post: &Post| [post.author_id],
                    self.user_table(),
                    |post: &mut Post, users: &HashMap<u32, User>| {
                        post.author = users.get(&post.author_id).cloned();
                    },
                ),
            )
            .with_handler(
                "Comments",
                ReversedRelation::by_id(
                    Table::new("comments", comments(), |c, key| c.post_id == key, &self.log),
                    |comment: &Comment| [comment.post_id],
                    |post: &mut Post, found: &HashMap<u32, Vec<Comment>>| {
                        post.comments = found.get(&post.id).cloned().unwrap_or_default();
                    },
                ),
            )
            .with_handler(
                "Tags",
                ManyRelation::new(
                    |post: &Post| post.tag_ids.clone(),
                    Table::new("tags", tags(), |tag, key| tag.id == key, &self.log),
                    |tag: &Tag| [tag.id],
                    |post: &mut Post, found: &HashMap<u32, Vec<Tag>>| {
                        post.tags = post
                            .tag_ids
                            .iter()
                            .filter_map(|id| found.get(id))
                            .flatten()
                            .cloned()
                            .collect();
                    },
                ),
            )
    }

    pub fn user_mapping(&self) -> HandlerMapping<User> {
        HandlerMapping::new().with_handler(
            "Profile",
            Relation::by_id(
                |user: &User| [user.profile_id],
                Table::new("profiles", profiles(), |p, key| p.id == key, &self.log),
                |user: &mut User, found: &HashMap<u32, Profile>| {
                    user.profile = found.get(&user.profile_id).cloned().map(Box::new);
                },
            ),
        )
    }

    pub fn comment_mapping(&self) -> HandlerMapping<Comment> {
        HandlerMapping::new().with_handler(
            "Author",
            Relation::by_id(
                |comment: &Comment| [comment.author_id],
                self.user_table(),
                |comment: &mut Comment, users: &HashMap<u32, User>| {
                    comment.author = users.get(&comment.author_id).cloned();
                },
            ),
        )
    }

    pub fn post_setiner(&self) -> Setiner<Post> {
        self.post_mapping().into_setiner().with_label("posts")
    }

    /// Registry covering every blog type.
    pub fn registry(&self) -> HandlerRegistry {
        HandlerRegistry::new()
            .with_handler::<Post, _>(self.post_setiner())
            .with_handler::<User, _>(self.user_mapping().into_setiner().with_label("users"))
            .with_handler::<Comment, _>(
                self.comment_mapping().into_setiner().with_label("comments"),
            )
    }

    /// A context carrying [`Blog::registry`].
    pub fn context(&self) -> Context {
        Context::new().with_value(self.registry())
    }
}
