//! Navigable values and the sub-data accessor.
//!
//! A [`Node`] is a value the path interpreter can walk into by name. Root
//! types implement it by hand, listing the members a path may name:
//!
//! ```rust
//! use setin_core::node::{get, Node};
//!
//! struct Profile;
//! impl Node for Profile {}
//!
//! struct User {
//!     profile: Option<Box<Profile>>,
//! }
//!
//! impl Node for User {
//!     fn field(&mut self, name: &str) -> Option<&mut dyn Node> {
//!         match name {
//!             "Profile" => Some(&mut self.profile),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut user = User { profile: Some(Box::new(Profile)) };
//! assert!(get(&mut user, "Profile").is_ok());
//! assert!(get(&mut user, "Missing").is_err());
//! ```
//!
//! Wrappers (`Option`, `Box`, `Vec`, arrays) are nodes too. They report the
//! identity of the type they wrap, so a handler registered for `Comment`
//! also serves `Box<Comment>`, `Vec<Comment>` and `Vec<Box<Comment>>`.

use crate::error::{Error, Result};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

// ============================================================================
// TypeIdent
// ============================================================================

/// Static identity of a type, used as the handler registry key.
#[derive(Clone, Copy)]
pub struct TypeIdent {
    id: TypeId,
    name: &'static str,
}

impl TypeIdent {
    /// Identity of `T` itself.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Identity of the element type `T` is built around, looking through
    /// `Option`, `Box`, `Vec` and arrays.
    pub fn essential<T: Node>() -> Self {
        T::essential_type()
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Underlying [`TypeId`].
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for TypeIdent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeIdent {}

impl Hash for TypeIdent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeIdent({})", self.name)
    }
}

impl fmt::Display for TypeIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// Node
// ============================================================================

/// Result of looking through one level of indirection.
pub enum Indirection<'a> {
    /// Not an indirection.
    Direct,
    /// An indirection with nothing behind it.
    Absent,
    /// The value behind the indirection.
    Present(&'a mut dyn Node),
}

/// Conversions every [`Node`] gets for free.
pub trait AsNode {
    /// View as a type-erased node.
    fn as_node_mut(&mut self) -> &mut dyn Node;

    /// View as `Any`, for downcasting back to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Essential type identity of this value.
    fn type_ident(&self) -> TypeIdent;
}

impl<T: Node> AsNode for T {
    fn as_node_mut(&mut self) -> &mut dyn Node {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_ident(&self) -> TypeIdent {
        T::essential_type()
    }
}

/// A value the path interpreter can navigate.
///
/// Every method has a default, so a leaf type is just `impl Node for T {}`.
pub trait Node: AsNode + Any + Send {
    /// Identity used for handler lookup.
    fn essential_type() -> TypeIdent
    where
        Self: Sized,
    {
        TypeIdent::of::<Self>()
    }

    /// Named member field.
    ///
    /// Must be free of side effects: [`get`] may call it twice for the
    /// same name while resolving.
    fn field(&mut self, name: &str) -> Option<&mut dyn Node> {
        let _ = name;
        None
    }

    /// Named zero-argument accessor, consulted when no field matches.
    ///
    /// The same contract as [`Node::field`] applies: no side effects, and
    /// a matching name may be looked up twice.
    fn accessor(&mut self, name: &str) -> Option<&mut dyn Node> {
        let _ = name;
        None
    }

    /// One level of indirection (`Option`, `Box`) to look through.
    fn indirection(&mut self) -> Indirection<'_> {
        Indirection::Direct
    }

    /// Push the element values this node stands for.
    ///
    /// A record pushes itself; wrappers push what they contain.
    fn collect_elements<'a>(&'a mut self, out: &mut Vec<&'a mut dyn Node>) {
        out.push(self.as_node_mut());
    }
}

/// Resolve `name` on `value`.
///
/// Tries a field, then an accessor, then looks through one level of
/// indirection and tries again. An absent indirection is reported as
/// [`Error::NotFound`] and never dereferenced.
pub fn get<'a>(value: &'a mut dyn Node, name: &str) -> Result<&'a mut dyn Node> {
    let type_name = value.type_ident().name();
    let mut value = value;

    loop {
        // Test for a match before borrowing for 'a: a conditional return of
        // the first borrow would keep `value` borrowed for the rest of the loop.
        if value.field(name).is_some() {
            return value
                .field(name)
                .ok_or_else(|| Error::not_found(type_name, name));
        }
        if value.accessor(name).is_some() {
            return value
                .accessor(name)
                .ok_or_else(|| Error::not_found(type_name, name));
        }
        match value.indirection() {
            Indirection::Present(inner) => value = inner,
            Indirection::Direct | Indirection::Absent => {
                return Err(Error::not_found(type_name, name));
            }
        }
    }
}

impl fmt::Debug for dyn Node + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.type_ident().name()).finish()
    }
}

/// Flatten `value` into the element nodes it stands for.
pub fn elements(value: &mut dyn Node) -> Vec<&mut dyn Node> {
    let mut out = Vec::new();
    value.collect_elements(&mut out);
    out
}

// ============================================================================
// Wrapper impls
// ============================================================================

impl<T: Node> Node for Option<T> {
    fn essential_type() -> TypeIdent {
        T::essential_type()
    }

    fn indirection(&mut self) -> Indirection<'_> {
        match self {
            Some(inner) => Indirection::Present(inner),
            None => Indirection::Absent,
        }
    }

    fn collect_elements<'a>(&'a mut self, out: &mut Vec<&'a mut dyn Node>) {
        if let Some(inner) = self {
            inner.collect_elements(out);
        }
    }
}

impl<T: Node> Node for Box<T> {
    fn essential_type() -> TypeIdent {
        T::essential_type()
    }

    fn indirection(&mut self) -> Indirection<'_> {
        Indirection::Present(&mut **self)
    }

    fn collect_elements<'a>(&'a mut self, out: &mut Vec<&'a mut dyn Node>) {
        (**self).collect_elements(out);
    }
}

impl<T: Node> Node for Vec<T> {
    fn essential_type() -> TypeIdent {
        T::essential_type()
    }

    fn collect_elements<'a>(&'a mut self, out: &mut Vec<&'a mut dyn Node>) {
        for item in self.iter_mut() {
            item.collect_elements(out);
        }
    }
}

impl<T: Node, const N: usize> Node for [T; N] {
    fn essential_type() -> TypeIdent {
        T::essential_type()
    }

    fn collect_elements<'a>(&'a mut self, out: &mut Vec<&'a mut dyn Node>) {
        for item in self.iter_mut() {
            item.collect_elements(out);
        }
    }
}
