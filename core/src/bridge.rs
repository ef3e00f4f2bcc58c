//! Interface-aware JSON decoding.
//!
//! # Design
//! Callers consume catalog entities through capability traits
//! (`dyn MusicGroupView`, ...) while serde can only build concrete types. A
//! [`TypePair`] registration maps one abstract trait object type to the single
//! concrete type that is decoded in its place, and [`Entity<A>`] is the
//! handle through which the decoded value is seen as `A`.
//!
//! Substitution happens in `Entity`'s `Deserialize` impl, so it applies at
//! every position serde visits: top level, page items, entity lists nested in
//! other entities and optional entity fields alike.
//!
//! Registrations are trait impls produced by [`register_type_pair!`]. They
//! are fixed at compile time, one per abstract type, and keyed by the exact
//! trait object type (`dyn Trait`, not `dyn Trait + Send`).

use std::any::type_name;
use std::fmt;
use std::ops::Deref;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A registered (concrete, abstract) pair, implemented on the abstract
/// trait object type.
pub trait TypePair {
    /// The only type the decoder instantiates when `Self` is requested.
    type Concrete: Serialize
        + DeserializeOwned
        + Clone
        + PartialEq
        + fmt::Debug
        + Send
        + Sync
        + 'static;

    /// Name of the abstract capability set, for diagnostics.
    const ABSTRACT_NAME: &'static str;

    /// Views a concrete value through the abstract capability set.
    fn view(concrete: &Self::Concrete) -> &Self;
}

/// Registers `Concrete` as the decoding target for `dyn Abstract`.
///
/// ```ignore
/// register_type_pair!(MusicGroup => dyn MusicGroupView);
/// ```
///
/// `Concrete` must implement `Abstract`; the impl fails to compile otherwise.
#[macro_export]
macro_rules! register_type_pair {
    ($concrete:ty => dyn $abstract:ident) => {
        impl $crate::bridge::TypePair for dyn $abstract {
            type Concrete = $concrete;

            const ABSTRACT_NAME: &'static str = stringify!($abstract);

            fn view(concrete: &$concrete) -> &Self {
                concrete
            }
        }
    };
}

/// An owned value exposed only through the capability set `A`.
///
/// Dereferences to `A`. Constructed either by decoding JSON (which builds
/// `A::Concrete`) or from a concrete value with [`Entity::new`].
pub struct Entity<A: ?Sized + TypePair> {
    inner: Box<A::Concrete>,
}

impl<A: ?Sized + TypePair> Entity<A> {
    pub fn new(concrete: A::Concrete) -> Self {
        Self {
            inner: Box::new(concrete),
        }
    }
}

impl<A: ?Sized + TypePair> Deref for Entity<A> {
    type Target = A;

    fn deref(&self) -> &A {
        A::view(&self.inner)
    }
}

impl<A: ?Sized + TypePair> Clone for Entity<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: ?Sized + TypePair> PartialEq for Entity<A> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<A: ?Sized + TypePair> fmt::Debug for Entity<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl<A: ?Sized + TypePair> Serialize for Entity<A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.serialize(serializer)
    }
}

impl<'de, A: ?Sized + TypePair> Deserialize<'de> for Entity<A> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        tracing::trace!(
            abstract_type = A::ABSTRACT_NAME,
            concrete_type = type_name::<A::Concrete>(),
            "decoding registered concrete type"
        );
        A::Concrete::deserialize(deserializer).map(Entity::new)
    }
}

/// Errors raised while moving values across the JSON boundary.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The JSON did not match the shape of the requested type. `path` is the
    /// position of the offending value, e.g. `pageItems[0].genre`, or `.` for
    /// the document root.
    #[error("malformed response for {target} at {path}: {source}")]
    Malformed {
        target: &'static str,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {target}: {source}")]
    Serialize {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl BridgeError {
    /// Line and column of a decode failure, when the decoder reported one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            BridgeError::Malformed { source, .. } if source.line() > 0 => {
                Some((source.line(), source.column()))
            }
            _ => None,
        }
    }

    /// Path of the value that failed to decode.
    pub fn path(&self) -> Option<&str> {
        match self {
            BridgeError::Malformed { path, .. } => Some(path),
            BridgeError::Serialize { .. } => None,
        }
    }

    fn malformed<T>(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        BridgeError::Malformed {
            target: type_name::<T>(),
            path: err.path().to_string(),
            source: err.into_inner(),
        }
    }
}

/// Decodes `json` as `T`, substituting registered concrete types for every
/// `Entity<dyn Trait>` position.
pub fn from_str<T: DeserializeOwned>(json: &str) -> Result<T, BridgeError> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    let value = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(BridgeError::malformed::<T>)?;
    deserializer
        .end()
        .map_err(|source| BridgeError::Malformed {
            target: type_name::<T>(),
            path: ".".to_string(),
            source,
        })?;
    Ok(value)
}

/// Decodes an already parsed JSON value.
pub fn from_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, BridgeError> {
    serde_path_to_error::deserialize(value).map_err(BridgeError::malformed::<T>)
}

/// Structural serialization of a concrete value or an [`Entity`].
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, BridgeError> {
    serde_json::to_string(value).map_err(|source| BridgeError::Serialize {
        target: type_name::<T>(),
        source,
    })
}
