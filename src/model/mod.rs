//! # Property Graph Model
//!
//! Plain DTOs shared by the store, the script engine and the comparison core.
//!
//! Design rule: this module is pure data with no I/O and no async.

pub mod node;
pub mod relationship;
pub mod value;
pub mod property_map;

pub use node::{Node, NodeId};
pub use relationship::{Relationship, RelId, Direction};
pub use value::{Value, PrimitiveArray};
pub use property_map::{PropertyMap, property_map, sorted_keys};
