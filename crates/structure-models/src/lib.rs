//! Entity types and whole-document validation for the catalog the virtual
//! structure service materializes: a tree of [`ThingNode`]s carrying
//! [`Source`]/[`Sink`] endpoint references, grouped under [`ElementType`]
//! labels.
//!
//! Validation here is purely structural and referential — it never touches
//! a database. [`CompleteStructure::validate`] is the single entry point and
//! reports the first invariant violation it finds (see [`ValidationError`]).

mod element_type;
mod error;
mod filter;
mod sink;
mod source;
mod structure;
mod thing_node;
mod wire_type;

pub use element_type::ElementType;
pub use error::{ParseError, ValidationError};
pub use filter::{Filter, FilterType};
pub use sink::Sink;
pub use source::Source;
pub use structure::CompleteStructure;
pub use thing_node::ThingNode;
pub use wire_type::WireType;

/// The author-controlled, globally-unique-per-document pair every entity
/// carries alongside its internal UUID. Upserts key on this pair.
pub trait ExternalIdentity {
    fn stakeholder_key(&self) -> &str;
    fn external_id(&self) -> &str;
}

macro_rules! impl_external_identity {
    ($ty:ty) => {
        impl ExternalIdentity for $ty {
            fn stakeholder_key(&self) -> &str {
                &self.stakeholder_key
            }
            fn external_id(&self) -> &str {
                &self.external_id
            }
        }
    };
}

impl_external_identity!(ElementType);
impl_external_identity!(ThingNode);
impl_external_identity!(Source);
impl_external_identity!(Sink);
