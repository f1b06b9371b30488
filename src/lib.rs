//! A GraphQL document validator and request executor, built around a
//! hand-rolled cooperative [`future`] runtime instead of `std::future::Future`.
//!
//! This crate does not parse GraphQL source text or build a schema's
//! introspection type objects -- both are treated as work done by a
//! collaborator before a [`ast::Document`] and [`schema::model::SchemaType`]
//! ever reach [`validation::validate`] or [`executor::execute_request`]. What
//! it does own, end to end: validating a document against a schema
//! ([`validation`]), coercing literals/variables/arguments to typed values
//! ([`coercion`]), and executing a validated document to a response
//! ([`executor`]), all without assuming an OS thread, an async runtime, or
//! even an allocator beyond `alloc`.
//!
//! Grounded in `juniper`'s module split (`ast`, `executor`, `parser`,
//! `schema`, `validation`, `value`), generalized from a macro-driven,
//! `GraphQLType<S>`-generic design to one where every resolver has a single
//! monomorphic signature and the user context is recovered via
//! [`std::any::Any`] instead of a type parameter threaded through every trait
//! impl -- see [`executor::context`]'s module doc comment for why.

pub mod ast;
pub mod coercion;
pub mod error;
pub mod executor;
pub mod future;
pub mod parser;
pub mod schema;
pub mod typeinfo;
pub mod validation;
pub mod value;

pub use error::{ExecutionError, FieldError, GraphQLError, Location, RuleError};
pub use executor::{execute_request, subscribe, FieldContext, FieldValue, Request, RequestContext, Subscription};
pub use future::Future;
pub use schema::SchemaBuilder;
pub use validation::validate;
pub use value::{Object, ScalarValue, Value};
