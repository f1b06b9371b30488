//! The per-field resolver contract (spec §4.6 step 2, §5).
//!
//! Unlike `juniper`'s `Executor<'r, 'a, CtxT, S>` (generic over a user
//! context type and a scalar-value representation, threaded through every
//! `GraphQLType` impl), this crate's resolvers are plain closures stored on
//! [`crate::schema::meta::Field`] with one fixed signature. There is no
//! `CtxT` type parameter to thread, so the user context is handed to
//! resolvers type-erased via [`std::any::Any`] and recovered with
//! [`FieldContext::context`].

use std::any::Any;

use crate::coercion::Variables;
use crate::error::FieldError;
use crate::executor::path::ResponsePath;
use crate::executor::promise::ResolvePromise;
use crate::future::Future;
use crate::schema::model::SchemaType;
use crate::value::Value;

/// A cancellable, request-scoped handle (spec §5 "Cancellation and
/// timeouts"). Cancelling sets a sticky error: once cancelled, every
/// subsequent check observes the same error, mirroring a `context.Context`'s
/// `Err()` accessor never resetting once set.
#[derive(Default)]
pub struct RequestContext {
    error: std::cell::RefCell<Option<FieldError>>,
}

impl RequestContext {
    pub fn new() -> Self {
        RequestContext::default()
    }

    pub fn cancel(&self, error: FieldError) {
        let mut slot = self.error.borrow_mut();
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.error.borrow().is_some()
    }

    pub(crate) fn error(&self) -> Option<FieldError> {
        self.error.borrow().clone()
    }
}

/// Everything a resolver needs: schema access, the parent value, coerced
/// arguments, the type-erased user context, the current response path, the
/// cancellation handle, and whether this invocation is the single root field
/// of a subscription (spec §4.6 "`Subscribe`" — "an `IsSubscribe` flag on the
/// field-context signals this mode").
pub struct FieldContext<'a> {
    pub(crate) schema: &'a SchemaType,
    pub(crate) parent_value: &'a Value,
    pub(crate) arguments: Variables,
    pub(crate) user_context: &'a dyn Any,
    pub(crate) path: ResponsePath,
    pub(crate) request_context: &'a RequestContext,
    pub(crate) is_subscribe: bool,
}

impl<'a> FieldContext<'a> {
    pub fn schema(&self) -> &'a SchemaType {
        self.schema
    }

    pub fn parent_value(&self) -> &'a Value {
        self.parent_value
    }

    pub fn arguments(&self) -> &Variables {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    /// Recovers the user context as `C`, if that is the concrete type the
    /// caller handed to [`crate::executor::execute_request`].
    pub fn context<C: 'static>(&self) -> Option<&'a C> {
        self.user_context.downcast_ref::<C>()
    }

    pub fn path(&self) -> &ResponsePath {
        &self.path
    }

    pub fn is_subscribe(&self) -> bool {
        self.is_subscribe
    }

    pub fn is_cancelled(&self) -> bool {
        self.request_context.is_cancelled()
    }
}

/// What a resolver hands back to the executor: an immediate value, an
/// immediate error, or a deferred [`ResolvePromise`] (spec §4.6 step 2 "If
/// the resolver returns a *promise channel*...").
pub enum FieldValue {
    Value(Value),
    Error(FieldError),
    Promise(ResolvePromise),
}

impl FieldValue {
    pub fn value(v: impl Into<Value>) -> Self {
        FieldValue::Value(v.into())
    }

    pub fn null() -> Self {
        FieldValue::Value(Value::Null)
    }

    pub fn error(message: impl Into<String>) -> Self {
        FieldValue::Error(FieldError::new(message))
    }

    pub fn promise(promise: ResolvePromise) -> Self {
        FieldValue::Promise(promise)
    }

    pub(crate) fn into_future<'f>(self) -> Future<'f, Value, FieldError> {
        match self {
            FieldValue::Value(v) => Future::ok(v),
            FieldValue::Error(e) => Future::err(e),
            FieldValue::Promise(p) => p.into_future(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::meta::{MetaType, ObjectMeta};
    use crate::schema::SchemaBuilder;

    fn schema() -> SchemaType {
        SchemaBuilder::new().add_type(MetaType::Object(ObjectMeta::new("Query"))).query_type("Query").build()
    }

    #[test]
    fn request_context_cancellation_is_sticky_to_the_first_error() {
        let ctx = RequestContext::new();
        assert!(!ctx.is_cancelled());
        ctx.cancel(FieldError::new("first"));
        ctx.cancel(FieldError::new("second"));
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.error().unwrap().message(), "first");
    }

    #[test]
    fn field_context_recovers_the_user_context_only_as_its_concrete_type() {
        let schema = schema();
        let parent = Value::Null;
        let request_ctx = RequestContext::new();
        let user_ctx: i32 = 42;
        let ctx = FieldContext {
            schema: &schema,
            parent_value: &parent,
            arguments: Variables::new(),
            user_context: &user_ctx,
            path: ResponsePath::root(),
            request_context: &request_ctx,
            is_subscribe: false,
        };
        assert_eq!(ctx.context::<i32>(), Some(&42));
        assert_eq!(ctx.context::<String>(), None);
        assert!(!ctx.is_subscribe());
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn field_context_argument_reads_from_the_coerced_arguments_map() {
        let schema = schema();
        let parent = Value::Null;
        let request_ctx = RequestContext::new();
        let mut arguments = Variables::new();
        arguments.insert("loud".into(), Value::scalar(true));
        let ctx = FieldContext {
            schema: &schema,
            parent_value: &parent,
            arguments,
            user_context: &(),
            path: ResponsePath::root(),
            request_context: &request_ctx,
            is_subscribe: false,
        };
        assert_eq!(ctx.argument("loud"), Some(&Value::scalar(true)));
        assert_eq!(ctx.argument("missing"), None);
    }

    #[test]
    fn field_value_constructors_produce_the_matching_future_outcome() {
        let mut value_future = FieldValue::value(1i64).into_future();
        assert!(value_future.poll());
        assert_eq!(value_future.take(), Ok(Value::scalar(1i64)));

        let mut null_future = FieldValue::null().into_future();
        assert!(null_future.poll());
        assert_eq!(null_future.take(), Ok(Value::Null));

        let mut error_future = FieldValue::error("boom").into_future();
        assert!(error_future.poll());
        assert_eq!(error_future.take().unwrap_err().message(), "boom");
    }
}
