//! Deferred values and resource inputs.
//!
//! An [`Output`] is a value that becomes known later, typically once the
//! engine has created the resource that produces it. Outputs are cheap to
//! clone and every clone observes the same result; the underlying future runs
//! at most once.

use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;

use crate::{Error, ResourceId, Result};

/// A shared, lazily evaluated value.
pub struct Output<T> {
    inner: Shared<BoxFuture<'static, Result<T>>>,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Output(..)")
    }
}

impl<T> Output<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap a future producing the value.
    pub fn new<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            inner: fut.boxed().shared(),
        }
    }

    /// An output whose value is already known.
    pub fn ready(value: T) -> Self {
        Self::new(future::ready(Ok(value)))
    }

    /// An output that always resolves to `err`.
    pub fn failed(err: Error) -> Self {
        Self::new(future::ready(Err(err)))
    }

    /// Wait for the value.
    pub async fn resolve(&self) -> Result<T> {
        self.inner.clone().await
    }

    /// The result, if the value has already been computed.
    pub fn peek(&self) -> Option<Result<T>> {
        self.inner.peek().cloned()
    }

    /// Transform the value once it is known.
    pub fn apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let inner = self.inner.clone();
        Output::new(async move { inner.await.map(f) })
    }

    /// Transform the value with a fallible function.
    pub fn try_apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let inner = self.inner.clone();
        Output::new(async move { inner.await.and_then(f) })
    }

    /// Combine many outputs into one that resolves when all of them do.
    pub fn all(outputs: Vec<Output<T>>) -> Output<Vec<T>> {
        Output::new(async move {
            future::try_join_all(outputs.into_iter().map(|o| o.inner)).await
        })
    }
}

/// A value supplied to a resource: either known now or deferred.
#[derive(Debug)]
pub enum Input<T> {
    Value(T),
    Output(Output<T>),
}

impl<T: Clone> Clone for Input<T> {
    fn clone(&self) -> Self {
        match self {
            Input::Value(v) => Input::Value(v.clone()),
            Input::Output(o) => Input::Output(o.clone()),
        }
    }
}

impl<T> Input<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn value(value: T) -> Self {
        Input::Value(value)
    }

    /// Transform the input, eagerly when the value is known and through a
    /// deferred continuation otherwise.
    pub fn apply<U, F>(self, f: F) -> Input<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        match self {
            Input::Value(v) => Input::Value(f(v)),
            Input::Output(o) => Input::Output(o.apply(f)),
        }
    }

    pub fn into_output(self) -> Output<T> {
        match self {
            Input::Value(v) => Output::ready(v),
            Input::Output(o) => o,
        }
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Input::Value(v) => Some(v),
            Input::Output(_) => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Input::Output(_))
    }
}

impl<T> From<Output<T>> for Input<T> {
    fn from(output: Output<T>) -> Self {
        Input::Output(output)
    }
}

/// Implements `From<$from> for Input<$to>` for plain values.
#[macro_export]
macro_rules! impl_input_from {
    ($($from:ty => $to:ty),* $(,)?) => {
        $(
            impl From<$from> for $crate::Input<$to> {
                fn from(value: $from) -> Self {
                    $crate::Input::Value(<$to>::from(value))
                }
            }
        )*
    };
}

impl_input_from! {
    String => String,
    &str => String,
    i64 => i64,
    i32 => i64,
    u32 => i64,
    bool => bool,
    ResourceId => ResourceId,
}

impl<T> From<Vec<T>> for Input<Vec<T>> {
    fn from(values: Vec<T>) -> Self {
        Input::Value(values)
    }
}

impl From<Vec<&str>> for Input<Vec<String>> {
    fn from(values: Vec<&str>) -> Self {
        Input::Value(values.into_iter().map(str::to_string).collect())
    }
}
