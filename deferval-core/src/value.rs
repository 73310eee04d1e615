use std::fmt::{self, Debug};
use std::sync::Arc;

/// A value produced on demand.
///
/// Implementations differ only in *when* they compute: [`Held`] never does,
/// [`Computed`] does on every call, [`Eager`] once at construction, the
/// formatted values once on first access, and
/// [`TtlCache`](crate::TtlCache) once per time-to-live window.
///
/// Equality, hashing and `Display` of the value types in this crate follow
/// the output they currently produce: two values of the same type compare
/// equal iff their `get()` results compare equal.
///
/// # Examples
///
/// ```
/// use deferval_core::{Computed, Held, Value};
///
/// fn describe<V: Value<Output = u32>>(value: &V) -> String {
///     format!("value = {}", value.get())
/// }
///
/// assert_eq!(describe(&Held::new(7)), "value = 7");
/// assert_eq!(describe(&Computed::new(|| 3 + 4)), "value = 7");
/// ```
pub trait Value {
    type Output;

    fn get(&self) -> Self::Output;
}

impl<V: Value + ?Sized> Value for &V {
    type Output = V::Output;

    #[inline]
    fn get(&self) -> Self::Output {
        (**self).get()
    }
}

impl<V: Value + ?Sized> Value for Box<V> {
    type Output = V::Output;

    #[inline]
    fn get(&self) -> Self::Output {
        (**self).get()
    }
}

impl<V: Value + ?Sized> Value for Arc<V> {
    type Output = V::Output;

    #[inline]
    fn get(&self) -> Self::Output {
        (**self).get()
    }
}

/// Implements `PartialEq`, `Eq`, `Hash` and `Display` for a value type in
/// terms of its current output.
macro_rules! impl_output_traits {
    ($name:ident < $($gen:ident),* >) => {
        impl<$($gen),*> PartialEq for $name<$($gen),*>
        where
            Self: $crate::Value,
            <Self as $crate::Value>::Output: PartialEq,
        {
            fn eq(&self, other: &Self) -> bool {
                $crate::Value::get(self) == $crate::Value::get(other)
            }
        }

        impl<$($gen),*> Eq for $name<$($gen),*>
        where
            Self: $crate::Value,
            <Self as $crate::Value>::Output: Eq,
        {
        }

        impl<$($gen),*> ::std::hash::Hash for $name<$($gen),*>
        where
            Self: $crate::Value,
            <Self as $crate::Value>::Output: ::std::hash::Hash,
        {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                ::std::hash::Hash::hash(&$crate::Value::get(self), state)
            }
        }

        impl<$($gen),*> ::std::fmt::Display for $name<$($gen),*>
        where
            Self: $crate::Value,
            <Self as $crate::Value>::Output: ::std::fmt::Display,
        {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&$crate::Value::get(self), f)
            }
        }
    };
}

pub(crate) use impl_output_traits;

/// A fixed value set at construction.
///
/// # Examples
///
/// ```
/// use deferval_core::{Held, Value};
///
/// let held = Held::new("config.yml");
/// for _ in 0..3 {
///     assert_eq!(held.get(), "config.yml");
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Held<T> {
    value: T,
}

impl<T> Held<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Borrows the held value without cloning it.
    pub fn get_ref(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> From<T> for Held<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Clone> Value for Held<T> {
    type Output = T;

    #[inline]
    fn get(&self) -> T {
        self.value.clone()
    }
}

impl_output_traits!(Held<T>);

/// Runs its producer on every call. Nothing is memoized.
///
/// # Examples
///
/// ```
/// use deferval_core::{Computed, Value};
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// let calls = AtomicU32::new(0);
/// let computed = Computed::new(|| calls.fetch_add(1, Ordering::SeqCst));
///
/// assert_eq!(computed.get(), 0);
/// assert_eq!(computed.get(), 1);
/// ```
#[derive(Clone)]
pub struct Computed<F> {
    producer: F,
}

impl<F, T> Computed<F>
where
    F: Fn() -> T,
{
    pub fn new(producer: F) -> Self {
        Self { producer }
    }
}

impl<F, T> Value for Computed<F>
where
    F: Fn() -> T,
{
    type Output = T;

    #[inline]
    fn get(&self) -> T {
        (self.producer)()
    }
}

impl<F> Debug for Computed<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed").finish_non_exhaustive()
    }
}

impl_output_traits!(Computed<F>);

/// Runs its producer exactly once, synchronously, inside the constructor.
///
/// # Examples
///
/// ```
/// use deferval_core::{Eager, Value};
///
/// let eager = Eager::new(|| vec![1, 2, 3].into_iter().sum::<i32>());
/// assert_eq!(eager.get(), 6);
///
/// let failed = Eager::try_new(|| "x".parse::<i32>());
/// assert!(failed.is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Eager<T> {
    value: T,
}

impl<T> Eager<T> {
    pub fn new<F>(producer: F) -> Self
    where
        F: FnOnce() -> T,
    {
        Self { value: producer() }
    }

    /// Runs a fallible producer; the producer's error is returned as-is.
    pub fn try_new<F, E>(producer: F) -> Result<Self, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        producer().map(|value| Self { value })
    }

    pub fn get_ref(&self) -> &T {
        &self.value
    }
}

impl<T: Clone> Value for Eager<T> {
    type Output = T;

    #[inline]
    fn get(&self) -> T {
        self.value.clone()
    }
}

impl_output_traits!(Eager<T>);

/// Forwards to another value chosen at construction.
///
/// Useful where a field must have one concrete type but the recompute
/// policy behind it varies.
///
/// # Examples
///
/// ```
/// use deferval_core::{Computed, Held, Indirect, Value};
///
/// let fixed = Indirect::new(Held::new(10));
/// let derived = Indirect::new(Computed::new(|| 5 * 2));
///
/// assert_eq!(fixed.get(), 10);
/// assert_eq!(fixed, derived);
/// ```
pub struct Indirect<T> {
    target: Arc<dyn Value<Output = T> + Send + Sync>,
}

impl<T> Indirect<T> {
    pub fn new<V>(target: V) -> Self
    where
        V: Value<Output = T> + Send + Sync + 'static,
    {
        Self {
            target: Arc::new(target),
        }
    }

    /// Wraps a value that is already shared elsewhere.
    pub fn from_shared(target: Arc<dyn Value<Output = T> + Send + Sync>) -> Self {
        Self { target }
    }
}

impl<T> Clone for Indirect<T> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
        }
    }
}

impl<T> Value for Indirect<T> {
    type Output = T;

    #[inline]
    fn get(&self) -> T {
        self.target.get()
    }
}

impl<T> Debug for Indirect<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Indirect").finish_non_exhaustive()
    }
}

impl_output_traits!(Indirect<T>);
