//! String values rendered lazily and then frozen.
//!
//! Each type here renders its string the first time it is asked for and hands
//! back the same string forever after, even if the wrapped object would now
//! render differently. They are meant for log and diagnostic messages whose
//! arguments are expensive to format and may never be needed.
//!
//! The slot is a `once_cell::sync::OnceCell`, so concurrent first access runs
//! the formatter once and every caller observes the same string.

use once_cell::sync::OnceCell;
use std::fmt::{self, Debug, Display, Write};

use crate::value::impl_output_traits;
use crate::Value;

/// A string produced by a formatting closure on first access.
///
/// # Examples
///
/// ```
/// use deferval_core::{Formatted, Value};
///
/// let user = "ana";
/// let attempts = 3;
/// let message = Formatted::new(move || format!("{user} failed {attempts} logins"));
///
/// assert_eq!(message.get(), "ana failed 3 logins");
/// assert_eq!(message.as_str(), "ana failed 3 logins");
/// ```
pub struct Formatted<F> {
    formatter: F,
    rendered: OnceCell<String>,
}

impl<F> Formatted<F>
where
    F: Fn() -> String,
{
    pub fn new(formatter: F) -> Self {
        Self {
            formatter,
            rendered: OnceCell::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        self.rendered.get_or_init(|| (self.formatter)())
    }
}

impl<F> Value for Formatted<F>
where
    F: Fn() -> String,
{
    type Output = String;

    fn get(&self) -> String {
        self.as_str().to_owned()
    }
}

impl<F> Debug for Formatted<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatted")
            .field("rendered", &self.rendered.get())
            .finish_non_exhaustive()
    }
}

impl_output_traits!(Formatted<F>);

/// The `Display` rendering of an object, taken on first access.
///
/// # Examples
///
/// ```
/// use deferval_core::{ToStringValue, Value};
/// use std::net::Ipv4Addr;
///
/// let addr = ToStringValue::new(Ipv4Addr::LOCALHOST);
/// assert_eq!(addr.get(), "127.0.0.1");
/// ```
pub struct ToStringValue<D> {
    source: D,
    rendered: OnceCell<String>,
}

impl<D: Display> ToStringValue<D> {
    pub fn new(source: D) -> Self {
        Self {
            source,
            rendered: OnceCell::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        self.rendered.get_or_init(|| self.source.to_string())
    }

    pub fn source(&self) -> &D {
        &self.source
    }
}

impl<D: Display> Value for ToStringValue<D> {
    type Output = String;

    fn get(&self) -> String {
        self.as_str().to_owned()
    }
}

impl<D> Debug for ToStringValue<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToStringValue")
            .field("rendered", &self.rendered.get())
            .finish_non_exhaustive()
    }
}

impl_output_traits!(ToStringValue<D>);

/// A sequence rendered as `[a, b, c]` on first access.
///
/// # Examples
///
/// ```
/// use deferval_core::{ArrayString, Value};
///
/// assert_eq!(ArrayString::new(vec![1, 2, 3]).get(), "[1, 2, 3]");
/// assert_eq!(ArrayString::new(Vec::<u8>::new()).get(), "[]");
/// ```
pub struct ArrayString<T> {
    items: Vec<T>,
    rendered: OnceCell<String>,
}

impl<T: Display> ArrayString<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            rendered: OnceCell::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        self.rendered.get_or_init(|| render_items(&self.items))
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T: Display> From<Vec<T>> for ArrayString<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T: Display> Value for ArrayString<T> {
    type Output = String;

    fn get(&self) -> String {
        self.as_str().to_owned()
    }
}

impl<T> Debug for ArrayString<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayString")
            .field("len", &self.items.len())
            .field("rendered", &self.rendered.get())
            .finish()
    }
}

impl_output_traits!(ArrayString<T>);

fn render_items<T: Display>(items: &[T]) -> String {
    let mut out = String::from("[");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        // Writing into a String cannot fail
        let _ = write!(out, "{item}");
    }
    out.push(']');
    out
}
