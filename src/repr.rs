//! Textual representation of call arguments
//!
//! Labels synthesized by the call wrapper render each argument the way an
//! interactive interpreter would echo it: strings single-quoted (switching to
//! double quotes when that avoids escaping), `None` for empty options,
//! `[..]` for sequences and `{..}` for maps. Types that want a custom label
//! implement [`ArgRepr`] themselves.
//!
//! ```
//! use linetimer::repr::ArgRepr;
//!
//! struct Connection;
//!
//! impl ArgRepr for Connection {
//!     fn repr(&self) -> String {
//!         "<Connection>".to_string()
//!     }
//! }
//!
//! assert_eq!("a".repr(), "'a'");
//! assert_eq!(vec![Some(1i32), None].repr(), "[1, None]");
//! assert_eq!(Connection.repr(), "<Connection>");
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::{self, Debug, Display, Write};
use std::rc::Rc;
use std::sync::Arc;

/// Representation of a value inside a synthesized call label
pub trait ArgRepr {
    /// Text shown for this value in a call label
    fn repr(&self) -> String;
}

/// Quote a string the way call labels show text arguments
pub fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = c as u32;
                // Writing to a String cannot fail.
                let _ = match code {
                    0..=0xff => write!(out, "\\x{code:02x}"),
                    0x100..=0xffff => write!(out, "\\u{code:04x}"),
                    _ => write!(out, "\\U{code:08x}"),
                };
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Render a float with an explicit, at-least-two-digit exponent (`1e+20`,
/// `1e-05`) and lowercase `nan`/`inf`
fn float_repr(value: f64, debug: String) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => debug,
    }
}

macro_rules! impl_repr_display {
    ($($t:ty),* $(,)?) => {
        $(
            impl ArgRepr for $t {
                fn repr(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_repr_display!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl ArgRepr for f64 {
    fn repr(&self) -> String {
        float_repr(*self, format!("{self:?}"))
    }
}

impl ArgRepr for f32 {
    fn repr(&self) -> String {
        float_repr(f64::from(*self), format!("{self:?}"))
    }
}

impl ArgRepr for bool {
    fn repr(&self) -> String {
        if *self { "True" } else { "False" }.to_string()
    }
}

impl ArgRepr for char {
    fn repr(&self) -> String {
        let mut buf = [0u8; 4];
        quote_str(self.encode_utf8(&mut buf))
    }
}

impl ArgRepr for () {
    fn repr(&self) -> String {
        "None".to_string()
    }
}

impl ArgRepr for str {
    fn repr(&self) -> String {
        quote_str(self)
    }
}

impl ArgRepr for String {
    fn repr(&self) -> String {
        quote_str(self)
    }
}

impl ArgRepr for Cow<'_, str> {
    fn repr(&self) -> String {
        quote_str(self)
    }
}

impl<T: ArgRepr> ArgRepr for Option<T> {
    fn repr(&self) -> String {
        match self {
            Some(value) => value.repr(),
            None => "None".to_string(),
        }
    }
}

impl<T: ArgRepr + ?Sized> ArgRepr for &T {
    fn repr(&self) -> String {
        (**self).repr()
    }
}

impl<T: ArgRepr + ?Sized> ArgRepr for &mut T {
    fn repr(&self) -> String {
        (**self).repr()
    }
}

impl<T: ArgRepr + ?Sized> ArgRepr for Box<T> {
    fn repr(&self) -> String {
        (**self).repr()
    }
}

impl<T: ArgRepr + ?Sized> ArgRepr for Rc<T> {
    fn repr(&self) -> String {
        (**self).repr()
    }
}

impl<T: ArgRepr + ?Sized> ArgRepr for Arc<T> {
    fn repr(&self) -> String {
        (**self).repr()
    }
}

fn join<'a, T: ArgRepr + 'a>(items: impl IntoIterator<Item = &'a T>) -> String {
    items
        .into_iter()
        .map(ArgRepr::repr)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_pairs<'a, K, V>(pairs: impl IntoIterator<Item = (&'a K, &'a V)>) -> String
where
    K: ArgRepr + 'a,
    V: ArgRepr + 'a,
{
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}: {}", k.repr(), v.repr()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<T: ArgRepr> ArgRepr for [T] {
    fn repr(&self) -> String {
        format!("[{}]", join(self))
    }
}

impl<T: ArgRepr, const N: usize> ArgRepr for [T; N] {
    fn repr(&self) -> String {
        self.as_slice().repr()
    }
}

impl<T: ArgRepr> ArgRepr for Vec<T> {
    fn repr(&self) -> String {
        self.as_slice().repr()
    }
}

impl<T: ArgRepr> ArgRepr for VecDeque<T> {
    fn repr(&self) -> String {
        format!("[{}]", join(self))
    }
}

impl<K: ArgRepr, V: ArgRepr, S> ArgRepr for HashMap<K, V, S> {
    fn repr(&self) -> String {
        format!("{{{}}}", join_pairs(self))
    }
}

impl<K: ArgRepr, V: ArgRepr> ArgRepr for BTreeMap<K, V> {
    fn repr(&self) -> String {
        format!("{{{}}}", join_pairs(self))
    }
}

impl<T: ArgRepr, S> ArgRepr for HashSet<T, S> {
    fn repr(&self) -> String {
        if self.is_empty() {
            return "set()".to_string();
        }
        format!("{{{}}}", join(self))
    }
}

impl<T: ArgRepr> ArgRepr for BTreeSet<T> {
    fn repr(&self) -> String {
        if self.is_empty() {
            return "set()".to_string();
        }
        format!("{{{}}}", join(self))
    }
}

/// Renders the wrapped value with its `Debug` output
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DebugRepr<T>(pub T);

impl<T: Debug> ArgRepr for DebugRepr<T> {
    fn repr(&self) -> String {
        format!("{:?}", self.0)
    }
}

impl<T: Debug> Debug for DebugRepr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Renders the wrapped value with its `Display` output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRepr<T>(pub T);

impl<T: Display> ArgRepr for DisplayRepr<T> {
    fn repr(&self) -> String {
        self.0.to_string()
    }
}
