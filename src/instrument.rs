//! Function-level instrumentation
//!
//! [`Linetimer`] wraps a callable once; every call through the resulting
//! [`Instrumented`] is timed by a fresh [`CodeTimer`] whose block name is
//! either fixed or synthesized from the callable's name and its arguments.
//!
//! Arguments are passed as a tuple. Plain elements are positional arguments;
//! [`kw`] marks a named one. The callable receives the plain values in tuple
//! order, so named arguments only affect the label, where they are listed
//! after the positional ones:
//!
//! ```
//! use linetimer::instrument::{kw, Linetimer};
//! use linetimer::sink::MemorySink;
//!
//! fn connect(host: &str, port: u16) -> String {
//!     format!("{host}:{port}")
//! }
//!
//! let messages = MemorySink::new();
//! let connect = Linetimer::new()
//!     .with_show_args(true)
//!     .with_sink(messages.clone())
//!     .wrap("connect", connect);
//!
//! let addr = connect.call(("db", kw("port", 5432u16)));
//!
//! assert_eq!(addr, "db:5432");
//! assert!(messages
//!     .last()
//!     .unwrap()
//!     .starts_with("Code block 'connect('db', port=5432)' took: "));
//! ```

use crate::config::{ThresholdMode, TimerConfig};
use crate::error::TimerError;
use crate::repr::ArgRepr;
use crate::sink::Sink;
use crate::timer::{CodeTimer, Measurement};
use crate::unit::Unit;

/// A named argument, rendered as `name=value` in call labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kw<T> {
    /// Parameter name shown before `=`
    pub name: &'static str,
    /// Value passed to the callable
    pub value: T,
}

/// Mark `value` as the named argument `name`
pub fn kw<T>(name: &'static str, value: T) -> Kw<T> {
    Kw { name, value }
}

/// One element of an argument tuple
pub trait Arg {
    /// What the wrapped callable receives
    type Value;

    /// Rendering inside the call label
    fn render(&self) -> String;

    /// True for [`Kw`] arguments, which labels list after positional ones
    fn is_named(&self) -> bool {
        false
    }

    /// Strip any marker, leaving the value passed to the callable
    fn into_value(self) -> Self::Value;
}

impl<T: ArgRepr> Arg for T {
    type Value = T;

    fn render(&self) -> String {
        self.repr()
    }

    fn into_value(self) -> T {
        self
    }
}

impl<T: ArgRepr> Arg for Kw<T> {
    type Value = T;

    fn render(&self) -> String {
        format!("{}={}", self.name, self.value.repr())
    }

    fn is_named(&self) -> bool {
        true
    }

    fn into_value(self) -> T {
        self.value
    }
}

/// Tuple of call arguments
pub trait ArgList {
    /// Argument values with [`Kw`] markers stripped
    type Values;

    /// Rendered arguments: positional ones first, then named ones, each
    /// group in call order
    fn render(&self) -> Vec<String>;

    /// Values in tuple order, as the callable receives them
    fn into_values(self) -> Self::Values;
}

/// Callable taking its arguments unpacked from a tuple
pub trait Callable<Args> {
    /// Return type of the call
    type Output;

    /// Call with the tuple spread into separate arguments
    fn invoke(&self, args: Args) -> Self::Output;
}

impl ArgList for () {
    type Values = ();

    fn render(&self) -> Vec<String> {
        Vec::new()
    }

    fn into_values(self) -> Self::Values {}
}

impl<F, R> Callable<()> for F
where
    F: Fn() -> R,
{
    type Output = R;

    fn invoke(&self, _args: ()) -> R {
        self()
    }
}

macro_rules! impl_arity {
    ($($arg:ident $val:ident),+) => {
        impl<$($arg: Arg),+> ArgList for ($($arg,)+) {
            type Values = ($($arg::Value,)+);

            #[allow(non_snake_case)]
            fn render(&self) -> Vec<String> {
                let ($($arg,)+) = self;
                let mut positional = Vec::new();
                let mut named = Vec::new();
                $(
                    if $arg.is_named() {
                        named.push($arg.render());
                    } else {
                        positional.push($arg.render());
                    }
                )+
                positional.append(&mut named);
                positional
            }

            #[allow(non_snake_case)]
            fn into_values(self) -> Self::Values {
                let ($($arg,)+) = self;
                ($($arg.into_value(),)+)
            }
        }

        impl<Func, Ret, $($val),+> Callable<($($val,)+)> for Func
        where
            Func: Fn($($val),+) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn invoke(&self, args: ($($val,)+)) -> Ret {
                let ($($val,)+) = args;
                self($($val),+)
            }
        }
    };
}

impl_arity!(A0 V0);
impl_arity!(A0 V0, A1 V1);
impl_arity!(A0 V0, A1 V1, A2 V2);
impl_arity!(A0 V0, A1 V1, A2 V2, A3 V3);
impl_arity!(A0 V0, A1 V1, A2 V2, A3 V3, A4 V4);
impl_arity!(A0 V0, A1 V1, A2 V2, A3 V3, A4 V4, A5 V5);
impl_arity!(A0 V0, A1 V1, A2 V2, A3 V3, A4 V4, A5 V5, A6 V6);
impl_arity!(A0 V0, A1 V1, A2 V2, A3 V3, A4 V4, A5 V5, A6 V6, A7 V7);

/// Builder for instrumented callables
///
/// `name` on the wrapper is a fixed block name: when set it is used verbatim
/// for every call and `show_args` has no effect.
#[derive(Debug, Clone, Default)]
pub struct Linetimer {
    show_args: bool,
    config: TimerConfig,
}

impl Linetimer {
    /// Wrapper with default settings and argument labels off
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward an existing configuration to every call
    pub fn from_config(config: TimerConfig) -> Self {
        Self {
            show_args: false,
            config,
        }
    }

    /// Include the call arguments in synthesized names
    pub fn with_show_args(mut self, show_args: bool) -> Self {
        self.show_args = show_args;
        self
    }

    /// Fixed block name, overriding synthesis
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.with_name(name);
        self
    }

    /// Suppress or allow messages for every call
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.config = self.config.with_silent(silent);
        self
    }

    /// Reporting unit for every call
    pub fn with_unit(mut self, unit: impl Into<Unit>) -> Self {
        self.config = self.config.with_unit(unit);
        self
    }

    /// Emission threshold for every call; must be finite
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, TimerError> {
        self.config = self.config.with_threshold(threshold)?;
        Ok(self)
    }

    /// How the threshold is compared
    pub fn with_threshold_mode(mut self, mode: ThresholdMode) -> Self {
        self.config = self.config.with_threshold_mode(mode);
        self
    }

    /// Route every call's message to `sink`
    pub fn with_sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.config = self.config.with_sink(sink);
        self
    }

    /// Whether synthesized names include the arguments
    pub fn show_args(&self) -> bool {
        self.show_args
    }

    /// Configuration forwarded to each call's timer
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Wrap `f`, displayed as `name` in synthesized block names
    pub fn wrap<F>(&self, name: impl Into<String>, f: F) -> Instrumented<F> {
        Instrumented {
            name: name.into(),
            f,
            show_args: self.show_args,
            config: self.config.clone(),
        }
    }
}

/// A callable whose every invocation is timed
#[derive(Debug, Clone)]
pub struct Instrumented<F> {
    name: String,
    f: F,
    show_args: bool,
    config: TimerConfig,
}

impl<F> Instrumented<F> {
    /// Name of the wrapped callable
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block name a call with `args` is reported under
    pub fn label<A: ArgList>(&self, args: &A) -> String {
        if let Some(fixed) = self.config.display_name() {
            return fixed.to_string();
        }
        if !self.show_args {
            return self.name.clone();
        }
        format!("{}({})", self.name, args.render().join(", "))
    }

    /// Call the wrapped function, timing it
    ///
    /// The return value is passed through unchanged. The message is emitted
    /// before an `Err` is returned or a panic continues to unwind.
    pub fn call<A>(&self, args: A) -> <F as Callable<A::Values>>::Output
    where
        A: ArgList,
        F: Callable<A::Values>,
    {
        let mut timer = self.timer_for(&args);
        timer.time(|| self.f.invoke(args.into_values()))
    }

    /// Like [`call`](Self::call), also returning the measurement
    pub fn call_measured<A>(&self, args: A) -> (<F as Callable<A::Values>>::Output, Measurement)
    where
        A: ArgList,
        F: Callable<A::Values>,
    {
        let mut timer = self.timer_for(&args);
        timer.time_measured(|| self.f.invoke(args.into_values()))
    }

    /// Recover the wrapped callable
    pub fn into_inner(self) -> F {
        self.f
    }

    fn timer_for<A: ArgList>(&self, args: &A) -> CodeTimer {
        let config = self.config.clone().with_name(self.label(args));
        CodeTimer::with_config(config)
    }
}

/// Wrap a function item, using its identifier as the display name
///
/// ```
/// use linetimer::{linetimer, Linetimer};
///
/// fn square(x: i64) -> i64 {
///     x * x
/// }
///
/// let square = linetimer!(Linetimer::new().with_silent(true), square);
/// assert_eq!(square.name(), "square");
/// assert_eq!(square.call((7i64,)), 49);
/// ```
#[macro_export]
macro_rules! linetimer {
    ($f:ident) => {
        $crate::instrument::Linetimer::new().wrap(stringify!($f), $f)
    };
    ($wrapper:expr, $f:ident) => {
        $wrapper.wrap(stringify!($f), $f)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use std::collections::HashMap;

    fn wrapper(show_args: bool, sink: &MemorySink) -> Linetimer {
        Linetimer::new()
            .with_show_args(show_args)
            .with_sink(sink.clone())
    }

    fn label_of(message: Option<String>) -> String {
        let message = message.expect("no message emitted");
        let rest = message
            .strip_prefix("Code block '")
            .expect("message has no name segment");
        let end = rest.rfind("' took: ").expect("message has no duration");
        rest[..end].to_string()
    }

    #[test]
    fn test_label_without_args() {
        let sink = MemorySink::new();
        let foo = wrapper(false, &sink).wrap("foo", |_a: i32, _b: &str| ());
        foo.call((1, "b"));
        assert_eq!(label_of(sink.last()), "foo");
    }

    #[test]
    fn test_label_with_positional_args() {
        let sink = MemorySink::new();
        let foo = wrapper(true, &sink).wrap("foo_show_args", |_a: &str, _b: &str| ());

        foo.call(("a", "b"));
        assert_eq!(label_of(sink.last()), "foo_show_args('a', 'b')");
    }

    #[test]
    fn test_label_with_named_args() {
        let sink = MemorySink::new();
        let two = wrapper(true, &sink).wrap("foo_show_args", |_a: i32, _b: &str| ());
        let one = wrapper(true, &sink).wrap("foo_show_args", |_b: &str| ());

        two.call((1, kw("b", "b")));
        assert_eq!(label_of(sink.last()), "foo_show_args(1, b='b')");

        one.call((kw("b", "b"),));
        assert_eq!(label_of(sink.last()), "foo_show_args(b='b')");
    }

    #[test]
    fn test_label_lists_named_args_after_positional() {
        let sink = MemorySink::new();
        let f = wrapper(true, &sink).wrap("f", |a: i32, b: i32| a - b);

        // The callable still receives the values in tuple order.
        assert_eq!(f.call((kw("b", 2), 1)), 1);
        assert_eq!(label_of(sink.last()), "f(1, b=2)");

        let g = wrapper(true, &sink).wrap("g", |_a: &str, _b: i32, _c: &str, _d: i32| ());
        g.call((kw("a", "x"), 1, kw("c", "y"), 2));
        assert_eq!(label_of(sink.last()), "g(1, 2, a='x', c='y')");
        assert_eq!(g.label(&(kw("a", "x"), 1, kw("c", "y"), 2)), "g(1, 2, a='x', c='y')");
    }

    #[test]
    fn test_with_threshold_rejects_non_finite() {
        let err = Linetimer::new().with_threshold(f64::NAN).unwrap_err();
        assert!(matches!(err, TimerError::InvalidThreshold(t) if t.is_nan()));

        let wrapper = Linetimer::new().with_threshold(5.0).unwrap();
        assert_eq!(wrapper.config().threshold, Some(5.0));
    }

    #[test]
    fn test_label_with_collections() {
        let sink = MemorySink::new();
        let foo = wrapper(true, &sink).wrap(
            "foo_show_args",
            |_a: Vec<Option<i32>>, _b: HashMap<String, i32>| (),
        );

        foo.call((vec![None], HashMap::new()));
        assert_eq!(label_of(sink.last()), "foo_show_args([None], {})");
    }

    #[test]
    fn test_label_with_no_args() {
        let sink = MemorySink::new();
        let foo = wrapper(true, &sink).wrap("tick", || 1);
        assert_eq!(foo.call(()), 1);
        assert_eq!(label_of(sink.last()), "tick()");
    }

    #[test]
    fn test_fixed_name_overrides_synthesis() {
        let sink = MemorySink::new();
        let foo = wrapper(true, &sink)
            .with_name("my name")
            .wrap("foo", |_a: i32| ());

        foo.call((1,));
        assert_eq!(label_of(sink.last()), "my name");
        assert_eq!(foo.label(&(1,)), "my name");
    }

    #[test]
    fn test_return_value_passes_through() {
        let sink = MemorySink::new();
        let add = wrapper(false, &sink).wrap("add", |a: i32, b: i32| a + b);
        assert_eq!(add.call((2, 3)), 5);
    }

    #[test]
    fn test_error_passes_through_after_emission() {
        let sink = MemorySink::new();
        let parse = wrapper(true, &sink).wrap("parse", |s: &str| s.parse::<u32>());

        let err = parse.call(("nope",)).unwrap_err();
        assert_eq!(err.to_string(), "invalid digit found in string");
        assert_eq!(label_of(sink.last()), "parse('nope')");
    }

    #[test]
    fn test_config_forwarded_to_each_call() {
        let sink = MemorySink::new();
        let quiet = wrapper(false, &sink).with_silent(true).wrap("quiet", || ());
        quiet.call(());
        assert!(sink.is_empty());

        let in_seconds = wrapper(false, &sink).with_unit("s").wrap("secs", || ());
        in_seconds.call(());
        assert!(sink.last().unwrap().ends_with(" s"));
    }

    #[test]
    fn test_call_measured() {
        let sink = MemorySink::new();
        let foo = wrapper(true, &sink).wrap("foo", |x: i32| x * 2);

        let (value, measurement) = foo.call_measured((21,));
        assert_eq!(value, 42);
        assert_eq!(measurement.name.as_deref(), Some("foo(21)"));
        assert!(measurement.elapsed >= 0.0);
        assert_eq!(measurement.message, sink.last());
    }

    #[test]
    fn test_macro_uses_identifier() {
        fn double(x: i32) -> i32 {
            x * 2
        }

        let sink = MemorySink::new();
        let double = linetimer!(wrapper(true, &sink), double);
        assert_eq!(double.call((4,)), 8);
        assert_eq!(label_of(sink.last()), "double(4)");
    }

    #[test]
    fn test_into_inner() {
        let f = Linetimer::new().wrap("id", |x: u8| x).into_inner();
        assert_eq!(f(3), 3);
    }
}
