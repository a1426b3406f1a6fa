//! Label synthesis for combinator invocations.
//!
//! Every combinator constructor builds its label from the labels of its
//! arguments, so the string attached to a parser resembles the
//! expression that produced it: `sep_by(literal(","), decimal)`. The
//! repr of a [`Parser`] is its own label rather than any structural
//! representation; plain values quote themselves the way they would
//! appear in source.

use crate::parser::Parser;

/// A value that can appear as an argument inside a synthesized label.
pub trait ToLabel {
    fn to_label(&self) -> String;
}

impl<L: ToLabel + ?Sized> ToLabel for &L {
    fn to_label(&self) -> String {
        (**self).to_label()
    }
}

impl<T: 'static> ToLabel for Parser<T> {
    fn to_label(&self) -> String {
        self.label().to_string()
    }
}

impl ToLabel for str {
    fn to_label(&self) -> String {
        format!("{self:?}")
    }
}

impl ToLabel for String {
    fn to_label(&self) -> String {
        format!("{self:?}")
    }
}

impl ToLabel for char {
    fn to_label(&self) -> String {
        format!("{self:?}")
    }
}

macro_rules! display_label {
    ($($ty:ty),*) => {
        $(impl ToLabel for $ty {
            fn to_label(&self) -> String {
                self.to_string()
            }
        })*
    };
}

display_label!(bool, usize, u32, u64, i32, i64, f64);

impl<L: ToLabel> ToLabel for [L] {
    fn to_label(&self) -> String {
        let inner: Vec<String> = self.iter().map(ToLabel::to_label).collect();
        format!("[{}]", inner.join(", "))
    }
}

impl<L: ToLabel> ToLabel for Vec<L> {
    fn to_label(&self) -> String {
        self.as_slice().to_label()
    }
}

/// `name(repr(a1), ..., repr(an))`.
pub fn call(name: &str, args: &[&dyn ToLabel]) -> String {
    let rendered: Vec<String> = args.iter().map(|a| a.to_label()).collect();
    format!("{}({})", name, rendered.join(", "))
}
