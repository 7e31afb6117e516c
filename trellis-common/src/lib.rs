//! Basic types shared by trellis crates.

mod atom;
mod data;
mod value;

pub use crate::{
    atom::Atom,
    data::Data,
    value::{SharedValue, TemplateSlot, Value},
};
