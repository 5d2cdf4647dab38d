//! Chart aggregate: the viewport model, its value objects and styling.

pub mod entities;
pub mod style;
pub mod value_objects;

pub use entities::*;
pub use style::*;
pub use value_objects::*;
