//! Small building blocks shared by the screens.

pub mod input_field;
pub mod selection;
