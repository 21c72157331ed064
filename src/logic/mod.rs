pub mod auxiliary;
pub mod editor;
pub mod form;
pub mod lint;
pub mod resolve;
pub mod validate;

pub use auxiliary::*;
pub use editor::*;
pub use form::*;
pub use lint::*;
pub use resolve::*;
pub use validate::*;
