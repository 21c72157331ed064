pub mod auxiliary;
pub mod common;
pub mod descriptor;
pub mod payload;
pub mod schema;

pub use auxiliary::*;
pub use common::*;
pub use descriptor::*;
pub use payload::*;
pub use schema::*;
