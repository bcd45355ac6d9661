//! Type definitions for cotizador

mod error;
mod insurer;
mod lote;
mod quote;

pub use error::*;
pub use insurer::*;
pub use lote::*;
pub use quote::*;
