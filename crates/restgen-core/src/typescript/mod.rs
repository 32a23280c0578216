//! TypeScript declaration generation.
//!
//! [`TypeWalker`] collects [`StructInfo`]s and [`ConstDecl`]s from the
//! descriptor graph, [`DeclarationEmitter`] turns them into a
//! `declare namespace` block.

pub mod declarations;
pub mod kinds;
pub mod model;
pub mod walker;

pub use declarations::DeclarationEmitter;
pub use model::{ConstDecl, EnumValue, FieldInfo, PLACEHOLDER, StructInfo, ValueKind};
pub use walker::{TypeWalker, WalkOutput};
