//! Translation data: the tree itself and the sources it is loaded from.

pub mod source;
pub mod translation;

pub use source::{
    FileSource,
    HttpSource,
    LoadError,
    StaticSource,
    TranslationSource,
};
pub use translation::TranslationTree;
