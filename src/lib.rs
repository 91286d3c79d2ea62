pub mod builder;
pub mod config;
pub mod corpus;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod raw;
pub mod report;
pub mod validate;

pub use builder::build_recipe;
pub use corpus::{load_corpus, CorpusWriter};
pub use error::ContractError;
pub use model::{Ingredient, Recipe};
pub use raw::{BuildContext, FieldKey, RawBlock, RawValue};
pub use validate::{validate, Concern, QualityReport, ValidatedRecipe};
