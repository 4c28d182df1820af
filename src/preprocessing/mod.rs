//! Column-wise data preprocessing
//!
//! Provides the preprocessing primitives and their composition:
//! - Missing value imputation (median, most-frequent)
//! - Standardization of numeric features
//! - Drop-first one-hot encoding of categorical features
//! - [`ColumnPreprocessor`], which routes each configured column group
//!   through its sub-pipeline and assembles the numeric output matrix

mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use encoder::OneHotEncoder;
pub use imputer::{FillValue, ImputeStrategy, Imputer};
pub use pipeline::{ColumnPreprocessor, ARTIFACT_SCHEMA_VERSION};
pub use scaler::{ScalerParams, StandardScaler};
