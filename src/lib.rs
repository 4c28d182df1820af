//! churn-prep - Customer churn feature preprocessing
//!
//! Converts raw tabular customer data into numeric feature matrices for a
//! downstream statistical model and persists the fitted transformation so it
//! can be replayed identically at inference time.
//!
//! # Modules
//!
//! - [`config`] - Explicit run configuration (column lists, target, artifact path)
//! - [`preprocessing`] - Imputation, standardization, one-hot encoding, and
//!   the [`ColumnPreprocessor`](preprocessing::ColumnPreprocessor) that
//!   composes them column-wise
//! - [`transformation`] - The one-shot runner over a train/test CSV pair
//! - [`utils`] - CSV loading
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use churn_prep::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> churn_prep::Result<()> {
//! let runner = DataTransformation::new(TransformationConfig::default());
//! let (train, test, artifact) =
//!     runner.run(Path::new("data/train.csv"), Path::new("data/test.csv"))?;
//! assert_eq!(train.ncols(), test.ncols());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod preprocessing;
pub mod transformation;
pub mod utils;

pub use error::{PrepError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::TransformationConfig;
    pub use crate::error::{PrepError, Result};
    pub use crate::preprocessing::{
        ColumnPreprocessor, FillValue, ImputeStrategy, Imputer, OneHotEncoder, StandardScaler,
    };
    pub use crate::transformation::DataTransformation;
    pub use crate::utils::DataLoader;
}
