mod error;
mod resolver;
mod source;

pub use error::{RateError, Result};
pub use resolver::RateResolver;
pub use source::{FixerClient, FixerSettings, RateSource, StaticRateSource};
