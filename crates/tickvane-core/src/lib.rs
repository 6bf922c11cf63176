//! # tickvane-core
//!
//! Domain types and vendor contracts for tickvane.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Canonical models (Ticker, Bar, Regime, timestamps) |
//! | [`source`] | Bar-source trait and fetch error taxonomy |
//! | [`http_client`] | Transport abstraction (reqwest / noop) |
//! | [`adapters`] | Vendor adapters (Yahoo chart API) |
//! | [`error`] | Validation and core error types |

pub mod adapters;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod source;

pub use adapters::YahooBarSource;
pub use domain::{Bar, Granularity, RawBar, Regime, Ticker, UtcDateTime};
pub use error::{CoreError, ValidationError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
pub use source::{BarSource, FetchError, FetchErrorKind, FetchRequest};
