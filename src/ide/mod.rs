//! IDE layer — document store and request handling for editor clients.
//!
//! This module sits between the extraction pipeline and whatever transport
//! the host uses (LSP, CLI, tests). It owns parsed documents, versions them
//! and answers span-scoped extraction requests against immutable snapshots.
//!
//! ## Usage
//!
//! ```ignore
//! use modelgen::ide::{AnalysisHost, ExtractionRequest};
//!
//! let host = AnalysisHost::new(config);
//! host.set_file_content("main.bal", source, Some(1));
//!
//! let analysis = host.analysis();
//! let response = analysis.respond(&ExtractionRequest::new("main.bal", span).with_version(1));
//! println!("{}", response.to_json()?);
//! ```

mod analysis;
mod cache;
mod request;

pub use analysis::{Analysis, AnalysisHost, Document};
pub use cache::ModelCache;
pub use request::{ExtractionRequest, ExtractionResponse, RequestParams, ResponseError};
