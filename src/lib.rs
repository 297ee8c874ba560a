//! Mockshift - migrate sinon test doubles and assertions to jest.
//!
//! Mockshift rewrites JavaScript and TypeScript test files in place. It
//! recognizes sinon spies, stubs, argument matchers, fake timers and
//! spy-state assertions, and turns them into their jest equivalents while
//! leaving every untouched region of the file byte-for-byte identical.
//!
//! # Architecture
//!
//! - `parser`: tree-sitter grammars and parsing
//! - `tree`: arena source tree, round-tripping printer and identifier bindings
//! - `transform`: import gate, rewrite rules and the fixed pass pipeline
//! - `config`: YAML configuration
//! - `runner`: file discovery and parallel migration
//! - `report`: output formatting (pretty, JSON)
//!
//! # Example
//!
//! ```
//! use mockshift::{SourceLanguage, TransformOptions, Transformer};
//!
//! let source = "import sinon from 'sinon'\nconst get = sinon.stub(Api, 'get')\n";
//! let outcome = Transformer::new(TransformOptions::default())
//!     .transform(source, SourceLanguage::JavaScript)
//!     .unwrap();
//! assert_eq!(outcome.output, "const get = jest.spyOn(Api, 'get')\n");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod report;
pub mod runner;
pub mod transform;
pub mod tree;

pub use config::{Config, TransformOptions};
pub use error::TransformError;
pub use parser::SourceLanguage;
pub use runner::{FileResult, FileStatus, RunResult, Runner};
pub use transform::{TransformOutcome, Transformer};
