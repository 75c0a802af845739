pub mod error;
pub mod node;
pub mod parser;

pub use node::{
    AsyncKind, AsyncRecord, Document, NamedResult, OutOfBandRecord, ResultClass, ResultRecord,
    StreamKind, StreamRecord, Value,
};
pub use parser::Parser;
