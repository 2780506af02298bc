//! Physical-layer reader and writer for Power Quality Data Interchange
//! Format (PQDIF, IEEE 1159.3-2003) files: record iteration, checksum
//! verification, record-level zlib compression, and element-tree parsing
//! with structural-error recovery (§4.C, §4.D).

pub mod error;
pub mod reader;
pub mod record;
pub mod writer;

pub use error::{Error, Result};
pub use reader::{PhysicalReader, PhysicalReaderOptions};
pub use record::{CompressionAlgorithm, CompressionStyle, Record, RecordHeader};
pub use writer::{PhysicalWriter, PhysicalWriterOptions};
