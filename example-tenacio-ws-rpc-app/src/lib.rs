//! A synthetic image-reader service served over WebSockets.

mod registration;
pub use registration::register_format_reader;

mod servant;
pub use servant::{
    Catalogue, DEFAULT_READER, DEFAULT_READER_IDLE_TIMEOUT, FormatReaderServant, ImageInfo,
    READER_CONTEXT_KEY, ReaderError, SeriesInfo, reader_context, reader_of,
};
