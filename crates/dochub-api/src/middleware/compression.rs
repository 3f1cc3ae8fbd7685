//! Response compression layer.

use tower_http::compression::CompressionLayer;

/// Builds a gzip compression layer.
///
/// The default predicate skips `text/event-stream`, so chat deltas are
/// flushed as they arrive.
pub fn build_compression_layer() -> CompressionLayer {
    CompressionLayer::new()
}
