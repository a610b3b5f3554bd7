//! Request decoding and response encoding over `tokio-util` codecs.

mod request_decoder;
mod response_encoder;

pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
