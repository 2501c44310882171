//! 실시간 스트리밍을 위한 WebSocket 모듈.

pub mod messages;
pub mod stream;

pub use messages::{parse_stream_message, AggTradeEvent, BookTickerEvent, StreamEvent};
pub use stream::{ConnectionState, StreamConfig, StreamManager};
