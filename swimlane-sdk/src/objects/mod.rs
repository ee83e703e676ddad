pub mod frame;
pub mod stream;

pub use frame::StreamFrame;
pub use stream::{
    DecodeError, ExceptionEvent, RequestData, RequestEvent, StatusCode, StreamEvent, TaskId,
    Timestamp,
};
