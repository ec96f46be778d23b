mod coding;
mod operation_type;
mod result_code;

pub use coding::Coding;
pub use operation_type::OperationType;
pub use result_code::{
    AuthStatus, CheckStatus, CommonStatus, ResultError, ResultTable, SendStatus, classify_result,
};
