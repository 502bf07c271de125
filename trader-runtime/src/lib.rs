pub mod abi;
pub mod calls;
pub mod client;
pub mod decode;
pub mod deploy;
pub mod error;
pub mod events;
pub mod query;
pub mod tx;
pub mod types;

pub use error::{CallResult, ContractError, LangError, TraderError};
pub use types::*;
pub use calls::CallBuilder;
pub use query::QueryClient;
pub use tx::{TxClient, TxOutcome};
