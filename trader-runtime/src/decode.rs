//! Shared decode utilities for contract call return data.
//!
//! Every message returns a nested result: the outer layer says whether the
//! call could be dispatched and read at all ([`LangError`]), the inner layer
//! carries the contract's domain outcome ([`CallResult`]). Decoding is
//! strict: a payload that doesn't exactly match the declared schema fails
//! rather than yielding a partial value.

use codec::Decode;

use crate::error::{CallResult, LangError, TraderError};

/// Decode the nested call result for a message with result type `T`.
///
/// A dispatch-level failure (the outer `Err`) becomes
/// [`TraderError::Dispatch`]; a domain rejection stays inside the returned
/// [`CallResult`].
pub fn decode_call_result<T: Decode>(data: &[u8]) -> Result<CallResult<T>, TraderError> {
    let mut input = data;
    let outer = <Result<CallResult<T>, LangError>>::decode(&mut input)
        .map_err(|e| TraderError::Decode(format!("return data does not match result schema: {e}")))?;
    if !input.is_empty() {
        return Err(TraderError::Decode(format!(
            "{} trailing bytes after call result",
            input.len()
        )));
    }
    outer.map_err(|lang| TraderError::Dispatch(lang.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContractError;
    use crate::types::{IdentityId, PortfolioId, PortfolioKind};
    use codec::Encode;

    type Nested<T> = Result<Result<T, ContractError>, LangError>;

    #[test]
    fn test_decode_ok_value() {
        let payload: Nested<bool> = Ok(Ok(true));
        let result = decode_call_result::<bool>(&payload.encode()).unwrap();
        assert_eq!(result, Ok(true));
    }

    #[test]
    fn test_decode_domain_error() {
        let payload: Nested<()> = Ok(Err(ContractError::NotForSale));
        let result = decode_call_result::<()>(&payload.encode()).unwrap();
        assert_eq!(result, Err(ContractError::NotForSale));
    }

    #[test]
    fn test_decode_dispatch_error() {
        let payload: Nested<()> = Err(LangError::CouldNotReadInput);
        let err = decode_call_result::<()>(&payload.encode()).unwrap_err();
        assert!(matches!(err, TraderError::Dispatch(_)));
    }

    #[test]
    fn test_decode_portfolio_kind_round_trip() {
        for kind in [PortfolioKind::Default, PortfolioKind::User(7)] {
            let payload: Nested<Option<PortfolioId>> = Ok(Ok(Some(PortfolioId {
                did: IdentityId([9u8; 32]),
                kind,
            })));
            let result = decode_call_result::<Option<PortfolioId>>(&payload.encode()).unwrap();
            assert_eq!(result.unwrap().unwrap().kind, kind);
        }
    }

    #[test]
    fn test_mismatched_schema_fails_not_partial() {
        // A bool payload decoded as a wider type must fail outright.
        let payload: Nested<bool> = Ok(Ok(true));
        assert!(decode_call_result::<(bool, u64)>(&payload.encode()).is_err());

        // Trailing bytes after a well-formed result are rejected too.
        let mut bytes = payload.encode();
        bytes.extend_from_slice(&[1, 2, 3]);
        assert!(decode_call_result::<bool>(&bytes).is_err());

        // Truncated input fails.
        let bytes = payload.encode();
        assert!(decode_call_result::<bool>(&bytes[..bytes.len() - 1]).is_err());
    }
}
