//! Parser for `function@arg1@arg2` smart-contract call data.

use ledgerops_core::error::{CallDataError, CallDataResult};
use ledgerops_core::ports::{CallDataValidator, ParsedCall};

/// Separator between the function name and hex-encoded arguments.
pub const ARGUMENTS_SEPARATOR: char = '@';

/// Parses call data of the form `functionName@hexArg@hexArg...`.
///
/// Rules:
/// - the payload is UTF-8 text
/// - the function name is non-empty and only contains ASCII alphanumerics or `_`
/// - every argument is an even-length hex string (empty arguments are allowed)
#[derive(Debug, Clone, Copy, Default)]
pub struct CallArgsParser;

impl CallArgsParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_data(&self, data: &str) -> CallDataResult<ParsedCall> {
        if data.is_empty() {
            return Err(CallDataError::Empty);
        }

        let mut tokens = data.split(ARGUMENTS_SEPARATOR);
        let function = parse_function(tokens.next().unwrap_or_default())?;
        let arguments = tokens
            .enumerate()
            .map(|(index, token)| {
                hex::decode(token).map_err(|e| CallDataError::InvalidArgument {
                    index,
                    reason: e.to_string(),
                })
            })
            .collect::<CallDataResult<Vec<_>>>()?;

        Ok(ParsedCall {
            function,
            arguments,
        })
    }
}

fn parse_function(token: &str) -> CallDataResult<String> {
    if token.is_empty() {
        return Err(CallDataError::EmptyFunctionName);
    }
    if !token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(CallDataError::InvalidFunctionName(token.to_string()));
    }

    Ok(token.to_string())
}

impl CallDataValidator for CallArgsParser {
    fn parse_call(&self, payload: &[u8]) -> CallDataResult<ParsedCall> {
        let data = std::str::from_utf8(payload).map_err(|_| CallDataError::NotUtf8)?;
        self.parse_data(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_function_with_arguments() {
        let call = CallArgsParser::new().parse_data("transfer@0a@ff00@").unwrap();
        assert_eq!(call.function, "transfer");
        assert_eq!(call.arguments, vec![vec![0x0a], vec![0xff, 0x00], vec![]]);
    }

    #[test]
    fn test_parse_function_only() {
        let call = CallArgsParser::new().parse_data("claimRewards").unwrap();
        assert_eq!(call.function, "claimRewards");
        assert!(call.arguments.is_empty());
    }

    // Test critique: un mémo texte n'est pas un appel de fonction
    #[test]
    fn test_plain_memo_is_rejected() {
        let parser = CallArgsParser::new();
        assert!(matches!(
            parser.parse_data("thanks for lunch!"),
            Err(CallDataError::InvalidFunctionName(_))
        ));
        assert!(!parser.is_valid_call(b"hello world"));
    }

    #[test]
    fn test_bad_arguments_are_rejected() {
        let parser = CallArgsParser::new();
        assert!(matches!(
            parser.parse_data("transfer@abc"),
            Err(CallDataError::InvalidArgument { index: 0, .. })
        ));
        assert!(matches!(
            parser.parse_data("transfer@00@zz"),
            Err(CallDataError::InvalidArgument { index: 1, .. })
        ));
    }

    #[test]
    fn test_empty_payloads() {
        let parser = CallArgsParser::new();
        assert_eq!(parser.parse_call(b""), Err(CallDataError::Empty));
        assert_eq!(
            parser.parse_data("@00"),
            Err(CallDataError::EmptyFunctionName)
        );
    }

    #[test]
    fn test_non_utf8_payload() {
        assert_eq!(
            CallArgsParser::new().parse_call(&[0xff, 0xfe]),
            Err(CallDataError::NotUtf8)
        );
    }
}
