use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Expected {expected} comma-separated numbers, found {found} in '{input}'.")]
    WrongArity {
        expected: usize,
        found: usize,
        input: String,
    },

    #[error("Invalid number '{value}' in '{input}'.")]
    InvalidNumber { value: String, input: String },

    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidAssignment(String),
}

fn parse_numbers<const N: usize>(input: &str) -> Result<[f64; N], ParseError> {
    let trimmed = input.trim().trim_start_matches('[').trim_end_matches(']');
    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(ParseError::WrongArity {
            expected: N,
            found: parts.len(),
            input: input.to_string(),
        });
    }
    let mut values = [0.0; N];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|_| ParseError::InvalidNumber {
            value: part.to_string(),
            input: input.to_string(),
        })?;
    }
    Ok(values)
}

/// Parses `x,y,z` (brackets optional).
pub fn parse_vector(input: &str) -> Result<[f64; 3], ParseError> {
    parse_numbers::<3>(input)
}

/// Parses `a,b,c,alpha,beta,gamma`.
pub fn parse_lattice(input: &str) -> Result<[f64; 6], ParseError> {
    parse_numbers::<6>(input)
}

/// Splits a `KEY=VALUE` override at the first `=`.
pub fn parse_assignment(input: &str) -> Result<(&str, &str), ParseError> {
    input
        .split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| ParseError::InvalidAssignment(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_parse_with_or_without_brackets() {
        assert_eq!(parse_vector("0.25,0,0"), Ok([0.25, 0.0, 0.0]));
        assert_eq!(parse_vector("[ -0.5, 1e-3, 0 ]"), Ok([-0.5, 0.001, 0.0]));
    }

    #[test]
    fn wrong_arity_is_reported() {
        assert_eq!(
            parse_vector("1,2"),
            Err(ParseError::WrongArity {
                expected: 3,
                found: 2,
                input: "1,2".to_string()
            })
        );
        assert!(matches!(
            parse_lattice("1,2,3"),
            Err(ParseError::WrongArity { expected: 6, .. })
        ));
    }

    #[test]
    fn invalid_numbers_are_reported() {
        assert!(matches!(
            parse_vector("1,x,3"),
            Err(ParseError::InvalidNumber { ref value, .. }) if value == "x"
        ));
    }

    #[test]
    fn assignments_split_at_the_first_equals_sign() {
        assert_eq!(parse_assignment("a.b=c=d"), Ok(("a.b", "c=d")));
        assert_eq!(parse_assignment(" key = 1 "), Ok(("key", "1")));
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=1").is_err());
    }
}
