//! String-to-value coercion.
//!
//! [`build_parser`] picks a parser from a field's [`Kind`] and annotation.
//! Parsers are pure: the same token always yields the same value or the same
//! class of failure.

use std::fmt;
use std::sync::Arc;

use crate::error::{CoercionError, RegistrationError};
use crate::tag::Tag;
use crate::value::{Kind, Value};

type ParseFn = dyn Fn(&str) -> Result<Value, CoercionError> + Send + Sync;

/// A coercion function bound to one field.
#[derive(Clone)]
pub struct Parser(Arc<ParseFn>);

impl Parser {
    fn new(f: impl Fn(&str) -> Result<Value, CoercionError> + Send + Sync + 'static) -> Self {
        Parser(Arc::new(f))
    }

    pub fn parse(&self, input: &str) -> Result<Value, CoercionError> {
        (self.0)(input)
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Parser(..)")
    }
}

/// Build the parser for a field.
///
/// A list field used as a flag takes one comma-separated token; used as a
/// positional, each argument is parsed as a single element.
pub fn build_parser(kind: &Kind, tag: &Tag, is_flag: bool) -> Result<Parser, RegistrationError> {
    match kind {
        Kind::List(elem) if is_flag => Ok(list_parser(scalar_parser(elem, tag)?)),
        Kind::List(elem) => scalar_parser(elem, tag),
        _ => scalar_parser(kind, tag),
    }
}

fn list_parser(element: Parser) -> Parser {
    Parser::new(move |input| {
        input
            .split(',')
            .map(str::trim)
            .map(|part| {
                element.parse(part).map_err(|e| CoercionError::Element {
                    input: part.to_string(),
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    })
}

fn scalar_parser(kind: &Kind, tag: &Tag) -> Result<Parser, RegistrationError> {
    if let Some(oneof) = &tag.oneof {
        if oneof.is_empty() {
            return Err(RegistrationError::EmptyOneof);
        }
        if *kind != Kind::Str {
            return Err(RegistrationError::OneofNotString(kind.clone()));
        }
        return Ok(oneof_parser(tag.choices().unwrap_or_default()));
    }

    let parser = match kind {
        Kind::Duration => Parser::new(|s| Ok(Value::Duration(humantime::parse_duration(s)?))),
        Kind::Str => Parser::new(|s| Ok(Value::Str(s.to_string()))),
        Kind::Bool => Parser::new(|s| parse_bool(s).map(Value::Bool)),
        Kind::Int(bits) => {
            let bits = *bits;
            Parser::new(move |s| parse_int(s, bits).map(Value::Int))
        }
        Kind::Uint(bits) => {
            let bits = *bits;
            Parser::new(move |s| parse_uint(s, bits).map(Value::Uint))
        }
        Kind::Float(32) => Parser::new(|s| {
            let v = s.parse::<f32>()?;
            check_finite(s, v.is_infinite()).map(|()| Value::Float(f64::from(v)))
        }),
        Kind::Float(_) => Parser::new(|s| {
            let v = s.parse::<f64>()?;
            check_finite(s, v.is_infinite()).map(|()| Value::Float(v))
        }),
        Kind::List(_) | Kind::Other(_) => return Err(RegistrationError::Unsupported(kind.clone())),
    };
    Ok(parser)
}

fn oneof_parser(choices: Vec<String>) -> Parser {
    Parser::new(move |s| {
        choices
            .iter()
            .find(|c| c.as_str() == s)
            .map(|c| Value::Str(c.clone()))
            .ok_or_else(|| CoercionError::NotOneOf(choices.clone()))
    })
}

fn parse_bool(s: &str) -> Result<bool, CoercionError> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(CoercionError::Bool(s.to_string())),
    }
}

/// An infinite result is only accepted when it was spelled out.
fn check_finite(s: &str, infinite: bool) -> Result<(), CoercionError> {
    let spelled = s.trim_start_matches(['+', '-']).to_ascii_lowercase();
    if infinite && spelled != "inf" && spelled != "infinity" {
        return Err(CoercionError::FloatRange(s.to_string()));
    }
    Ok(())
}

fn parse_int(s: &str, bits: u32) -> Result<i64, CoercionError> {
    let v = match bits {
        8 => i64::from(s.parse::<i8>()?),
        16 => i64::from(s.parse::<i16>()?),
        32 => i64::from(s.parse::<i32>()?),
        _ => s.parse::<i64>()?,
    };
    Ok(v)
}

fn parse_uint(s: &str, bits: u32) -> Result<u64, CoercionError> {
    let v = match bits {
        8 => u64::from(s.parse::<u8>()?),
        16 => u64::from(s.parse::<u16>()?),
        32 => u64::from(s.parse::<u32>()?),
        _ => s.parse::<u64>()?,
    };
    Ok(v)
}
