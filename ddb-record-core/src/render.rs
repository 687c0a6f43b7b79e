/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Compact diagnostic rendering of attribute values.

use std::fmt;

use aws_sdk_dynamodb::types::AttributeValue;

/// Returns the DynamoDB type descriptor of an attribute value (`S`, `N`, `BOOL`, ...).
pub fn variant_name(av: &AttributeValue) -> &'static str {
    match av {
        AttributeValue::S(_) => "S",
        AttributeValue::N(_) => "N",
        AttributeValue::B(_) => "B",
        AttributeValue::Ss(_) => "SS",
        AttributeValue::Ns(_) => "NS",
        AttributeValue::Bs(_) => "BS",
        AttributeValue::M(_) => "M",
        AttributeValue::L(_) => "L",
        AttributeValue::Null(_) => "NULL",
        AttributeValue::Bool(_) => "BOOL",
        _ => "Unknown",
    }
}

/// Renders an [`AttributeValue`] for error messages.
///
/// Strings and binary values are quoted, numbers are written as-is, sets and lists are written as
/// `[a,b]` and maps as `{"k":v}` with keys in sorted order.
#[derive(Debug, Clone, Copy)]
pub struct DisplayAttributeValue<'a>(pub &'a AttributeValue);

impl fmt::Display for DisplayAttributeValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            AttributeValue::Bool(true) => f.write_str("true"),
            AttributeValue::Bool(false) => f.write_str("false"),
            AttributeValue::Null(_) => f.write_str("(null)"),
            AttributeValue::S(s) => write!(f, "{s:?}"),
            AttributeValue::N(n) => f.write_str(n),
            AttributeValue::B(b) => write_quoted_bytes(f, b.as_ref()),
            AttributeValue::Ss(values) => write_list(f, values, |f, v| write!(f, "{v:?}")),
            AttributeValue::Ns(values) => write_list(f, values, |f, v| f.write_str(v)),
            AttributeValue::Bs(values) => {
                write_list(f, values, |f, v| write_quoted_bytes(f, v.as_ref()))
            }
            AttributeValue::L(values) => write_list(f, values, |f, v| {
                write!(f, "{}", DisplayAttributeValue(v))
            }),
            AttributeValue::M(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                f.write_str("{")?;
                for (idx, key) in keys.into_iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key:?}:{}", DisplayAttributeValue(&map[key]))?;
                }
                f.write_str("}")
            }
            other => write!(f, "unknown attribute {other:?}"),
        }
    }
}

fn write_quoted_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    write!(f, "\"{}\"", bytes.escape_ascii())
}

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    values: &[T],
    mut write_one: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    f.write_str("[")?;
    for (idx, value) in values.iter().enumerate() {
        if idx > 0 {
            f.write_str(",")?;
        }
        write_one(f, value)?;
    }
    f.write_str("]")
}

#[cfg(test)]
mod test {
    use super::*;
    use aws_sdk_dynamodb::primitives::Blob;
    use std::collections::HashMap;

    fn render(av: &AttributeValue) -> String {
        DisplayAttributeValue(av).to_string()
    }

    #[test]
    fn scalars() {
        assert_eq!(render(&AttributeValue::Bool(true)), "true");
        assert_eq!(render(&AttributeValue::Null(true)), "(null)");
        assert_eq!(render(&AttributeValue::S("a\"b".into())), r#""a\"b""#);
        assert_eq!(render(&AttributeValue::N("-12.5".into())), "-12.5");
        assert_eq!(
            render(&AttributeValue::B(Blob::new(vec![b'h', b'i', 0]))),
            r#""hi\x00""#
        );
    }

    #[test]
    fn collections() {
        assert_eq!(
            render(&AttributeValue::Ss(vec!["a".into(), "b".into()])),
            r#"["a","b"]"#
        );
        assert_eq!(
            render(&AttributeValue::Ns(vec!["1".into(), "2".into()])),
            "[1,2]"
        );
        assert_eq!(
            render(&AttributeValue::L(vec![
                AttributeValue::Bool(false),
                AttributeValue::N("3".into())
            ])),
            "[false,3]"
        );
        let mut map = HashMap::new();
        map.insert("z".to_string(), AttributeValue::N("1".into()));
        map.insert("a".to_string(), AttributeValue::S("x".into()));
        assert_eq!(render(&AttributeValue::M(map)), r#"{"a":"x","z":1}"#);
    }

    #[test]
    fn variant_names() {
        assert_eq!(variant_name(&AttributeValue::Bool(true)), "BOOL");
        assert_eq!(variant_name(&AttributeValue::Ss(vec![])), "SS");
        assert_eq!(variant_name(&AttributeValue::M(HashMap::new())), "M");
    }
}
