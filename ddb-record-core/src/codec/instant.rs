/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Codecs for [`time::OffsetDateTime`] as Unix timestamps.
//!
//! Decoded instants are in UTC. Comparison of instants ignores the offset, so a value written with
//! any offset compares equal to what is read back.

use aws_sdk_dynamodb::types::AttributeValue;
use time::OffsetDateTime;

use super::scalar::parse_integer;
use super::{expect_n, Codec};
use crate::error::CodecError;

const TARGET: &str = "instant";

/// Nanoseconds since the Unix epoch, stored as `N`. Only instants within the signed 64-bit
/// nanosecond range (1677-09-21 to 2262-04-11) can be encoded.
pub fn nanoseconds_codec() -> Codec<OffsetDateTime> {
    Codec::new(
        "instant-nanoseconds",
        |t: &OffsetDateTime| {
            let nanos = i64::try_from(t.unix_timestamp_nanos())
                .map_err(|_| CodecError::overflow(t.to_string(), TARGET))?;
            Ok(AttributeValue::N(itoa::Buffer::new().format(nanos).to_owned()))
        },
        |av| {
            let text = expect_n(av)?;
            let nanos = parse_integer::<i64>(text, TARGET)?;
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
                .map_err(|_| CodecError::overflow(text, TARGET))
        },
    )
}

/// Whole seconds since the Unix epoch, stored as `N`. Lossy: the sub-second part is dropped.
pub fn epoch_codec() -> Codec<OffsetDateTime> {
    Codec::new(
        "instant-epoch",
        |t: &OffsetDateTime| {
            Ok(AttributeValue::N(
                itoa::Buffer::new().format(t.unix_timestamp()).to_owned(),
            ))
        },
        |av| {
            let text = expect_n(av)?;
            let seconds = parse_integer::<i64>(text, TARGET)?;
            OffsetDateTime::from_unix_timestamp(seconds)
                .map_err(|_| CodecError::overflow(text, TARGET))
        },
    )
}
