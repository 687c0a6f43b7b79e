/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Codec selection for a single field.

use std::fmt;

use crate::codec::scalar::ScalarKind;
use crate::codec::Codec;
use crate::error::RegistrationError;
use crate::probe::TypeInfo;
use crate::tag::{EncodingKind, FieldTag};

/// The codec chosen for a field, and the explicit encoding it was chosen for.
pub(crate) struct Resolution<T> {
    pub(crate) codec: Codec<T>,
    pub(crate) encoding: Option<EncodingKind>,
}

impl<T> fmt::Debug for Resolution<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("codec", &self.codec)
            .field("encoding", &self.encoding)
            .finish()
    }
}

/// Selects the codec of the field declared as `field`.
///
/// Without `t=`, the first available of scalar, well-known, text pair, document pair and binary
/// pair wins. With `t=`, only the codecs compatible with that encoding are considered.
pub(crate) fn resolve<T: 'static>(
    field: &str,
    tag: &FieldTag,
    info: &TypeInfo<T>,
) -> Result<Resolution<T>, RegistrationError> {
    if tag.is_partition_key() && tag.is_sort_key() {
        return Err(RegistrationError::configuration(
            field,
            "a field cannot be both the partition key and the sort key",
        ));
    }

    let Some(literal) = tag.encoding() else {
        return autodetect(info)
            .map(|codec| Resolution {
                codec,
                encoding: None,
            })
            .ok_or_else(|| RegistrationError::unsupported_type(field, info.type_name, None));
    };

    let encoding: EncodingKind = literal
        .parse()
        .map_err(|_| RegistrationError::unknown_encoding_kind(field, literal))?;
    let codec = match encoding {
        EncodingKind::String => match &info.scalar {
            Some((ScalarKind::String, codec)) => Some(codec.clone()),
            _ => info.text.clone(),
        },
        EncodingKind::Binary => match &info.scalar {
            Some((ScalarKind::Bytes, codec)) => Some(codec.clone()),
            _ => info.binary.clone(),
        },
        EncodingKind::Json => info.document.clone().or_else(|| info.structural.clone()),
        EncodingKind::Nanoseconds => info.well_known.as_ref().map(|wk| wk.nanoseconds.clone()),
        EncodingKind::Seconds => info.well_known.as_ref().map(|wk| wk.seconds.clone()),
    };
    codec
        .map(|codec| Resolution {
            codec,
            encoding: Some(encoding),
        })
        .ok_or_else(|| RegistrationError::unsupported_type(field, info.type_name, Some(encoding)))
}

fn autodetect<T>(info: &TypeInfo<T>) -> Option<Codec<T>> {
    if let Some((_, codec)) = &info.scalar {
        return Some(codec.clone());
    }
    if let Some(codec) = info
        .well_known
        .as_ref()
        .and_then(|wk| wk.autodetect.clone())
    {
        return Some(codec);
    }
    info.text
        .clone()
        .or_else(|| info.document.clone())
        .or_else(|| info.binary.clone())
}
