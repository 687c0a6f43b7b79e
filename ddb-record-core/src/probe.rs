/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Static capability discovery for field types.
//!
//! The resolver needs to know, for a concrete field type, which codecs are available: is it a
//! scalar, a well-known composite, does it implement one of the marshal pairs, can serde handle
//! it, and does it have a notion of a zero value. [`type_info!`](crate::type_info) answers all of
//! these at compile time and collects the answers into a [`TypeInfo`].

// Implementation Note: capability discovery uses autoderef specialization. Each capability has
// its own probe trait, implemented twice (three times for zero values): once on `&Probe<T>`
// bounded by the capability, and once on `Probe<T>` without bounds. Calling the method through
// `(&&probe)` makes method resolution try the bounded impl first and fall back to the unbounded
// one when the bound does not hold. This only works where `T` is a concrete type, which is why it
// is driven by a macro expanded at the field's declaration.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use time::OffsetDateTime;

use crate::codec::marshal::{
    self, BinaryMarshal, BinaryUnmarshal, DocumentMarshal, DocumentUnmarshal, TextMarshal,
    TextUnmarshal,
};
use crate::codec::scalar::{self, ScalarKind, ScalarValue};
use crate::codec::{Codec, WellKnown, WellKnownValue};

/// A type with a zero value other than (or in the absence of) `Default`.
///
/// Fields annotated `opt` are omitted while they hold their zero value. Types that implement
/// `Default + PartialEq` get a zero value automatically; implementing this trait takes precedence.
pub trait IsZero {
    /// True if this value is the zero value of its type.
    fn is_zero(&self) -> bool;
}

impl<T> IsZero for Option<T> {
    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

/// The zero instant is the Unix epoch.
impl IsZero for OffsetDateTime {
    fn is_zero(&self) -> bool {
        *self == OffsetDateTime::UNIX_EPOCH
    }
}

type DefaultFn<T> = Arc<dyn Fn(&str) -> Option<T> + Send + Sync>;
type ZeroFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// The codecs and zero value notion available for a field type.
///
/// Built by [`type_info!`](crate::type_info).
pub struct TypeInfo<T> {
    pub(crate) type_name: &'static str,
    pub(crate) scalar: Option<(ScalarKind, Codec<T>)>,
    pub(crate) from_default: Option<DefaultFn<T>>,
    pub(crate) well_known: Option<WellKnown<T>>,
    pub(crate) text: Option<Codec<T>>,
    pub(crate) document: Option<Codec<T>>,
    pub(crate) binary: Option<Codec<T>>,
    pub(crate) structural: Option<Codec<T>>,
    pub(crate) zero: Option<ZeroFn<T>>,
}

impl<T: 'static> TypeInfo<T> {
    #[doc(hidden)]
    #[allow(clippy::too_many_arguments)]
    pub fn __from_probes(
        scalar: Option<(ScalarKind, Codec<T>, fn(&str) -> Option<T>)>,
        well_known: Option<WellKnown<T>>,
        text: Option<Codec<T>>,
        document: Option<Codec<T>>,
        binary: Option<Codec<T>>,
        structural: Option<Codec<T>>,
        zero: Option<fn(&T) -> bool>,
    ) -> Self {
        let (scalar, from_default) = match scalar {
            Some((kind, codec, from_default)) => (
                Some((kind, codec)),
                Some(Arc::new(from_default) as DefaultFn<T>),
            ),
            None => (None, None),
        };
        Self {
            type_name: type_name::<T>(),
            scalar,
            from_default,
            well_known,
            text,
            document,
            binary,
            structural,
            zero: zero.map(|f| Arc::new(f) as ZeroFn<T>),
        }
    }

    /// Lifts this description to `Option<T>`.
    ///
    /// Every codec is lifted with [`Codec::optional`], and `None` becomes the zero value.
    pub fn optional(self) -> TypeInfo<Option<T>> {
        TypeInfo {
            type_name: type_name::<Option<T>>(),
            scalar: self
                .scalar
                .map(|(kind, codec)| (kind, codec.optional())),
            from_default: self.from_default.map(|from_default| {
                Arc::new(move |value: &str| from_default(value).map(Some)) as DefaultFn<Option<T>>
            }),
            well_known: self.well_known.map(|well_known| WellKnown {
                autodetect: well_known.autodetect.map(Codec::optional),
                nanoseconds: well_known.nanoseconds.optional(),
                seconds: well_known.seconds.optional(),
            }),
            text: self.text.map(Codec::optional),
            document: self.document.map(Codec::optional),
            binary: self.binary.map(Codec::optional),
            structural: self.structural.map(Codec::optional),
            zero: Some(Arc::new(Option::<T>::is_none) as ZeroFn<Option<T>>),
        }
    }

    /// The name of the described type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The scalar family of the type, if it is a built-in scalar.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        self.scalar.as_ref().map(|(kind, _)| *kind)
    }

    /// True if values of the type can be tested for zero.
    pub fn has_zero(&self) -> bool {
        self.zero.is_some()
    }
}

impl<T> fmt::Debug for TypeInfo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("type_name", &self.type_name)
            .field("scalar", &self.scalar.as_ref().map(|(kind, _)| kind))
            .field("well_known", &self.well_known.is_some())
            .field("text", &self.text.is_some())
            .field("document", &self.document.is_some())
            .field("binary", &self.binary.is_some())
            .field("structural", &self.structural.is_some())
            .field("zero", &self.zero.is_some())
            .finish()
    }
}

#[doc(hidden)]
pub struct Probe<T>(PhantomData<fn() -> T>);

impl<T> Probe<T> {
    #[doc(hidden)]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Probe(PhantomData)
    }
}

impl<T> fmt::Debug for Probe<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Probe<{}>", type_name::<T>())
    }
}

#[doc(hidden)]
pub trait ScalarProbe {
    type Value;
    #[allow(clippy::type_complexity)]
    fn scalar(
        &self,
    ) -> Option<(
        ScalarKind,
        Codec<Self::Value>,
        fn(&str) -> Option<Self::Value>,
    )>;
}

impl<T: ScalarValue> ScalarProbe for &Probe<T> {
    type Value = T;
    fn scalar(&self) -> Option<(ScalarKind, Codec<T>, fn(&str) -> Option<T>)> {
        let from_default: fn(&str) -> Option<T> = T::from_default;
        Some((T::KIND, scalar::codec::<T>(), from_default))
    }
}

impl<T> ScalarProbe for Probe<T> {
    type Value = T;
    fn scalar(&self) -> Option<(ScalarKind, Codec<T>, fn(&str) -> Option<T>)> {
        None
    }
}

#[doc(hidden)]
pub trait WellKnownProbe {
    type Value;
    fn well_known(&self) -> Option<WellKnown<Self::Value>>;
}

impl<T: WellKnownValue> WellKnownProbe for &Probe<T> {
    type Value = T;
    fn well_known(&self) -> Option<WellKnown<T>> {
        Some(T::well_known())
    }
}

impl<T> WellKnownProbe for Probe<T> {
    type Value = T;
    fn well_known(&self) -> Option<WellKnown<T>> {
        None
    }
}

#[doc(hidden)]
pub trait TextProbe {
    type Value;
    fn text(&self) -> Option<Codec<Self::Value>>;
}

impl<T: TextMarshal + TextUnmarshal + 'static> TextProbe for &Probe<T> {
    type Value = T;
    fn text(&self) -> Option<Codec<T>> {
        Some(marshal::text_codec::<T>())
    }
}

impl<T> TextProbe for Probe<T> {
    type Value = T;
    fn text(&self) -> Option<Codec<T>> {
        None
    }
}

#[doc(hidden)]
pub trait DocumentProbe {
    type Value;
    fn document(&self) -> Option<Codec<Self::Value>>;
}

impl<T: DocumentMarshal + DocumentUnmarshal + 'static> DocumentProbe for &Probe<T> {
    type Value = T;
    fn document(&self) -> Option<Codec<T>> {
        Some(marshal::document_codec::<T>())
    }
}

impl<T> DocumentProbe for Probe<T> {
    type Value = T;
    fn document(&self) -> Option<Codec<T>> {
        None
    }
}

#[doc(hidden)]
pub trait BinaryProbe {
    type Value;
    fn binary(&self) -> Option<Codec<Self::Value>>;
}

impl<T: BinaryMarshal + BinaryUnmarshal + 'static> BinaryProbe for &Probe<T> {
    type Value = T;
    fn binary(&self) -> Option<Codec<T>> {
        Some(marshal::binary_codec::<T>())
    }
}

impl<T> BinaryProbe for Probe<T> {
    type Value = T;
    fn binary(&self) -> Option<Codec<T>> {
        None
    }
}

#[doc(hidden)]
pub trait StructuralProbe {
    type Value;
    fn structural(&self) -> Option<Codec<Self::Value>>;
}

impl<T: Serialize + DeserializeOwned + 'static> StructuralProbe for &Probe<T> {
    type Value = T;
    fn structural(&self) -> Option<Codec<T>> {
        Some(marshal::structural_codec::<T>())
    }
}

impl<T> StructuralProbe for Probe<T> {
    type Value = T;
    fn structural(&self) -> Option<Codec<T>> {
        None
    }
}

#[doc(hidden)]
pub trait ZeroProbe {
    type Value;
    fn zero(&self) -> Option<fn(&Self::Value) -> bool>;
}

impl<T: IsZero> ZeroProbe for &&Probe<T> {
    type Value = T;
    fn zero(&self) -> Option<fn(&T) -> bool> {
        let zero: fn(&T) -> bool = T::is_zero;
        Some(zero)
    }
}

impl<T: Default + PartialEq> ZeroProbe for &Probe<T> {
    type Value = T;
    fn zero(&self) -> Option<fn(&T) -> bool> {
        let zero: fn(&T) -> bool = |value| *value == T::default();
        Some(zero)
    }
}

impl<T> ZeroProbe for Probe<T> {
    type Value = T;
    fn zero(&self) -> Option<fn(&T) -> bool> {
        None
    }
}

/// Builds the [`TypeInfo`] of a concrete type.
///
/// ```
/// use ddb_record_core::type_info;
///
/// let info = type_info!(u16);
/// assert!(info.scalar_kind().is_some());
/// assert!(info.has_zero());
/// ```
#[macro_export]
macro_rules! type_info {
    ($ty:ty) => {{
        #[allow(unused_imports)]
        use $crate::probe::{
            BinaryProbe as _, DocumentProbe as _, ScalarProbe as _, StructuralProbe as _,
            TextProbe as _, WellKnownProbe as _, ZeroProbe as _,
        };
        let probe = $crate::probe::Probe::<$ty>::new();
        $crate::probe::TypeInfo::<$ty>::__from_probes(
            (&&probe).scalar(),
            (&&probe).well_known(),
            (&&probe).text(),
            (&&probe).document(),
            (&&probe).binary(),
            (&&probe).structural(),
            (&&&probe).zero(),
        )
    }};
}
