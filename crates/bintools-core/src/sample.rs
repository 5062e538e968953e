use serde::{Deserialize, Serialize};
use std::fmt;

mod sealed {
    pub trait Sealed {}
}

/// Element kinds a [`Grid`](crate::Grid) may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    U8,
    U16,
    I16,
    I32,
    F32,
    F64,
}

/// Scalar sample type. Sealed: the set of kinds is closed and fixed at
/// compile time, see [`SampleKind`].
pub trait Sample:
    Copy + PartialOrd + fmt::Debug + Send + Sync + sealed::Sealed + 'static
{
    const KIND: SampleKind;

    /// Widen to `f64` for histogramming and statistics.
    fn to_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Sample for $ty {
                const KIND: SampleKind = SampleKind::$kind;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_sample! {
    u8 => U8,
    u16 => U16,
    i16 => I16,
    i32 => I32,
    f32 => F32,
    f64 => F64,
}
