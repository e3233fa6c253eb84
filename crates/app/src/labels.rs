//! Text-backed enums.
//!
//! Several columns store a closed set of lowercase (or capitalised) labels. The
//! [`labelled_enum!`] macro generates the enum plus its label conversions so the
//! repositories and the HTTP layer agree on a single spelling.

use std::str::FromStr;

use sqlx::{Row, postgres::PgRow};
use thiserror::Error;

/// Raised when a stored or submitted label is not part of the enum.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} \"{value}\"")]
pub struct UnknownLabel {
    /// Human-readable name of the enum.
    pub kind: &'static str,

    /// Rejected input.
    pub value: String,
}

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($kind:literal) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $label:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stored label for this variant.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::labels::UnknownLabel;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let trimmed = value.trim();

                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| $crate::labels::UnknownLabel {
                        kind: $kind,
                        value: value.to_owned(),
                    })
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use labelled_enum;

/// Read a text column into a labelled enum, reporting unknown labels as
/// column decode errors.
pub(crate) fn decode_label<T>(row: &PgRow, column: &str) -> sqlx::Result<T>
where
    T: FromStr<Err = UnknownLabel>,
{
    row.try_get::<String, _>(column)?
        .parse()
        .map_err(|error: UnknownLabel| sqlx::Error::ColumnDecode {
            index: column.to_owned(),
            source: Box::new(error),
        })
}
