use serde::Deserialize;
use std::fmt;

/// A native integer (or name) that does not map onto any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCode {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownCode {
    pub(crate) fn new(kind: &'static str, value: impl fmt::Display) -> Self {
        Self { kind, value: value.to_string() }
    }
}

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownCode {}

/// Wire shape accepted when deserializing coded enums: the native integer, or a name
/// (config files and environment variables deliver numbers as strings too).
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum CodeOrName {
    Code(i64),
    Name(String),
}

/// Declares a fieldless enum whose discriminants are the native SDK codes.
///
/// Generates `code()`, `TryFrom<i64>`, `FromStr` (via strum, case-insensitive, aliases),
/// an exact `from_name`, integer `Serialize` and code-or-name `Deserialize`.
macro_rules! native_code {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident as $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            strum::EnumIter, strum::EnumString, strum::IntoStaticStr,
        )]
        #[strum(ascii_case_insensitive)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $code ),+
        }

        impl $name {
            /// The integer the native SDK uses for this value.
            #[must_use]
            pub const fn code(self) -> i64 {
                self as i64
            }

            /// The canonical name.
            #[must_use]
            pub fn name(self) -> &'static str {
                self.into()
            }

            /// Looks up a value by its canonical name only; no aliases, case-sensitive.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                use strum::IntoEnumIterator;
                Self::iter().find(|value| value.name() == name)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = $crate::code::UnknownCode;

            fn try_from(code: i64) -> Result<Self, Self::Error> {
                match code {
                    $( $code => Ok(Self::$variant), )+
                    _ => Err($crate::code::UnknownCode::new($kind, code)),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_i64(self.code())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = match $crate::code::CodeOrName::deserialize(deserializer)? {
                    $crate::code::CodeOrName::Code(code) => code,
                    $crate::code::CodeOrName::Name(name) => match name.trim().parse::<i64>() {
                        Ok(code) => code,
                        Err(_) => {
                            return name.trim().parse::<Self>().map_err(|_| {
                                serde::de::Error::custom($crate::code::UnknownCode::new($kind, name))
                            });
                        },
                    },
                };
                Self::try_from(code).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use native_code;
