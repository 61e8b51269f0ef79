//! Enum constants as ARM defines them.
//!
//! ARM is loose about casing in responses, so parsing is case-insensitive
//! while serialization always uses the documented value.

/// Declares a string enum with `as_str`, `possible_values`, case-insensitive
/// `FromStr` and serde support.
macro_rules! arm_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $value, )+
                }
            }

            pub fn possible_values() -> &'static [&'static str] {
                &[ $( $value ),+ ]
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::UnknownValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($value) {
                        return Ok(Self::$variant);
                    }
                )+
                Err($crate::error::UnknownValueError {
                    type_name: stringify!($name),
                    value: s.to_string(),
                    possible_values: Self::possible_values(),
                })
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                raw.parse::<Self>().map_err(::serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use arm_enum;
