use crate::error::ParseError;
use crate::parser::{ParseResult, Parser};
use crate::segment::Segment;

/// A typed ARM resource ID.
///
/// Implementations are normally produced by [`resource_id!`](crate::resource_id),
/// which derives everything from the segment template and the field list.
pub trait ResourceId: Sized {
    /// Human readable name of the resource type, e.g. "Configuration Store".
    const ID_TYPE: &'static str;

    /// The ordered segment template for this ID type.
    fn segments() -> Vec<Segment>;

    fn from_parse_result(result: &ParseResult) -> Result<Self, ParseError>;

    /// Value of a user-supplied segment by segment name.
    fn segment_value(&self, name: &str) -> Option<&str>;

    /// The canonical ARM URI for this ID.
    fn id(&self) -> String {
        let mut out = String::new();
        for segment in Self::segments() {
            let value = if segment.is_user_value() {
                self.segment_value(segment.name).unwrap_or_default()
            } else {
                segment.fixed_value.unwrap_or_default()
            };
            out.push('/');
            out.push_str(value.trim_start_matches('/'));
        }
        out
    }

    fn parser() -> Parser {
        Parser::new(Self::ID_TYPE, Self::segments())
    }
}

/// Parse user input, matching literal segments exactly.
pub fn parse_id<T: ResourceId>(input: &str) -> Result<T, ParseError> {
    let result = T::parser().parse(input, false)?;
    T::from_parse_result(&result)
}

/// Parse an ID returned by the API, tolerating any casing of literal segments.
pub fn parse_id_insensitively<T: ResourceId>(input: &str) -> Result<T, ParseError> {
    let result = T::parser().parse(input, true)?;
    T::from_parse_result(&result)
}

/// Schema validation helper: checks that `input` is a valid ID of type `T`,
/// naming the attribute `key` in the error.
pub fn validate_id<T: ResourceId>(input: &str, key: &str) -> Result<(), String> {
    parse_id::<T>(input)
        .map(|_| ())
        .map_err(|e| format!("parsing {key:?}: {e}"))
}

/// Declares a typed resource ID.
///
/// ```
/// azurerm_resourceids::resource_id! {
///     /// A Widget.
///     pub struct WidgetId("Widget") {
///         segments: [
///             static_segment("staticSubscriptions", "subscriptions"),
///             subscription_id("subscriptionId"),
///             static_segment("staticWidgets", "widgets"),
///             user_specified("widgetName"),
///         ],
///         fields: {
///             subscription_id: "subscriptionId" => "Subscription",
///             widget_name: "widgetName" => "Widget Name",
///         },
///     }
/// }
///
/// let id = WidgetId::new("sub", "w1");
/// assert_eq!(id.id(), "/subscriptions/sub/widgets/w1");
/// assert_eq!(WidgetId::parse(&id.id()).unwrap(), id);
/// ```
#[macro_export]
macro_rules! resource_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident ($id_type:literal) {
            segments: [ $( $ctor:ident ( $($arg:expr),+ ) ),+ $(,)? ],
            fields: { $( $field:ident : $seg:literal => $label:literal ),+ $(,)? } $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name {
            $( pub $field: String, )+
        }

        impl $name {
            #[allow(clippy::too_many_arguments)]
            pub fn new($( $field: impl Into<String> ),+) -> Self {
                Self { $( $field: $field.into(), )+ }
            }

            pub fn parse(input: &str) -> Result<Self, $crate::ParseError> {
                $crate::parse_id(input)
            }

            pub fn parse_insensitively(input: &str) -> Result<Self, $crate::ParseError> {
                $crate::parse_id_insensitively(input)
            }

            pub fn id(&self) -> String {
                <Self as $crate::ResourceId>::id(self)
            }

            pub fn segments() -> Vec<$crate::Segment> {
                <Self as $crate::ResourceId>::segments()
            }

            /// Validation function for schema attributes holding this ID.
            pub fn validate(input: &str, key: &str) -> Result<(), String> {
                $crate::validate_id::<Self>(input, key)
            }
        }

        impl $crate::ResourceId for $name {
            const ID_TYPE: &'static str = $id_type;

            fn segments() -> Vec<$crate::Segment> {
                vec![ $( $crate::Segment::$ctor( $($arg),+ ) ),+ ]
            }

            fn from_parse_result(
                result: &$crate::ParseResult,
            ) -> Result<Self, $crate::ParseError> {
                Ok(Self {
                    $( $field: result.require($seg)?.to_string(), )+
                })
            }

            fn segment_value(&self, name: &str) -> Option<&str> {
                match name {
                    $( $seg => Some(self.$field.as_str()), )+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let components: Vec<String> = vec![
                    $( format!("{}: {:?}", $label, self.$field) ),+
                ];
                write!(f, "{} ({})", $id_type, components.join(" / "))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                serializer.serialize_str(&self.id())
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let raw = <String as $crate::__private::serde::Deserialize>::deserialize(deserializer)?;
                Self::parse_insensitively(&raw)
                    .map_err(<D::Error as $crate::__private::serde::de::Error>::custom)
            }
        }
    };
}
