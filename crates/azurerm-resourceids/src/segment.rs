use std::fmt;

const EXAMPLE_SUBSCRIPTION_ID: &str = "12345678-1234-9876-4563-123456789012";
const EXAMPLE_RESOURCE_GROUP: &str = "example-resource-group";
const EXAMPLE_SCOPE: &str =
    "/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/some-resource-group";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Fixed literal such as `subscriptions` or `configurationStores`.
    Static,
    SubscriptionId,
    ResourceGroup,
    /// Fixed provider namespace, e.g. `Microsoft.KeyVault`.
    ResourceProvider,
    UserSpecified,
    /// One of a closed set of values.
    Constant,
    /// Arbitrary-length prefix or suffix, e.g. the target of a lock.
    Scope,
}

/// One named component of a resource ID template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: &'static str,
    pub kind: SegmentKind,
    pub fixed_value: Option<&'static str>,
    pub possible_values: &'static [&'static str],
}

impl Segment {
    pub fn static_segment(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            kind: SegmentKind::Static,
            fixed_value: Some(value),
            possible_values: &[],
        }
    }

    pub fn subscription_id(name: &'static str) -> Self {
        Self::placeholder(name, SegmentKind::SubscriptionId)
    }

    pub fn resource_group(name: &'static str) -> Self {
        Self::placeholder(name, SegmentKind::ResourceGroup)
    }

    pub fn resource_provider(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            kind: SegmentKind::ResourceProvider,
            fixed_value: Some(value),
            possible_values: &[],
        }
    }

    pub fn user_specified(name: &'static str) -> Self {
        Self::placeholder(name, SegmentKind::UserSpecified)
    }

    pub fn constant(name: &'static str, possible_values: &'static [&'static str]) -> Self {
        Self {
            name,
            kind: SegmentKind::Constant,
            fixed_value: None,
            possible_values,
        }
    }

    pub fn scope(name: &'static str) -> Self {
        Self::placeholder(name, SegmentKind::Scope)
    }

    fn placeholder(name: &'static str, kind: SegmentKind) -> Self {
        Self {
            name,
            kind,
            fixed_value: None,
            possible_values: &[],
        }
    }

    /// Whether this segment carries a value the caller supplies (as opposed
    /// to a literal that is part of the template).
    pub fn is_user_value(&self) -> bool {
        !matches!(self.kind, SegmentKind::Static | SegmentKind::ResourceProvider)
    }

    /// A plausible value, used when rendering example IDs in error messages.
    pub fn example_value(&self) -> String {
        match self.kind {
            SegmentKind::Static | SegmentKind::ResourceProvider => {
                self.fixed_value.unwrap_or_default().to_string()
            }
            SegmentKind::SubscriptionId => EXAMPLE_SUBSCRIPTION_ID.to_string(),
            SegmentKind::ResourceGroup => EXAMPLE_RESOURCE_GROUP.to_string(),
            SegmentKind::UserSpecified => format!("{}Value", self.name),
            SegmentKind::Constant => self
                .possible_values
                .first()
                .map(|v| v.to_string())
                .unwrap_or_default(),
            SegmentKind::Scope => EXAMPLE_SCOPE.to_string(),
        }
    }

    /// Description of what this segment accepts, used in mismatch errors.
    pub(crate) fn expectation(&self) -> String {
        match self.kind {
            SegmentKind::Static | SegmentKind::ResourceProvider => {
                format!("the literal {:?}", self.fixed_value.unwrap_or_default())
            }
            SegmentKind::Constant => format!("one of {:?}", self.possible_values),
            _ => "a non-empty value".to_string(),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fixed_value {
            Some(value) => f.write_str(value),
            None => write!(f, "{{{}}}", self.name),
        }
    }
}
