use std::collections::HashMap;

use crate::error::ParseError;
use crate::segment::{Segment, SegmentKind};

/// Matches raw ARM URIs against an ordered segment specification.
///
/// Segment counts are fixed per resource type, so matching is a single
/// left-to-right pass. The only variable-length piece is an optional scope
/// segment, which must sit at the start or the end of the specification.
#[derive(Debug, Clone)]
pub struct Parser {
    id_type: &'static str,
    segments: Vec<Segment>,
}

/// Segment name to matched value, plus the input it came from and the
/// template it was matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub id_type: &'static str,
    pub raw_input: String,
    pub parsed: HashMap<&'static str, String>,
    pub expected_format: String,
    pub example: String,
}

impl ParseResult {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parsed.get(name).map(String::as_str)
    }

    /// Like `get`, but a missing or empty value is an error naming the segment.
    pub fn require(&self, name: &str) -> Result<&str, ParseError> {
        match self.get(name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ParseError::SegmentNotSpecified {
                id_type: self.id_type.to_string(),
                input: self.raw_input.clone(),
                segment: name.to_string(),
                expected_format: self.expected_format.clone(),
                example: self.example.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopePosition {
    None,
    Leading,
    Trailing,
}

impl Parser {
    pub fn new(id_type: &'static str, segments: Vec<Segment>) -> Self {
        Self { id_type, segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Template such as `/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}`.
    pub fn expected_format(&self) -> String {
        self.render(|segment| segment.to_string())
    }

    /// The template filled with example values.
    pub fn example(&self) -> String {
        self.render(Segment::example_value)
    }

    fn render(&self, value: impl Fn(&Segment) -> String) -> String {
        let mut out = String::new();
        for (index, segment) in self.segments.iter().enumerate() {
            let value = value(segment);
            if segment.kind == SegmentKind::Scope {
                if index > 0 {
                    out.push('/');
                }
                out.push_str(value.trim_start_matches('/'));
                if index == 0 && !out.starts_with('/') && !out.starts_with('{') {
                    out.insert(0, '/');
                }
            } else {
                out.push('/');
                out.push_str(&value);
            }
        }
        out
    }

    fn scope_position(&self) -> Result<ScopePosition, ParseError> {
        let scopes: Vec<usize> = self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind == SegmentKind::Scope)
            .map(|(i, _)| i)
            .collect();

        match scopes.as_slice() {
            [] => Ok(ScopePosition::None),
            [0] => Ok(ScopePosition::Leading),
            [i] if *i == self.segments.len() - 1 => Ok(ScopePosition::Trailing),
            [_] => Err(self.invalid_spec("a scope segment must be the first or last segment")),
            _ => Err(self.invalid_spec("at most one scope segment is supported")),
        }
    }

    fn invalid_spec(&self, reason: &str) -> ParseError {
        ParseError::InvalidSpecification {
            id_type: self.id_type.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Parse `input`. With `insensitively` set, literal segments match in any
    /// casing and are normalised back to the template's casing; user-supplied
    /// values are returned exactly as given.
    pub fn parse(&self, input: &str, insensitively: bool) -> Result<ParseResult, ParseError> {
        if self.segments.is_empty() {
            return Err(self.invalid_spec("no segments were defined"));
        }
        let scope_position = self.scope_position()?;

        if input.trim().is_empty() {
            return Err(ParseError::Empty {
                id_type: self.id_type.to_string(),
            });
        }

        let trimmed = input.strip_prefix('/').unwrap_or(input);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let components: Vec<&str> = trimmed.split('/').collect();
        if let Some(position) = components.iter().position(|c| c.is_empty()) {
            return Err(ParseError::EmptySegment {
                id_type: self.id_type.to_string(),
                input: input.to_string(),
                position,
            });
        }

        let mut parsed = HashMap::with_capacity(self.segments.len());

        let (fixed_segments, fixed_components, fixed_offset) = match scope_position {
            ScopePosition::None => {
                self.check_count(input, &components)?;
                (&self.segments[..], &components[..], 0)
            }
            ScopePosition::Leading => {
                let fixed = self.segments.len() - 1;
                if components.len() < fixed + 1 {
                    return Err(self.not_specified(input, &self.segments[0]));
                }
                let split = components.len() - fixed;
                parsed.insert(
                    self.segments[0].name,
                    format!("/{}", components[..split].join("/")),
                );
                (&self.segments[1..], &components[split..], split)
            }
            ScopePosition::Trailing => {
                let fixed = self.segments.len() - 1;
                if components.len() < fixed + 1 {
                    return Err(self.not_specified(input, &self.segments[components.len()]));
                }
                let scope = &self.segments[fixed];
                parsed.insert(scope.name, format!("/{}", components[fixed..].join("/")));
                (&self.segments[..fixed], &components[..fixed], 0)
            }
        };

        for (index, (segment, component)) in
            fixed_segments.iter().zip(fixed_components).enumerate()
        {
            let value = self.match_segment(
                input,
                fixed_offset + index,
                segment,
                component,
                insensitively,
            )?;
            parsed.insert(segment.name, value);
        }

        Ok(ParseResult {
            id_type: self.id_type,
            raw_input: input.to_string(),
            parsed,
            expected_format: self.expected_format(),
            example: self.example(),
        })
    }

    fn check_count(&self, input: &str, components: &[&str]) -> Result<(), ParseError> {
        let expected = self.segments.len();
        if components.len() < expected {
            return Err(self.not_specified(input, &self.segments[components.len()]));
        }
        if components.len() > expected {
            return Err(ParseError::UnexpectedSegments {
                id_type: self.id_type.to_string(),
                input: input.to_string(),
                extra: components[expected..].join("/"),
                expected_format: self.expected_format(),
            });
        }
        Ok(())
    }

    fn match_segment(
        &self,
        input: &str,
        position: usize,
        segment: &Segment,
        component: &str,
        insensitively: bool,
    ) -> Result<String, ParseError> {
        let matches = |candidate: &str| {
            if insensitively {
                candidate.eq_ignore_ascii_case(component)
            } else {
                candidate == component
            }
        };

        let value = match segment.kind {
            SegmentKind::Static | SegmentKind::ResourceProvider => segment
                .fixed_value
                .filter(|fixed| matches(*fixed))
                .map(str::to_string),
            SegmentKind::Constant => segment
                .possible_values
                .iter()
                .find(|candidate| matches(**candidate))
                .map(|v| v.to_string()),
            SegmentKind::SubscriptionId
            | SegmentKind::ResourceGroup
            | SegmentKind::UserSpecified
            | SegmentKind::Scope => Some(component.to_string()),
        };

        value.ok_or_else(|| ParseError::SegmentMismatch {
            id_type: self.id_type.to_string(),
            input: input.to_string(),
            position,
            segment: segment.name.to_string(),
            expected: segment.expectation(),
            value: component.to_string(),
            expected_format: self.expected_format(),
            example: self.example(),
        })
    }

    fn not_specified(&self, input: &str, segment: &Segment) -> ParseError {
        ParseError::SegmentNotSpecified {
            id_type: self.id_type.to_string(),
            input: input.to_string(),
            segment: segment.name.to_string(),
            expected_format: self.expected_format(),
            example: self.example(),
        }
    }
}
