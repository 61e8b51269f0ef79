use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("parsing {id_type} ID: the input was empty")]
    Empty { id_type: String },

    #[error(
        "parsing {id_type} ID {input:?}: the segment {segment:?} was not specified\n\n\
         Expected a {id_type} ID that matched:\n\n> {expected_format}\n\n\
         for example: {example}"
    )]
    SegmentNotSpecified {
        id_type: String,
        input: String,
        segment: String,
        expected_format: String,
        example: String,
    },

    #[error(
        "parsing {id_type} ID {input:?}: the segment at position {position} didn't match\n\n\
         Expected segment {segment:?} to be {expected}, but got {value:?}\n\n\
         Expected a {id_type} ID that matched:\n\n> {expected_format}\n\n\
         for example: {example}"
    )]
    SegmentMismatch {
        id_type: String,
        input: String,
        position: usize,
        segment: String,
        expected: String,
        value: String,
        expected_format: String,
        example: String,
    },

    #[error(
        "parsing {id_type} ID {input:?}: unexpected trailing segments {extra:?}\n\n\
         Expected a {id_type} ID that matched:\n\n> {expected_format}"
    )]
    UnexpectedSegments {
        id_type: String,
        input: String,
        extra: String,
        expected_format: String,
    },

    #[error("parsing {id_type} ID {input:?}: the ID contains an empty segment at position {position}")]
    EmptySegment {
        id_type: String,
        input: String,
        position: usize,
    },

    #[error("invalid segment specification for {id_type}: {reason}")]
    InvalidSpecification { id_type: String, reason: String },
}

impl ParseError {
    /// Name of the segment this error is about, if any.
    pub fn segment(&self) -> Option<&str> {
        match self {
            Self::SegmentNotSpecified { segment, .. } | Self::SegmentMismatch { segment, .. } => {
                Some(segment)
            }
            _ => None,
        }
    }
}
