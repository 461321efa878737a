use std::fmt;
use std::str::FromStr;

use rsp_core::{ErrorInfo, RspError, MAX_FIXED_ORDER};
use serde::{Deserialize, Serialize};

const PREFIX: &str = "ResponseMatrixO";
const STREAM: &str = "Stream";

/// Value of the `Type` record, selecting the matrix family and body encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "kebab-case")]
pub enum TypeTag {
    /// `ResponseMatrixO{order}` or `ResponseMatrixO{order}Stream`.
    Fixed {
        /// Number of axes, 1 to 17.
        order: usize,
        /// Whether values follow as a binary stream.
        stream: bool,
    },
    /// `ResponseMatrixON`, `ResponseMatrixONStream` or `ResponseMatrixONSparse`.
    General {
        /// Whether values follow as a binary stream.
        stream: bool,
    },
}

impl TypeTag {
    /// Tag of a fixed-order matrix; fails outside orders 1 to 17.
    pub fn fixed(order: usize, stream: bool) -> Result<Self, RspError> {
        if order == 0 || order > MAX_FIXED_ORDER {
            return Err(RspError::Io(
                ErrorInfo::new("unknown-type", "fixed-order matrices support orders 1 to 17")
                    .with_context("order", order.to_string()),
            ));
        }
        Ok(TypeTag::Fixed { order, stream })
    }

    /// Tag of a general matrix.
    pub fn general(stream: bool) -> Self {
        TypeTag::General { stream }
    }

    /// Whether the body is a binary stream.
    pub fn is_stream(self) -> bool {
        match self {
            TypeTag::Fixed { stream, .. } | TypeTag::General { stream } => stream,
        }
    }

    /// Order of a fixed-order tag.
    pub fn fixed_order(self) -> Option<usize> {
        match self {
            TypeTag::Fixed { order, .. } => Some(order),
            TypeTag::General { .. } => None,
        }
    }

    /// Same family with the given body encoding.
    pub fn with_stream(self, stream: bool) -> Self {
        match self {
            TypeTag::Fixed { order, .. } => TypeTag::Fixed { order, stream },
            TypeTag::General { .. } => TypeTag::General { stream },
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Fixed { order, .. } => write!(f, "{PREFIX}{order}")?,
            TypeTag::General { .. } => write!(f, "{PREFIX}N")?,
        }
        if self.is_stream() {
            f.write_str(STREAM)?;
        }
        Ok(())
    }
}

impl FromStr for TypeTag {
    type Err = RspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || {
            RspError::Io(
                ErrorInfo::new("unknown-type", "unrecognized matrix type tag")
                    .with_context("value", s)
                    .with_hint("expected ResponseMatrixO1..ResponseMatrixO17 or ResponseMatrixON, optionally with a Stream suffix"),
            )
        };
        let body = s.strip_prefix(PREFIX).ok_or_else(unknown)?;
        let (body, stream) = match body.strip_suffix(STREAM) {
            Some(body) => (body, true),
            None => (body, false),
        };
        match body {
            "N" => Ok(TypeTag::General { stream }),
            "NSparse" if !stream => Ok(TypeTag::General { stream: false }),
            digits if !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit()) => {
                let order: usize = digits.parse().map_err(|_| unknown())?;
                TypeTag::fixed(order, stream).map_err(|_| unknown())
            }
            _ => Err(unknown()),
        }
    }
}
