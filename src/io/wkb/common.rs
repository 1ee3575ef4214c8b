use serde::{Deserialize, Serialize};

use crate::datatypes::{Dimension, GeometryType};
use crate::error::{GeoStreamError, Result};

const EWKB_Z: u32 = 0x8000_0000;
const EWKB_M: u32 = 0x4000_0000;
const EWKB_SRID: u32 = 0x2000_0000;
const EWKB_FLAGS: u32 = EWKB_Z | EWKB_M | EWKB_SRID;

/// Byte order of a WKB geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Endianness {
    BigEndian,
    #[default]
    LittleEndian,
}

impl TryFrom<u8> for Endianness {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            0 => Ok(Endianness::BigEndian),
            1 => Ok(Endianness::LittleEndian),
            other => Err(other),
        }
    }
}

impl From<Endianness> for u8 {
    fn from(value: Endianness) -> Self {
        use Endianness::*;
        match value {
            BigEndian => 0,
            LittleEndian => 1,
        }
    }
}

/// How Z and M are expressed in a WKB type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DimensionEncoding {
    /// ISO 13249: the type code is offset by 1000 (Z), 2000 (M) or 3000 (ZM).
    #[default]
    Iso,
    /// PostGIS extended WKB: the high bits `0x80000000` (Z) and `0x40000000` (M) are set. An
    /// SRID is written after the type code of the outermost geometry.
    Extended,
}

/// Which convention wins when a type code carries both an ISO offset and EWKB flags that
/// disagree, as in `0x80000000 | 2002`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DimensionPrecedence {
    /// Reject the geometry with [GeoStreamError::UnsupportedEncoding].
    #[default]
    Reject,
    Iso,
    Extended,
}

/// The decoded content of a WKB type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WkbType {
    pub geometry_type: GeometryType,
    pub dimension: Dimension,
    /// Whether a 4-byte SRID follows the type code.
    pub has_srid: bool,
}

impl WkbType {
    pub fn decode(code: u32, precedence: DimensionPrecedence) -> Result<Self> {
        let unsupported =
            || GeoStreamError::UnsupportedEncoding(format!("WKB type code {code:#010x}"));

        let flags = code & EWKB_FLAGS;
        let iso_code = code & !EWKB_FLAGS;
        let geometry_type =
            GeometryType::try_from(iso_code % 1000).map_err(|_| unsupported())?;
        let iso_dimension = match iso_code / 1000 {
            0 => None,
            1 => Some(Dimension::XYZ),
            2 => Some(Dimension::XYM),
            3 => Some(Dimension::XYZM),
            _ => return Err(unsupported()),
        };
        let extended_dimension = (flags & (EWKB_Z | EWKB_M) != 0)
            .then(|| Dimension::from_flags(flags & EWKB_Z != 0, flags & EWKB_M != 0));

        let dimension = match (iso_dimension, extended_dimension) {
            (None, None) => Dimension::XY,
            (Some(dim), None) | (None, Some(dim)) => dim,
            (Some(iso), Some(extended)) if iso == extended => iso,
            (Some(iso), Some(extended)) => match precedence {
                DimensionPrecedence::Iso => iso,
                DimensionPrecedence::Extended => extended,
                DimensionPrecedence::Reject => {
                    return Err(GeoStreamError::UnsupportedEncoding(format!(
                        "WKB type code {code:#010x} declares both {iso} and {extended}"
                    )))
                }
            },
        };

        Ok(Self {
            geometry_type,
            dimension,
            has_srid: flags & EWKB_SRID != 0,
        })
    }

    pub fn encode(&self, encoding: DimensionEncoding) -> u32 {
        let base = u32::from(self.geometry_type);
        let mut code = match encoding {
            DimensionEncoding::Iso => {
                let offset = match self.dimension {
                    Dimension::XY => 0,
                    Dimension::XYZ => 1000,
                    Dimension::XYM => 2000,
                    Dimension::XYZM => 3000,
                };
                base + offset
            }
            DimensionEncoding::Extended => {
                let mut code = base;
                if self.dimension.has_z() {
                    code |= EWKB_Z;
                }
                if self.dimension.has_m() {
                    code |= EWKB_M;
                }
                code
            }
        };
        if self.has_srid {
            code |= EWKB_SRID;
        }
        code
    }
}
