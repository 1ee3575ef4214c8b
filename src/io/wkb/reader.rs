use std::io::Cursor;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::datatypes::{Dimension, GeometryType};
use crate::driver::{push_feature, FeatureSource};
use crate::error::{GeoStreamError, Result};
use crate::handler::{Continuation, GeometryMeta, Handler, HandlerResult, VectorMeta};
use crate::io::wkb::common::{DimensionPrecedence, Endianness, WkbType};
use crate::propagate;

/// The smallest encoding of a nested geometry: byte order and type code.
const MIN_GEOMETRY_BYTES: u64 = 5;

/// Options for [WkbReader].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WkbReaderOptions {
    /// The maximum nesting depth of geometry collections and multi geometries.
    pub max_depth: usize,

    pub dimension_precedence: DimensionPrecedence,
}

impl Default for WkbReaderOptions {
    fn default() -> Self {
        Self {
            max_depth: 128,
            dimension_precedence: Default::default(),
        }
    }
}

/// Reads a vector of WKB (ISO or extended) buffers, where `None` is a null feature.
///
/// Each nested geometry carries its own byte order marker.
#[derive(Debug)]
pub struct WkbReader<I> {
    iter: I,
    options: WkbReaderOptions,
}

impl<I, B> WkbReader<I>
where
    I: Iterator<Item = Option<B>>,
    B: AsRef<[u8]>,
{
    pub fn new(input: impl IntoIterator<IntoIter = I>) -> Self {
        Self::new_with_options(input, Default::default())
    }

    pub fn new_with_options(
        input: impl IntoIterator<IntoIter = I>,
        options: WkbReaderOptions,
    ) -> Self {
        Self {
            iter: input.into_iter(),
            options,
        }
    }
}

impl<I, B> FeatureSource for WkbReader<I>
where
    I: Iterator<Item = Option<B>>,
    B: AsRef<[u8]>,
{
    fn vector_meta(&self) -> VectorMeta {
        let size = match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(lower),
            _ => None,
        };
        VectorMeta::new(None, None, size)
    }

    fn next_feature(
        &mut self,
        feat_id: usize,
        handler: &mut dyn Handler,
    ) -> Result<Option<Continuation>> {
        let Some(item) = self.iter.next() else {
            return Ok(None);
        };

        let Some(buf) = item else {
            return handler.null_feature(feat_id).map(Some);
        };

        let options = self.options;
        push_feature(handler, feat_id, |handler| {
            let mut decoder = Decoder::new(buf.as_ref(), handler, options);
            propagate!(decoder.read_geometry(None, 0));
            decoder.finish()?;
            Ok(Continuation::Continue)
        })
    }
}

/// Decodes one WKB buffer into handler calls.
struct Decoder<'a, 'h> {
    cursor: Cursor<&'a [u8]>,
    handler: &'h mut dyn Handler,
    options: WkbReaderOptions,
}

impl<'a, 'h> Decoder<'a, 'h> {
    fn new(buf: &'a [u8], handler: &'h mut dyn Handler, options: WkbReaderOptions) -> Self {
        Self {
            cursor: Cursor::new(buf),
            handler,
            options,
        }
    }

    fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    fn remaining(&self) -> u64 {
        (self.cursor.get_ref().len() as u64).saturating_sub(self.cursor.position())
    }

    /// Reject trailing bytes after the outermost geometry.
    fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(GeoStreamError::malformed(
                self.position(),
                format!("{n} unexpected trailing bytes"),
            )),
        }
    }

    fn truncated(&self, position: usize) -> GeoStreamError {
        GeoStreamError::malformed(
            position,
            format!(
                "Unexpected end of buffer ({} bytes)",
                self.cursor.get_ref().len()
            ),
        )
    }

    fn read_u8(&mut self) -> Result<u8> {
        let position = self.position();
        self.cursor
            .read_u8()
            .map_err(|_| self.truncated(position))
    }

    fn read_u32(&mut self, order: Endianness) -> Result<u32> {
        let position = self.position();
        match order {
            Endianness::BigEndian => self.cursor.read_u32::<BigEndian>(),
            Endianness::LittleEndian => self.cursor.read_u32::<LittleEndian>(),
        }
        .map_err(|_| self.truncated(position))
    }

    fn read_f64(&mut self, order: Endianness) -> Result<f64> {
        let position = self.position();
        match order {
            Endianness::BigEndian => self.cursor.read_f64::<BigEndian>(),
            Endianness::LittleEndian => self.cursor.read_f64::<LittleEndian>(),
        }
        .map_err(|_| self.truncated(position))
    }

    /// Read a count and check that `min_item_bytes` bytes per item are still available.
    fn read_count(&mut self, order: Endianness, min_item_bytes: u64) -> Result<usize> {
        let position = self.position();
        let count = self.read_u32(order)?;
        if u64::from(count) * min_item_bytes > self.remaining() {
            return Err(GeoStreamError::malformed(
                position,
                format!(
                    "Count of {count} exceeds the {} bytes remaining",
                    self.remaining()
                ),
            ));
        }
        Ok(count as usize)
    }

    fn read_coord(&mut self, order: Endianness, dim: Dimension) -> Result<Coord> {
        let mut coord = Coord::nan(dim);
        for value in coord.as_mut_slice() {
            *value = self.read_f64(order)?;
        }
        Ok(coord)
    }

    fn read_coords(
        &mut self,
        order: Endianness,
        meta: &GeometryMeta,
        count: usize,
    ) -> HandlerResult {
        for i in 0..count {
            let coord = self.read_coord(order, meta.dimension)?;
            propagate!(self.handler.coord(meta, &coord, i));
        }
        Ok(Continuation::Continue)
    }

    fn read_geometry(&mut self, part_id: Option<usize>, depth: usize) -> HandlerResult {
        if depth > self.options.max_depth {
            return Err(GeoStreamError::DepthLimitExceeded(self.options.max_depth));
        }

        let position = self.position();
        let order = Endianness::try_from(self.read_u8()?).map_err(|byte| {
            GeoStreamError::malformed(position, format!("Invalid byte order marker {byte}"))
        })?;
        let wkb_type = WkbType::decode(self.read_u32(order)?, self.options.dimension_precedence)?;
        let srid = if wkb_type.has_srid {
            Some(self.read_u32(order)?)
        } else {
            None
        };
        let dim = wkb_type.dimension;
        let coord_bytes = dim.size() as u64 * 8;

        match wkb_type.geometry_type {
            GeometryType::Point => {
                let coord = self.read_coord(order, dim)?;
                let empty = coord.is_nan();
                let meta = GeometryMeta::new(GeometryType::Point, dim, Some(usize::from(!empty)))
                    .with_srid(srid);
                propagate!(self.handler.geometry_start(&meta, part_id));
                if !empty {
                    propagate!(self.handler.coord(&meta, &coord, 0));
                }
                self.handler.geometry_end(&meta, part_id)
            }
            GeometryType::LineString => {
                let count = self.read_count(order, coord_bytes)?;
                let meta =
                    GeometryMeta::new(GeometryType::LineString, dim, Some(count)).with_srid(srid);
                propagate!(self.handler.geometry_start(&meta, part_id));
                propagate!(self.read_coords(order, &meta, count));
                self.handler.geometry_end(&meta, part_id)
            }
            GeometryType::Polygon => {
                let rings = self.read_count(order, 4)?;
                let meta =
                    GeometryMeta::new(GeometryType::Polygon, dim, Some(rings)).with_srid(srid);
                propagate!(self.handler.geometry_start(&meta, part_id));
                for ring_id in 0..rings {
                    let count = self.read_count(order, coord_bytes)?;
                    propagate!(self.handler.ring_start(&meta, Some(count), ring_id));
                    propagate!(self.read_coords(order, &meta, count));
                    propagate!(self.handler.ring_end(&meta, Some(count), ring_id));
                }
                self.handler.geometry_end(&meta, part_id)
            }
            geometry_type => {
                let parts = self.read_count(order, MIN_GEOMETRY_BYTES)?;
                let meta = GeometryMeta::new(geometry_type, dim, Some(parts)).with_srid(srid);
                propagate!(self.handler.geometry_start(&meta, part_id));
                for i in 0..parts {
                    propagate!(self.read_part(geometry_type.child_type(), i, depth + 1));
                }
                self.handler.geometry_end(&meta, part_id)
            }
        }
    }

    /// Read a part of a collection, checking its type against `expected` for multi geometries.
    fn read_part(
        &mut self,
        expected: Option<GeometryType>,
        part_id: usize,
        depth: usize,
    ) -> HandlerResult {
        if let Some(expected) = expected {
            let position = self.position();
            let header = self
                .cursor
                .get_ref()
                .get(position..position + MIN_GEOMETRY_BYTES as usize);
            if let Some(&[byte_order, a, b, c, d]) = header {
                let code = match Endianness::try_from(byte_order) {
                    Ok(Endianness::BigEndian) => u32::from_be_bytes([a, b, c, d]),
                    _ => u32::from_le_bytes([a, b, c, d]),
                };
                let found = WkbType::decode(code, self.options.dimension_precedence)?;
                if found.geometry_type != expected {
                    return Err(GeoStreamError::Structural(format!(
                        "Expected {expected} but found {} at byte {position}",
                        found.geometry_type
                    )));
                }
            }
        }
        self.read_geometry(Some(part_id), depth)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::driver::Driver;
    use crate::handler::{CountHandler, MetaHandler};
    use crate::io::wkb::{DimensionEncoding, WkbWriter, WkbWriterOptions};
    use crate::io::wkt::{WktReader, WktWriter};
    use crate::test::wkt_fixtures;

    fn to_wkt(wkb: &[u8]) -> Result<String> {
        let out = Driver::new(WkbReader::new([Some(wkb)]))
            .run(WktWriter::default())?
            .output;
        Ok(out[0].clone().unwrap_or_default())
    }

    fn root_cause(wkb: &[u8]) -> GeoStreamError {
        match to_wkt(wkb).unwrap_err() {
            GeoStreamError::Aborted { source, .. } => *source,
            other => other,
        }
    }

    #[test]
    fn little_endian_point() {
        let wkb = hex::decode("0101000000000000000000F03F0000000000000040").unwrap();
        assert_eq!(to_wkt(&wkb).unwrap(), "POINT (1 2)");
    }

    #[test]
    fn big_endian_point() {
        let wkb = hex::decode("00000000013FF00000000000004000000000000000").unwrap();
        assert_eq!(to_wkt(&wkb).unwrap(), "POINT (1 2)");
    }

    #[test]
    fn mixed_byte_order() {
        // A little-endian multipoint with one big-endian and one little-endian part.
        let wkb = hex::decode(concat!(
            "010400000002000000",
            "00000000013FF00000000000004000000000000000",
            "010100000000000000000008400000000000001040"
        ))
        .unwrap();
        assert_eq!(to_wkt(&wkb).unwrap(), "MULTIPOINT ((1 2), (3 4))");
    }

    #[test]
    fn iso_z_and_extended_srid() {
        let wkb =
            hex::decode("01E9030000000000000000F03F00000000000000400000000000000840").unwrap();
        assert_eq!(to_wkt(&wkb).unwrap(), "POINT Z (1 2 3)");

        let wkb = hex::decode("0101000020E6100000000000000000F03F0000000000000040").unwrap();
        assert_eq!(to_wkt(&wkb).unwrap(), "SRID=4326;POINT (1 2)");
    }

    #[test]
    fn nan_point_is_empty() {
        let wkb = hex::decode("0101000000000000000000F87F000000000000F87F").unwrap();
        assert_eq!(to_wkt(&wkb).unwrap(), "POINT EMPTY");

        let metas = Driver::new(WkbReader::new([Some(&wkb)]))
            .run(MetaHandler::new())
            .unwrap()
            .output;
        assert_eq!(metas[0].unwrap().size, Some(0));
    }

    #[test]
    fn truncated_buffer_reports_offset() {
        let wkb =
            hex::decode("0102000000020000000000000000000000000000000000000000000000").unwrap();
        assert!(matches!(
            root_cause(&wkb[..5]),
            GeoStreamError::Malformed { position: 5, .. }
        ));
        // Two coordinates need 32 bytes but only 20 remain.
        assert!(matches!(
            root_cause(&wkb),
            GeoStreamError::Malformed { position: 5, .. }
        ));
        assert!(matches!(
            root_cause(&[]),
            GeoStreamError::Malformed { position: 0, .. }
        ));
    }

    #[test]
    fn huge_counts_are_rejected() {
        let wkb = hex::decode("0102000000FFFFFFFF").unwrap();
        assert!(matches!(
            root_cause(&wkb),
            GeoStreamError::Malformed { position: 5, .. }
        ));
    }

    #[test]
    fn invalid_headers() {
        assert!(matches!(
            root_cause(&hex::decode("0201000000").unwrap()),
            GeoStreamError::Malformed { position: 0, .. }
        ));
        assert!(matches!(
            root_cause(&hex::decode("0111000000").unwrap()),
            GeoStreamError::UnsupportedEncoding(_)
        ));
        assert!(matches!(
            root_cause(&hex::decode("0101000000000000000000F03F0000000000000040FF").unwrap()),
            GeoStreamError::Malformed { position: 21, .. }
        ));
    }

    #[test]
    fn multi_part_type_is_checked() {
        // A MULTIPOINT whose only part is a LINESTRING.
        let wkb = hex::decode("010400000001000000010200000000000000").unwrap();
        assert!(matches!(root_cause(&wkb), GeoStreamError::Structural(_)));
    }

    #[test]
    fn depth_limit() {
        // GEOMETRYCOLLECTION (GEOMETRYCOLLECTION (GEOMETRYCOLLECTION EMPTY))
        let wkb = hex::decode("010700000001000000010700000001000000010700000000000000").unwrap();
        let options = WkbReaderOptions {
            max_depth: 1,
            ..Default::default()
        };
        let err = Driver::new(WkbReader::new_with_options([Some(&wkb)], options))
            .run(CountHandler::new())
            .unwrap_err();
        assert!(matches!(
            err.root_cause(),
            GeoStreamError::DepthLimitExceeded(1)
        ));
        assert!(to_wkt(&wkb).is_ok());
    }

    #[test]
    fn round_trip_is_bit_for_bit() {
        for endianness in [Endianness::LittleEndian, Endianness::BigEndian] {
            for dimension_encoding in [DimensionEncoding::Iso, DimensionEncoding::Extended] {
                let options = WkbWriterOptions {
                    endianness,
                    dimension_encoding,
                };
                let wkb = Driver::new(WktReader::new(wkt_fixtures()))
                    .run(WkbWriter::new(options))
                    .unwrap()
                    .output;
                let again = Driver::new(WkbReader::new(wkb.iter().map(Option::as_ref)))
                    .run(WkbWriter::new(options))
                    .unwrap()
                    .output;
                assert_eq!(wkb, again, "{endianness:?} {dimension_encoding:?}");
            }
        }
    }
}
