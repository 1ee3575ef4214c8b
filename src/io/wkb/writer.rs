use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::datatypes::GeometryType;
use crate::error::{GeoStreamError, Result};
use crate::handler::{Continuation, Finish, GeometryMeta, Handler, HandlerResult, VectorMeta};
use crate::io::wkb::common::{DimensionEncoding, Endianness, WkbType};

/// Options for [WkbWriter].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WkbWriterOptions {
    pub endianness: Endianness,
    pub dimension_encoding: DimensionEncoding,
}

/// A geometry or ring whose count has not been written yet.
#[derive(Debug)]
struct Frame {
    /// Byte offset of the count placeholder. Points have no count.
    count_pos: Option<usize>,
    count: usize,
}

/// Writes every feature as WKB, producing one `Option<Vec<u8>>` per feature.
///
/// Counts are written as placeholders and patched once the geometry or ring ends, so sources
/// that do not know sizes up front are supported.
#[derive(Debug, Default)]
pub struct WkbWriter {
    options: WkbWriterOptions,
    result: Vec<Option<Vec<u8>>>,
    buf: Vec<u8>,
    stack: Vec<Frame>,
}

impl WkbWriter {
    pub fn new(options: WkbWriterOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        match self.options.endianness {
            Endianness::BigEndian => self.buf.write_u32::<BigEndian>(value)?,
            Endianness::LittleEndian => self.buf.write_u32::<LittleEndian>(value)?,
        }
        Ok(())
    }

    fn write_f64(&mut self, value: f64) -> Result<()> {
        match self.options.endianness {
            Endianness::BigEndian => self.buf.write_f64::<BigEndian>(value)?,
            Endianness::LittleEndian => self.buf.write_f64::<LittleEndian>(value)?,
        }
        Ok(())
    }

    fn write_coord(&mut self, coord: &Coord) -> Result<()> {
        for value in coord.as_slice() {
            self.write_f64(*value)?;
        }
        Ok(())
    }

    /// Count one more item in the innermost open frame.
    fn add_item(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.count += 1;
        }
    }

    /// Open a frame whose count is patched when it closes.
    fn open_counted(&mut self) -> Result<()> {
        let count_pos = self.buf.len();
        self.write_u32(0)?;
        self.stack.push(Frame {
            count_pos: Some(count_pos),
            count: 0,
        });
        Ok(())
    }

    fn close(&mut self, meta: &GeometryMeta) -> Result<()> {
        let Some(frame) = self.stack.pop() else {
            return Ok(());
        };
        match frame.count_pos {
            Some(pos) => {
                let count = u32::try_from(frame.count).map_err(|_| {
                    GeoStreamError::Structural(format!(
                        "{} items do not fit in a WKB count",
                        frame.count
                    ))
                })?;
                let slot = &mut self.buf[pos..pos + 4];
                match self.options.endianness {
                    Endianness::BigEndian => BigEndian::write_u32(slot, count),
                    Endianness::LittleEndian => LittleEndian::write_u32(slot, count),
                }
            }
            // An empty point is written with NaN ordinates.
            None if frame.count == 0 => self.write_coord(&Coord::nan(meta.dimension))?,
            None => {}
        }
        Ok(())
    }
}

impl Handler for WkbWriter {
    fn vector_start(&mut self, meta: &VectorMeta) -> HandlerResult {
        self.result.clear();
        if let Some(size) = meta.size {
            self.result.try_reserve(size)?;
        }
        Ok(Continuation::Continue)
    }

    fn feature_start(&mut self, _feat_id: usize) -> HandlerResult {
        self.buf.clear();
        self.stack.clear();
        Ok(Continuation::Continue)
    }

    fn null_feature(&mut self, _feat_id: usize) -> HandlerResult {
        self.result.push(None);
        Ok(Continuation::Continue)
    }

    fn geometry_start(&mut self, meta: &GeometryMeta, part_id: Option<usize>) -> HandlerResult {
        self.add_item();

        let srid = match (self.options.dimension_encoding, part_id) {
            (DimensionEncoding::Extended, None) => meta.srid,
            _ => None,
        };
        let wkb_type = WkbType {
            geometry_type: meta.geometry_type,
            dimension: meta.dimension,
            has_srid: srid.is_some(),
        };

        self.buf.try_reserve(9)?;
        self.buf.push(self.options.endianness.into());
        self.write_u32(wkb_type.encode(self.options.dimension_encoding))?;
        if let Some(srid) = srid {
            self.write_u32(srid)?;
        }

        if meta.geometry_type == GeometryType::Point {
            self.stack.push(Frame {
                count_pos: None,
                count: 0,
            });
        } else {
            self.open_counted()?;
        }
        Ok(Continuation::Continue)
    }

    fn ring_start(
        &mut self,
        _meta: &GeometryMeta,
        _size: Option<usize>,
        _ring_id: usize,
    ) -> HandlerResult {
        self.add_item();
        self.open_counted()?;
        Ok(Continuation::Continue)
    }

    fn coord(&mut self, meta: &GeometryMeta, coord: &Coord, _coord_id: usize) -> HandlerResult {
        if coord.dim() != meta.dimension {
            return Err(GeoStreamError::Structural(format!(
                "{} coordinate in a {} geometry",
                coord.dim(),
                meta.dimension
            )));
        }
        self.add_item();
        self.buf.try_reserve(coord.as_slice().len() * 8)?;
        self.write_coord(coord)?;
        Ok(Continuation::Continue)
    }

    fn ring_end(
        &mut self,
        meta: &GeometryMeta,
        _size: Option<usize>,
        _ring_id: usize,
    ) -> HandlerResult {
        self.close(meta)?;
        Ok(Continuation::Continue)
    }

    fn geometry_end(&mut self, meta: &GeometryMeta, _part_id: Option<usize>) -> HandlerResult {
        self.close(meta)?;
        Ok(Continuation::Continue)
    }

    fn feature_end(&mut self, _feat_id: usize) -> HandlerResult {
        self.result.push(Some(std::mem::take(&mut self.buf)));
        Ok(Continuation::Continue)
    }

    fn feature_abandoned(&mut self, feat_id: usize) {
        if self.result.len() <= feat_id {
            self.result.push(None);
        }
    }
}

impl Finish for WkbWriter {
    type Output = Vec<Option<Vec<u8>>>;

    fn finish(self) -> Result<Self::Output> {
        Ok(self.result)
    }
}
