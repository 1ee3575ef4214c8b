use crate::coord::Coord;
use crate::datatypes::{Dimension, GeometryType};
use crate::error::{GeoStreamError, Result};
use crate::handler::{Continuation, GeometryMeta, Handler, HandlerResult};
use crate::io::wkt::reader::tokenizer::{Token, Tokenizer};
use crate::propagate;

/// Which of the two passes over a feature the parser is performing.
///
/// Revealing exact sizes requires knowing how many coordinates, rings or parts a geometry has
/// before its `geometry_start` is emitted. The counting pass parses the feature without
/// emitting anything and records every size in pre-order; the emitting pass replays them.
pub(super) enum Pass<'h> {
    Counting,
    Emitting(&'h mut dyn Handler),
}

/// A recursive-descent parser for a single WKT feature.
pub(super) struct Parser<'a, 'h> {
    tokens: Tokenizer<'a>,
    pass: Pass<'h>,
    /// Sizes in pre-order of `geometry_start`/`ring_start`. Written by the counting pass and read
    /// by an emitting pass that reveals sizes.
    sizes: Vec<usize>,
    cursor: usize,
    reveal_size: bool,
    max_depth: usize,
}

impl<'a, 'h> Parser<'a, 'h> {
    pub(super) fn counting(input: &'a str, max_depth: usize) -> Self {
        Self {
            tokens: Tokenizer::new(input),
            pass: Pass::Counting,
            sizes: vec![],
            cursor: 0,
            reveal_size: false,
            max_depth,
        }
    }

    /// An emitting parser. When `sizes` comes from a counting pass over the same input, the
    /// emitted size hints are exact.
    pub(super) fn emitting(
        input: &'a str,
        handler: &'h mut dyn Handler,
        sizes: Option<Vec<usize>>,
        max_depth: usize,
    ) -> Self {
        Self {
            tokens: Tokenizer::new(input),
            pass: Pass::Emitting(handler),
            reveal_size: sizes.is_some(),
            sizes: sizes.unwrap_or_default(),
            cursor: 0,
            max_depth,
        }
    }

    pub(super) fn into_sizes(self) -> Vec<usize> {
        self.sizes
    }

    /// Parse a complete feature: an optional `SRID=n;` prefix, one geometry and the end of
    /// input.
    pub(super) fn parse_feature(&mut self) -> HandlerResult {
        let srid = self.parse_srid()?;
        propagate!(self.parse_geometry(None, srid, 0));
        match self.tokens.peek()? {
            Token::Eof => Ok(Continuation::Continue),
            other => Err(self.unexpected("end of input", other)),
        }
    }

    fn emit(&mut self, f: impl FnOnce(&mut dyn Handler) -> HandlerResult) -> HandlerResult {
        match &mut self.pass {
            Pass::Counting => Ok(Continuation::Continue),
            Pass::Emitting(handler) => f(&mut **handler),
        }
    }

    /// Reserve the size slot of the next geometry or ring. Returns the slot and the size to
    /// announce in its header, if known.
    fn open_size(&mut self) -> (usize, Option<usize>) {
        match self.pass {
            Pass::Counting => {
                self.sizes.push(0);
                (self.sizes.len() - 1, None)
            }
            Pass::Emitting(_) if self.reveal_size => {
                let slot = self.cursor;
                self.cursor += 1;
                (slot, self.sizes.get(slot).copied())
            }
            Pass::Emitting(_) => (0, None),
        }
    }

    fn close_size(&mut self, slot: usize, size: usize) {
        if let Pass::Counting = self.pass {
            self.sizes[slot] = size;
        }
    }

    fn unexpected(&mut self, expected: &str, found: Token) -> GeoStreamError {
        GeoStreamError::malformed(
            self.tokens.position(),
            format!("Expected {expected} but found {}", found.describe()),
        )
    }

    fn expect(&mut self, expected: Token<'static>) -> Result<()> {
        let found = self.tokens.peek()?;
        if found != expected {
            return Err(self.unexpected(&expected.describe(), found));
        }
        self.tokens.next_token()?;
        Ok(())
    }

    /// Consume `,` (returning true) or `)` (returning false).
    fn comma_or_close(&mut self) -> Result<bool> {
        let more = match self.tokens.peek()? {
            Token::Comma => true,
            Token::RightParen => false,
            other => return Err(self.unexpected("',' or ')'", other)),
        };
        self.tokens.next_token()?;
        Ok(more)
    }

    /// Consume the `EMPTY` keyword if it is next.
    fn take_empty(&mut self) -> Result<bool> {
        match self.tokens.peek()? {
            Token::Word(w) if w.eq_ignore_ascii_case("EMPTY") => {
                self.tokens.next_token()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn parse_srid(&mut self) -> Result<Option<u32>> {
        match self.tokens.peek()? {
            Token::Word(w) if w.eq_ignore_ascii_case("SRID") => {
                self.tokens.next_token()?;
            }
            _ => return Ok(None),
        }
        self.expect(Token::Equals)?;
        let position = self.tokens.position();
        let srid = match self.tokens.next_token()? {
            Token::Number(n) if n.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&n) => {
                n as u32
            }
            other => {
                return Err(GeoStreamError::malformed(
                    position,
                    format!("Invalid SRID {}", other.describe()),
                ))
            }
        };
        self.expect(Token::Semicolon)?;
        Ok(Some(srid))
    }

    /// Parse a geometry keyword with an optional `Z`, `M` or `ZM` suffix, either as a separate
    /// word or attached to the keyword.
    fn parse_tag(&mut self) -> Result<(GeometryType, Option<Dimension>)> {
        let position = self.tokens.position();
        let word = match self.tokens.peek()? {
            Token::Word(w) => w,
            other => return Err(self.unexpected("a geometry type", other)),
        };
        self.tokens.next_token()?;

        let (geometry_type, mut dim) = match GeometryType::from_wkt_keyword(word) {
            Some(t) => (t, None),
            None => ["ZM", "Z", "M"]
                .into_iter()
                .find_map(|suffix| {
                    let split = word.len().checked_sub(suffix.len())?;
                    let (keyword, tail) = word.split_at(split);
                    if !tail.eq_ignore_ascii_case(suffix) {
                        return None;
                    }
                    GeometryType::from_wkt_keyword(keyword).map(|t| (t, dimension_suffix(suffix)))
                })
                .ok_or_else(|| {
                    GeoStreamError::malformed(position, format!("Unknown geometry type '{word}'"))
                })?,
        };

        if dim.is_none() {
            if let Token::Word(w) = self.tokens.peek()? {
                dim = dimension_suffix(w);
                if dim.is_some() {
                    self.tokens.next_token()?;
                }
            }
        }

        Ok((geometry_type, dim))
    }

    /// Look ahead to the first coordinate of the current geometry to infer its dimension from
    /// the number of ordinates. A geometry without coordinates is XY.
    fn infer_dimension(&self) -> Result<Dimension> {
        let mut lookahead = self.tokens.clone();
        let mut depth = 0usize;
        loop {
            match lookahead.next_token()? {
                Token::Number(_) => break,
                Token::LeftParen => depth += 1,
                Token::RightParen if depth <= 1 => return Ok(Dimension::XY),
                Token::RightParen => depth -= 1,
                Token::Word(w) if depth == 0 && w.eq_ignore_ascii_case("EMPTY") => {
                    return Ok(Dimension::XY)
                }
                Token::Eof => return Ok(Dimension::XY),
                _ => {}
            }
        }

        let mut ordinates = 1;
        while let Token::Number(_) = lookahead.next_token()? {
            ordinates += 1;
        }
        Ok(match ordinates {
            3 => Dimension::XYZ,
            4 => Dimension::XYZM,
            _ => Dimension::XY,
        })
    }

    fn parse_coord(&mut self, dim: Dimension) -> Result<Coord> {
        let position = self.tokens.position();
        let mut ordinates = [0.0; 4];
        let mut n = 0;
        while let Token::Number(value) = self.tokens.peek()? {
            self.tokens.next_token()?;
            if n < ordinates.len() {
                ordinates[n] = value;
            }
            n += 1;
        }

        if n == 0 {
            let found = self.tokens.peek()?;
            return Err(self.unexpected("a coordinate", found));
        }

        match Coord::from_slice(&ordinates[..n.min(4)], dim) {
            Some(coord) if n <= 4 => Ok(coord),
            _ => Err(GeoStreamError::Structural(format!(
                "Coordinate at byte {position} has {n} ordinates but the geometry is {dim}"
            ))),
        }
    }

    /// Parse a tagged geometry: keyword, optional dimension, then its body.
    fn parse_geometry(
        &mut self,
        part_id: Option<usize>,
        srid: Option<u32>,
        depth: usize,
    ) -> HandlerResult {
        let (geometry_type, dim) = self.parse_tag()?;
        let dim = match dim {
            Some(dim) => dim,
            None => self.infer_dimension()?,
        };
        self.parse_body(geometry_type, dim, part_id, srid, depth)
    }

    /// Parse `EMPTY` or the parenthesized content of a geometry whose type is already known.
    fn parse_body(
        &mut self,
        geometry_type: GeometryType,
        dim: Dimension,
        part_id: Option<usize>,
        srid: Option<u32>,
        depth: usize,
    ) -> HandlerResult {
        if depth > self.max_depth {
            return Err(GeoStreamError::DepthLimitExceeded(self.max_depth));
        }

        let (slot, revealed) = self.open_size();
        let empty = self.take_empty()?;
        let size = if empty {
            Some(0)
        } else if geometry_type == GeometryType::Point {
            Some(1)
        } else {
            revealed
        };
        let meta = GeometryMeta::new(geometry_type, dim, size).with_srid(srid);

        propagate!(self.emit(|h| h.geometry_start(&meta, part_id)));

        let mut n = 0;
        if !empty {
            self.expect(Token::LeftParen)?;
            match geometry_type {
                GeometryType::Point => {
                    let coord = self.parse_coord(dim)?;
                    propagate!(self.emit(|h| h.coord(&meta, &coord, 0)));
                    self.expect(Token::RightParen)?;
                    n = 1;
                }
                GeometryType::LineString => loop {
                    let coord = self.parse_coord(dim)?;
                    propagate!(self.emit(|h| h.coord(&meta, &coord, n)));
                    n += 1;
                    if !self.comma_or_close()? {
                        break;
                    }
                },
                GeometryType::Polygon => loop {
                    propagate!(self.parse_ring(&meta, n));
                    n += 1;
                    if !self.comma_or_close()? {
                        break;
                    }
                },
                GeometryType::MultiPoint => loop {
                    if let Token::Number(_) = self.tokens.peek()? {
                        propagate!(self.parse_bare_point(dim, n, depth + 1));
                    } else {
                        propagate!(self.parse_body(
                            GeometryType::Point,
                            dim,
                            Some(n),
                            None,
                            depth + 1
                        ));
                    }
                    n += 1;
                    if !self.comma_or_close()? {
                        break;
                    }
                },
                GeometryType::MultiLineString | GeometryType::MultiPolygon => {
                    let child_type = geometry_type
                        .child_type()
                        .unwrap_or(GeometryType::GeometryCollection);
                    loop {
                        propagate!(self.parse_body(child_type, dim, Some(n), None, depth + 1));
                        n += 1;
                        if !self.comma_or_close()? {
                            break;
                        }
                    }
                }
                GeometryType::GeometryCollection => loop {
                    propagate!(self.parse_geometry(Some(n), None, depth + 1));
                    n += 1;
                    if !self.comma_or_close()? {
                        break;
                    }
                },
            }
        }

        self.close_size(slot, n);
        self.emit(|h| h.geometry_end(&meta, part_id))
    }

    /// A point inside a `MULTIPOINT` written without its own parentheses, as in
    /// `MULTIPOINT (1 2, 3 4)`.
    fn parse_bare_point(&mut self, dim: Dimension, part_id: usize, depth: usize) -> HandlerResult {
        if depth > self.max_depth {
            return Err(GeoStreamError::DepthLimitExceeded(self.max_depth));
        }

        let (slot, _) = self.open_size();
        let meta = GeometryMeta::new(GeometryType::Point, dim, Some(1));
        propagate!(self.emit(|h| h.geometry_start(&meta, Some(part_id))));
        let coord = self.parse_coord(dim)?;
        propagate!(self.emit(|h| h.coord(&meta, &coord, 0)));
        self.close_size(slot, 1);
        self.emit(|h| h.geometry_end(&meta, Some(part_id)))
    }

    fn parse_ring(&mut self, meta: &GeometryMeta, ring_id: usize) -> HandlerResult {
        let (slot, size) = self.open_size();
        self.expect(Token::LeftParen)?;
        propagate!(self.emit(|h| h.ring_start(meta, size, ring_id)));

        let mut n = 0;
        loop {
            let coord = self.parse_coord(meta.dimension)?;
            propagate!(self.emit(|h| h.coord(meta, &coord, n)));
            n += 1;
            if !self.comma_or_close()? {
                break;
            }
        }

        self.close_size(slot, n);
        let size = size.or(Some(n));
        self.emit(|h| h.ring_end(meta, size, ring_id))
    }
}

fn dimension_suffix(word: &str) -> Option<Dimension> {
    if word.eq_ignore_ascii_case("Z") {
        Some(Dimension::XYZ)
    } else if word.eq_ignore_ascii_case("M") {
        Some(Dimension::XYM)
    } else if word.eq_ignore_ascii_case("ZM") {
        Some(Dimension::XYZM)
    } else {
        None
    }
}
