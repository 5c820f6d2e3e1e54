// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Plot boundary decoding.
//!
//! Boundaries arrive either as well-known text or as GeoJSON (an object,
//! or a JSON document encoded inside a string). Both are normalized into
//! [`Geometry`]. Decoding never fails from the caller's point of view:
//! [`parse_boundary`] logs the problem and returns `None`, and the caller
//! treats the plot as having no boundary.

use geojson::GeoJson;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::error::{BoundaryFormat, DomainError};

/// A longitude/latitude pair in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    /// Longitude in degrees.
    pub lng: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl Coord {
    /// Creates a coordinate from longitude and latitude.
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Returns whether the coordinate is a finite point on the globe.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Returns `[lng, lat]`, the GeoJSON position order.
    #[must_use]
    pub const fn to_array(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

/// A linear ring of coordinates.
pub type Ring = Vec<Coord>;

/// The kind of a decoded geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    /// A single position.
    Point,
    /// An outer ring with optional holes.
    Polygon,
}

/// A decoded plot boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// A single position, used for plots surveyed as a point.
    Point(Coord),
    /// Rings of a polygon; the first ring is the outer boundary.
    Polygon(Vec<Ring>),
}

impl Geometry {
    /// Returns the kind of this geometry.
    #[must_use]
    pub const fn kind(&self) -> GeometryKind {
        match self {
            Self::Point(_) => GeometryKind::Point,
            Self::Polygon(_) => GeometryKind::Polygon,
        }
    }

    /// Returns the outer ring of a polygon.
    #[must_use]
    pub fn outer_ring(&self) -> Option<&Ring> {
        match self {
            Self::Point(_) => None,
            Self::Polygon(rings) => rings.first(),
        }
    }

    /// Returns every vertex of the geometry, in ring order.
    #[must_use]
    pub fn vertices(&self) -> Vec<Coord> {
        match self {
            Self::Point(point) => vec![*point],
            Self::Polygon(rings) => rings.iter().flatten().copied().collect(),
        }
    }

    /// Renders the geometry as a GeoJSON geometry object.
    #[must_use]
    pub fn to_geojson_value(&self) -> serde_json::Value {
        match self {
            Self::Point(point) => json!({
                "type": "Point",
                "coordinates": point.to_array(),
            }),
            Self::Polygon(rings) => {
                let coordinates: Vec<Vec<[f64; 2]>> = rings
                    .iter()
                    .map(|ring| ring.iter().map(|c| c.to_array()).collect())
                    .collect();
                json!({
                    "type": "Polygon",
                    "coordinates": coordinates,
                })
            }
        }
    }
}

/// A geographic sanity window for the deployment region.
///
/// Coordinates outside the window are still drawn when individually valid,
/// but they are ignored when fitting the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingWindow {
    /// Western edge (degrees longitude).
    pub min_lng: f64,
    /// Eastern edge (degrees longitude).
    pub max_lng: f64,
    /// Southern edge (degrees latitude).
    pub min_lat: f64,
    /// Northern edge (degrees latitude).
    pub max_lat: f64,
}

impl BoundingWindow {
    /// Creates a window from its edges.
    #[must_use]
    pub const fn new(min_lng: f64, max_lng: f64, min_lat: f64, max_lat: f64) -> Self {
        Self {
            min_lng,
            max_lng,
            min_lat,
            max_lat,
        }
    }

    /// Returns whether the coordinate is valid and inside the window.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        coord.is_valid()
            && (self.min_lng..=self.max_lng).contains(&coord.lng)
            && (self.min_lat..=self.max_lat).contains(&coord.lat)
    }
}

impl Default for BoundingWindow {
    /// Vietnam and its surroundings.
    fn default() -> Self {
        Self::new(102.0, 110.0, 8.0, 24.0)
    }
}

/// A raw boundary as stored on a plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawBoundary<'a> {
    /// WKT, or GeoJSON encoded as a string.
    Text(&'a str),
    /// An already-parsed JSON value.
    Json(&'a serde_json::Value),
}

/// Decodes a boundary, returning `None` when it cannot be decoded.
///
/// Failures are logged at `warn` and otherwise swallowed.
#[must_use]
pub fn parse_boundary(raw: RawBoundary<'_>) -> Option<Geometry> {
    let result: Result<Geometry, DomainError> = match raw {
        RawBoundary::Text(text) => try_parse_text(text),
        RawBoundary::Json(value) => try_parse_geojson_value(value),
    };
    match result {
        Ok(geometry) => Some(geometry),
        Err(err) => {
            warn!(error = %err, "Discarding undecodable boundary");
            None
        }
    }
}

/// Decodes a text boundary, sniffing GeoJSON by its leading brace.
///
/// # Errors
///
/// Returns `DomainError::GeometryDecode` if the text is neither valid WKT
/// nor a supported GeoJSON geometry.
pub fn try_parse_text(text: &str) -> Result<Geometry, DomainError> {
    let trimmed: &str = text.trim();
    if trimmed.starts_with('{') {
        let geojson: GeoJson = trimmed
            .parse()
            .map_err(|e: geojson::Error| geojson_error(e.to_string()))?;
        geometry_from_geojson(geojson)
    } else {
        try_parse_wkt(trimmed)
    }
}

/// Decodes a GeoJSON value: a geometry, a feature wrapping one, or a string
/// holding either.
///
/// # Errors
///
/// Returns `DomainError::GeometryDecode` on malformed JSON, unsupported
/// geometry types or degenerate coordinates.
pub fn try_parse_geojson_value(value: &serde_json::Value) -> Result<Geometry, DomainError> {
    if let serde_json::Value::String(encoded) = value {
        let trimmed: &str = encoded.trim();
        if !trimmed.starts_with('{') {
            return Err(geojson_error(String::from(
                "string does not contain a JSON object",
            )));
        }
        return try_parse_text(trimmed);
    }
    let geojson: GeoJson =
        GeoJson::from_json_value(value.clone()).map_err(|e| geojson_error(e.to_string()))?;
    geometry_from_geojson(geojson)
}

fn geojson_error(reason: String) -> DomainError {
    DomainError::GeometryDecode {
        format: BoundaryFormat::GeoJson,
        reason,
    }
}

fn wkt_error(reason: impl Into<String>) -> DomainError {
    DomainError::GeometryDecode {
        format: BoundaryFormat::Wkt,
        reason: reason.into(),
    }
}

fn geometry_from_geojson(geojson: GeoJson) -> Result<Geometry, DomainError> {
    let geometry: geojson::Geometry = match geojson {
        GeoJson::Geometry(geometry) => geometry,
        GeoJson::Feature(feature) => feature
            .geometry
            .ok_or_else(|| geojson_error(String::from("feature has no geometry")))?,
        GeoJson::FeatureCollection(_) => {
            return Err(geojson_error(String::from(
                "feature collections are not plot boundaries",
            )));
        }
    };

    match geometry.value {
        geojson::Value::Point(position) => position_to_coord(&position)
            .map(Geometry::Point)
            .ok_or_else(|| geojson_error(String::from("point has an invalid position"))),
        geojson::Value::Polygon(rings) => {
            let mut decoded: Vec<Ring> = Vec::with_capacity(rings.len());
            for ring in &rings {
                let coords: Option<Ring> = ring.iter().map(|p| position_to_coord(p)).collect();
                let coords: Ring = coords.ok_or_else(|| {
                    geojson_error(String::from("polygon ring has an invalid position"))
                })?;
                decoded.push(coords);
            }
            validate_rings(decoded, BoundaryFormat::GeoJson)
        }
        other => Err(geojson_error(format!(
            "unsupported geometry type {}",
            geojson_type_name(&other)
        ))),
    }
}

const fn geojson_type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn position_to_coord(position: &[f64]) -> Option<Coord> {
    match position {
        [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Some(Coord::new(*lng, *lat)),
        _ => None,
    }
}

fn validate_rings(rings: Vec<Ring>, format: BoundaryFormat) -> Result<Geometry, DomainError> {
    if rings.is_empty() {
        return Err(DomainError::GeometryDecode {
            format,
            reason: String::from("polygon has no rings"),
        });
    }
    if let Some(short) = rings.iter().position(|ring| ring.len() < 3) {
        return Err(DomainError::GeometryDecode {
            format,
            reason: format!("ring {short} has fewer than 3 vertices"),
        });
    }
    Ok(Geometry::Polygon(rings))
}

/// Decodes a WKT `POLYGON` or `POINT`, with an optional `SRID=n;` prefix.
///
/// # Errors
///
/// Returns `DomainError::GeometryDecode` describing the first syntax error.
pub fn try_parse_wkt(text: &str) -> Result<Geometry, DomainError> {
    let mut body: &str = text.trim();
    if body
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("SRID="))
    {
        let semicolon: usize = body
            .find(';')
            .ok_or_else(|| wkt_error("SRID prefix is not terminated by ';'"))?;
        body = &body[semicolon + 1..];
    }

    let mut cursor: WktCursor<'_> = WktCursor::new(body);
    let keyword: String = cursor.keyword();
    let geometry: Geometry = match keyword.as_str() {
        "POLYGON" => {
            cursor.consume(b'(')?;
            let mut rings: Vec<Ring> = vec![cursor.ring()?];
            while cursor.eat(b',') {
                rings.push(cursor.ring()?);
            }
            cursor.consume(b')')?;
            validate_rings(rings, BoundaryFormat::Wkt)?
        }
        "POINT" => {
            cursor.consume(b'(')?;
            let point: Coord = cursor.coord()?;
            cursor.consume(b')')?;
            Geometry::Point(point)
        }
        "" => return Err(wkt_error("missing geometry keyword")),
        other => return Err(wkt_error(format!("unsupported geometry type {other}"))),
    };

    cursor.skip_whitespace();
    if !cursor.at_end() {
        return Err(wkt_error(format!(
            "unexpected trailing input at offset {}",
            cursor.pos
        )));
    }
    Ok(geometry)
}

struct WktCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> WktCursor<'a> {
    const fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    const fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn keyword(&mut self) -> String {
        self.skip_whitespace();
        let start: usize = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos]).to_ascii_uppercase()
    }

    fn eat(&mut self, expected: u8) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn consume(&mut self, expected: u8) -> Result<(), DomainError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(wkt_error(format!(
                "expected '{}' at offset {}",
                char::from(expected),
                self.pos
            )))
        }
    }

    fn number(&mut self) -> Result<f64, DomainError> {
        self.skip_whitespace();
        let start: usize = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
        {
            self.pos += 1;
        }
        let token: &str = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| wkt_error("invalid number encoding"))?;
        if token.is_empty() {
            return Err(wkt_error(format!("expected a number at offset {start}")));
        }
        let value: f64 = token
            .parse()
            .map_err(|_| wkt_error(format!("invalid number '{token}'")))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(wkt_error(format!("non-finite number '{token}'")))
        }
    }

    fn coord(&mut self) -> Result<Coord, DomainError> {
        let lng: f64 = self.number()?;
        let lat: f64 = self.number()?;
        // A Z or M ordinate may follow; it is not used.
        self.skip_whitespace();
        if self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || b == b'-' || b == b'+' || b == b'.')
        {
            self.number()?;
        }
        Ok(Coord::new(lng, lat))
    }

    fn ring(&mut self) -> Result<Ring, DomainError> {
        self.consume(b'(')?;
        let mut ring: Ring = vec![self.coord()?];
        while self.eat(b',') {
            ring.push(self.coord()?);
        }
        self.consume(b')')?;
        Ok(ring)
    }
}

/// Returns the naive centroid of a geometry: the arithmetic mean of the
/// outer ring's distinct vertices.
///
/// The closing vertex of a closed ring repeats the first one and is not
/// counted, so a square's centroid is its center rather than being pulled
/// toward the first corner.
///
/// This is only an anchor for labels; it is not area-weighted and can fall
/// outside concave polygons.
#[must_use]
pub fn centroid(geometry: &Geometry) -> Option<Coord> {
    match geometry {
        Geometry::Point(point) => Some(*point),
        Geometry::Polygon(rings) => {
            let ring: &Ring = rings.first()?;
            let closed: bool = ring.len() > 1 && ring.first() == ring.last();
            let vertices: &[Coord] = if closed {
                &ring[..ring.len() - 1]
            } else {
                ring
            };
            if vertices.is_empty() {
                return None;
            }
            #[allow(clippy::cast_precision_loss)]
            let count: f64 = vertices.len() as f64;
            let (lng_sum, lat_sum): (f64, f64) = vertices
                .iter()
                .fold((0.0, 0.0), |(lng, lat), c| (lng + c.lng, lat + c.lat));
            Some(Coord::new(lng_sum / count, lat_sum / count))
        }
    }
}
