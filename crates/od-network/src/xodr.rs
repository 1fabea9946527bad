//! OpenDRIVE (`.xodr`) loader, enabled by the `xodr` feature.
//!
//! Streams the XML with `quick-xml` and maps the subset of elements the
//! engine uses onto a [`Document`].  Everything else (signals, objects,
//! lateral profiles, lane heights, materials) is skipped without error.
//!
//! | Element                                   | Document record                      |
//! |-------------------------------------------|--------------------------------------|
//! | `header`                                  | [`Header`]                           |
//! | `road`, `road/link/{predecessor,successor}` | [`RoadRecord`], [`LinkTargetRecord`] |
//! | `road/type/speed`                         | [`RoadSpeedRecord`]                  |
//! | `planView/geometry/{line,arc,spiral,poly3,paramPoly3}` | [`GeometryRecord`]      |
//! | `elevationProfile/elevation`, `lanes/laneOffset` | [`PolyRecord`]                |
//! | `laneSection`, `lane`, `lane/link/*`      | [`LaneSectionRecord`], [`LaneRecord`] |
//! | `lane/{width,border,speed,roadMark}`      | width / speed / mark records         |
//! | `junction/connection/laneLink`            | [`JunctionRecord`], [`ConnectionRecord`] |
//!
//! The center lane (id 0) is not a lane record; its road marks become the
//! section's `center_road_marks`.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use od_core::SpeedUnit;

use crate::document::{
    ConnectionRecord, Document, ElementType, GeometryKindRecord, GeometryRecord, Header,
    JunctionRecord, LaneLinkRecord, LaneRecord, LaneSectionRecord, LaneSpeedRecord, LinkTargetRecord, PolyRecord,
    RoadMarkRecord, RoadRecord, RoadSpeedRecord, WidthRecord,
};
use crate::model::{ContactPoint, LaneType, RoadMarkType};
use crate::{LoadError, LoadResult};

/// Parse an `.xodr` file.
pub fn load_document_xodr(path: &Path) -> LoadResult<Document> {
    let text = std::fs::read_to_string(path)?;
    parse_xodr(&text)
}

/// Parse `.xodr` content held in memory.
pub fn parse_xodr(xml: &str) -> LoadResult<Document> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buffer = Vec::new();
    let mut parser = XodrParser::default();

    loop {
        match reader.read_event_into(&mut buffer) {
            Ok(Event::Start(ref e)) => {
                let tag = reader.decoder().decode(e.name().as_ref()).map_err(xml_err)?.into_owned();
                let attrs = Attrs::read(&reader, e)?;
                parser.open(&tag, &attrs)?;
                parser.stack.push(tag);
            }
            Ok(Event::Empty(ref e)) => {
                let tag = reader.decoder().decode(e.name().as_ref()).map_err(xml_err)?.into_owned();
                let attrs = Attrs::read(&reader, e)?;
                parser.open(&tag, &attrs)?;
                parser.close(&tag);
            }
            Ok(Event::End(ref e)) => {
                let tag = reader.decoder().decode(e.name().as_ref()).map_err(xml_err)?.into_owned();
                parser.stack.pop();
                parser.close(&tag);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(LoadError::Xml(format!(
                    "at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
        buffer.clear();
    }

    log::debug!(
        "parsed xodr: {} roads, {} junctions",
        parser.document.roads.len(),
        parser.document.junctions.len()
    );
    Ok(parser.document)
}

fn xml_err<E: std::fmt::Display>(e: E) -> LoadError {
    LoadError::Xml(e.to_string())
}

// ── Attributes ────────────────────────────────────────────────────────────────

struct Attrs(Vec<(String, String)>);

impl Attrs {
    fn read(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> LoadResult<Self> {
        let mut out = Vec::new();
        for attr in e.attributes().with_checks(false) {
            let attr = attr.map_err(xml_err)?;
            let key = reader.decoder().decode(attr.key.as_ref()).map_err(xml_err)?.into_owned();
            let value = attr.unescape_value().map_err(xml_err)?.into_owned();
            out.push((key, value));
        }
        Ok(Attrs(out))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn string(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_owned()
    }

    /// Numeric attribute; absent means 0.
    fn f64(&self, key: &str) -> LoadResult<f64> {
        match self.get(key) {
            None => Ok(0.0),
            Some(v) => parse_f64(key, v),
        }
    }

    fn i32(&self, key: &str) -> LoadResult<i32> {
        let v = self.get(key).unwrap_or_default();
        v.trim()
            .parse()
            .map_err(|_| LoadError::Xml(format!("attribute {key}={v:?} is not an integer")))
    }

    fn contact_point(&self) -> LoadResult<Option<ContactPoint>> {
        match self.get("contactPoint") {
            None => Ok(None),
            Some("start") => Ok(Some(ContactPoint::Start)),
            Some("end") => Ok(Some(ContactPoint::End)),
            Some(other) => Err(LoadError::Xml(format!("unknown contactPoint {other:?}"))),
        }
    }

    fn unit(&self) -> LoadResult<SpeedUnit> {
        Ok(match self.get("unit") {
            None => SpeedUnit::default(),
            Some(v) => v.parse()?,
        })
    }

    fn poly(&self, s_key: &str) -> LoadResult<PolyRecord> {
        Ok(PolyRecord::new(self.f64(s_key)?, self.f64("a")?, self.f64("b")?, self.f64("c")?, self.f64("d")?))
    }

    fn width(&self) -> LoadResult<WidthRecord> {
        Ok(WidthRecord {
            s_offset: self.f64("sOffset")?,
            a: self.f64("a")?,
            b: self.f64("b")?,
            c: self.f64("c")?,
            d: self.f64("d")?,
        })
    }
}

fn parse_f64(key: &str, v: &str) -> LoadResult<f64> {
    v.trim()
        .parse()
        .map_err(|_| LoadError::Xml(format!("attribute {key}={v:?} is not a number")))
}

// ── Element state machine ─────────────────────────────────────────────────────

#[derive(Default)]
struct XodrParser {
    document: Document,
    /// Names of the currently open (non-empty) elements.
    stack: Vec<String>,
    road: Option<RoadRecord>,
    geometry: Option<GeometryRecord>,
    /// `s` of the enclosing road `<type>`.
    type_s: f64,
    section: Option<LaneSectionRecord>,
    lane: Option<LaneRecord>,
    junction: Option<JunctionRecord>,
    connection: Option<ConnectionRecord>,
}

impl XodrParser {
    fn parent(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    fn grandparent(&self) -> Option<&str> {
        self.stack.len().checked_sub(2).map(|i| self.stack[i].as_str())
    }

    fn open(&mut self, tag: &str, a: &Attrs) -> LoadResult<()> {
        match tag {
            "header" => {
                let version = match (a.get("revMajor"), a.get("revMinor")) {
                    (Some(major), Some(minor)) => Some(format!("{major}.{minor}")),
                    _ => None,
                };
                self.document.header = Some(Header { name: a.get("name").map(str::to_owned), version });
            }
            "road" => {
                let mut road = RoadRecord::new(a.string("id"), a.f64("length")?);
                road.name = a.get("name").filter(|n| !n.is_empty()).map(str::to_owned);
                road.junction = a.get("junction").filter(|j| !j.is_empty() && *j != "-1").map(str::to_owned);
                self.road = Some(road);
            }
            "predecessor" | "successor" => self.open_link(tag, a)?,
            "type" if self.parent() == Some("road") => self.type_s = a.f64("s")?,
            "speed" => self.open_speed(a)?,
            "geometry" => {
                self.geometry = Some(GeometryRecord::line(
                    a.f64("s")?,
                    a.f64("x")?,
                    a.f64("y")?,
                    a.f64("hdg")?,
                    a.f64("length")?,
                ));
            }
            "line" | "arc" | "spiral" | "poly3" | "paramPoly3" => {
                if let Some(g) = self.geometry.as_mut() {
                    g.kind = geometry_kind(tag, a)?;
                }
            }
            "elevation" if self.parent() == Some("elevationProfile") => {
                if let Some(road) = self.road.as_mut() {
                    road.elevation.push(a.poly("s")?);
                }
            }
            "laneOffset" => {
                if let Some(road) = self.road.as_mut() {
                    road.lane_offset.push(a.poly("s")?);
                }
            }
            "laneSection" => self.section = Some(LaneSectionRecord::new(a.f64("s")?)),
            "lane" if self.section.is_some() => {
                self.lane = Some(LaneRecord {
                    id: a.i32("id")?,
                    lane_type: LaneType::from_xodr(a.get("type").unwrap_or("none")),
                    ..LaneRecord::default()
                });
            }
            "width" | "border" => {
                if let Some(lane) = self.lane.as_mut() {
                    let record = a.width()?;
                    if tag == "width" { lane.width.push(record) } else { lane.border.push(record) }
                }
            }
            "roadMark" if self.parent() == Some("lane") => {
                let mark = RoadMarkRecord {
                    s_offset: a.f64("sOffset")?,
                    mark_type: RoadMarkType::from_xodr(a.get("type").unwrap_or("none")),
                };
                match (self.lane.as_mut(), self.section.as_mut()) {
                    (Some(lane), Some(section)) if lane.id == 0 => section.center_road_marks.push(mark),
                    (Some(lane), _) => lane.road_marks.push(mark),
                    _ => {}
                }
            }
            "junction" if self.road.is_none() => {
                let mut junction = JunctionRecord::new(a.string("id"));
                junction.name = a.get("name").filter(|n| !n.is_empty()).map(str::to_owned);
                self.junction = Some(junction);
            }
            "connection" if self.junction.is_some() => {
                let contact = a.contact_point()?.ok_or_else(|| {
                    LoadError::Xml(format!("connection {:?} has no contactPoint", a.string("id")))
                })?;
                self.connection = Some(ConnectionRecord::new(
                    a.string("id"),
                    a.string("incomingRoad"),
                    a.string("connectingRoad"),
                    contact,
                ));
            }
            "laneLink" => {
                if let Some(connection) = self.connection.as_mut() {
                    connection.lane_links.push(LaneLinkRecord {
                        from: a.i32("from")?,
                        to: a.i32("to")?,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn open_link(&mut self, tag: &str, a: &Attrs) -> LoadResult<()> {
        if self.parent() != Some("link") {
            return Ok(());
        }
        let owner = self.grandparent().map(str::to_owned);
        match owner.as_deref() {
            Some("lane") => {
                if let Some(lane) = self.lane.as_mut() {
                    let id = Some(a.i32("id")?);
                    if tag == "predecessor" { lane.predecessor = id } else { lane.successor = id }
                }
            }
            Some("road") => {
                let element_type = match a.get("elementType") {
                    Some("road") => ElementType::Road,
                    Some("junction") => ElementType::Junction,
                    other => return Err(LoadError::Xml(format!("unknown link elementType {other:?}"))),
                };
                let target = LinkTargetRecord {
                    element_type,
                    element_id: a.string("elementId"),
                    contact_point: a.contact_point()?,
                };
                if let Some(road) = self.road.as_mut() {
                    if tag == "predecessor" {
                        road.link.predecessor = Some(target);
                    } else {
                        road.link.successor = Some(target);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn open_speed(&mut self, a: &Attrs) -> LoadResult<()> {
        let owner = self.parent().map(str::to_owned);
        match owner.as_deref() {
            Some("type") => {
                // "no limit" and "undefined" both mean no limit applies.
                let max = match a.get("max") {
                    None | Some("no limit") | Some("undefined") => None,
                    Some(v) => Some(parse_f64("max", v)?),
                };
                if let Some(road) = self.road.as_mut() {
                    road.speed.push(RoadSpeedRecord { s: self.type_s, max, unit: a.unit()? });
                }
            }
            Some("lane") => {
                if let Some(lane) = self.lane.as_mut() {
                    lane.speed.push(LaneSpeedRecord {
                        s_offset: a.f64("sOffset")?,
                        max: a.f64("max")?,
                        unit: a.unit()?,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, tag: &str) {
        match tag {
            "geometry" => {
                if let (Some(g), Some(road)) = (self.geometry.take(), self.road.as_mut()) {
                    road.plan_view.push(g);
                }
            }
            "lane" => {
                if let (Some(lane), Some(section)) = (self.lane.take(), self.section.as_mut()) {
                    if lane.id != 0 {
                        section.lanes.push(lane);
                    }
                }
            }
            "laneSection" => {
                if let (Some(section), Some(road)) = (self.section.take(), self.road.as_mut()) {
                    road.lane_sections.push(section);
                }
            }
            "road" => {
                if let Some(road) = self.road.take() {
                    self.document.roads.push(road);
                }
            }
            "connection" => {
                if let (Some(connection), Some(junction)) = (self.connection.take(), self.junction.as_mut()) {
                    junction.connections.push(connection);
                }
            }
            "junction" if self.road.is_none() => {
                if let Some(junction) = self.junction.take() {
                    self.document.junctions.push(junction);
                }
            }
            _ => {}
        }
    }
}

fn geometry_kind(tag: &str, a: &Attrs) -> LoadResult<GeometryKindRecord> {
    Ok(match tag {
        "arc" => GeometryKindRecord::Arc { curvature: a.f64("curvature")? },
        "spiral" => GeometryKindRecord::Spiral { curv_start: a.f64("curvStart")?, curv_end: a.f64("curvEnd")? },
        "poly3" => GeometryKindRecord::Poly3 { a: a.f64("a")?, b: a.f64("b")?, c: a.f64("c")?, d: a.f64("d")? },
        "paramPoly3" => GeometryKindRecord::ParamPoly3 {
            au: a.f64("aU")?,
            bu: a.f64("bU")?,
            cu: a.f64("cU")?,
            du: a.f64("dU")?,
            av: a.f64("aV")?,
            bv: a.f64("bV")?,
            cv: a.f64("cV")?,
            dv: a.f64("dV")?,
            arc_length: a.get("pRange") == Some("arcLength"),
        },
        _ => GeometryKindRecord::Line,
    })
}
