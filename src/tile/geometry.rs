use super::proto::GeomType;

const MOVE_TO: u32 = 1;
const LINE_TO: u32 = 2;
const CLOSE_PATH: u32 = 7;

/// A position in tile space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box in tile space, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub min: Coord,
    pub max: Coord,
}

impl Bound {
    #[must_use]
    pub fn contains(&self, c: Coord) -> bool {
        c.x >= self.min.x && c.x <= self.max.x && c.y >= self.min.y && c.y <= self.max.y
    }
}

/// A closed ring without its repeated closing point.
pub type Ring = Vec<Coord>;

/// Exterior ring first, then its holes.
pub type Polygon = Vec<Ring>;

/// Decoded feature geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Points(Vec<Coord>),
    Lines(Vec<Vec<Coord>>),
    Polygons(Vec<Polygon>),
    /// Geometry of type `UNKNOWN`, carried through as raw commands.
    Unknown(Vec<u32>),
}

impl Geometry {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Points(points) => points.is_empty(),
            Geometry::Lines(lines) => lines.is_empty(),
            Geometry::Polygons(polygons) => polygons.is_empty(),
            Geometry::Unknown(commands) => commands.is_empty(),
        }
    }

    /// Round every coordinate to `decimals` decimal places.
    #[must_use]
    pub fn round(mut self, decimals: i32) -> Geometry {
        let factor = 10_f64.powi(decimals);
        self.for_each_coord(|c| {
            c.x = (c.x * factor).round() / factor;
            c.y = (c.y * factor).round() / factor;
        });
        self
    }

    fn for_each_coord(&mut self, mut f: impl FnMut(&mut Coord)) {
        match self {
            Geometry::Points(points) => points.iter_mut().for_each(f),
            Geometry::Lines(lines) => lines.iter_mut().flatten().for_each(f),
            Geometry::Polygons(polygons) => {
                polygons.iter_mut().flatten().flatten().for_each(&mut f);
            }
            Geometry::Unknown(_) => {}
        }
    }

    /// Clip to `bound`. Lines may split into several pieces; rings are clipped
    /// with Sutherland-Hodgman and a polygon whose exterior vanishes is dropped
    /// with its holes.
    #[must_use]
    pub fn clip(&self, bound: &Bound) -> Geometry {
        match self {
            Geometry::Points(points) => {
                Geometry::Points(points.iter().copied().filter(|p| bound.contains(*p)).collect())
            }
            Geometry::Lines(lines) => Geometry::Lines(
                lines
                    .iter()
                    .flat_map(|line| clip_line(line, bound))
                    .collect(),
            ),
            Geometry::Polygons(polygons) => Geometry::Polygons(
                polygons
                    .iter()
                    .filter_map(|polygon| clip_polygon(polygon, bound))
                    .collect(),
            ),
            Geometry::Unknown(commands) => Geometry::Unknown(commands.clone()),
        }
    }

    #[must_use]
    pub fn geom_type(&self) -> GeomType {
        match self {
            Geometry::Points(_) => GeomType::Point,
            Geometry::Lines(_) => GeomType::Linestring,
            Geometry::Polygons(_) => GeomType::Polygon,
            Geometry::Unknown(_) => GeomType::Unknown,
        }
    }
}

// -- Clipping ---------------------------------------------------------------

fn clip_line(line: &[Coord], bound: &Bound) -> Vec<Vec<Coord>> {
    let mut pieces = Vec::new();
    let mut current: Vec<Coord> = Vec::new();

    for segment in line.windows(2) {
        let (a, b) = (segment[0], segment[1]);
        match clip_segment(a, b, bound) {
            Some((start, end)) => {
                if current.last() != Some(&start) {
                    flush(&mut current, &mut pieces);
                    current.push(start);
                }
                current.push(end);
                if end != b {
                    flush(&mut current, &mut pieces);
                }
            }
            None => flush(&mut current, &mut pieces),
        }
    }
    flush(&mut current, &mut pieces);
    pieces
}

fn flush(current: &mut Vec<Coord>, pieces: &mut Vec<Vec<Coord>>) {
    if current.len() >= 2 {
        pieces.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

/// Liang-Barsky. Endpoints inside the bound are returned unchanged.
fn clip_segment(a: Coord, b: Coord, bound: &Bound) -> Option<(Coord, Coord)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (p, q) in [
        (-dx, a.x - bound.min.x),
        (dx, bound.max.x - a.x),
        (-dy, a.y - bound.min.y),
        (dy, bound.max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| Coord::new(a.x + t * dx, a.y + t * dy);
    let start = if t0 > 0.0 { at(t0) } else { a };
    let end = if t1 < 1.0 { at(t1) } else { b };
    Some((start, end))
}

#[derive(Clone, Copy)]
enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    fn inside(self, c: Coord, bound: &Bound) -> bool {
        match self {
            Edge::Left => c.x >= bound.min.x,
            Edge::Right => c.x <= bound.max.x,
            Edge::Top => c.y >= bound.min.y,
            Edge::Bottom => c.y <= bound.max.y,
        }
    }

    fn intersect(self, a: Coord, b: Coord, bound: &Bound) -> Coord {
        match self {
            Edge::Left | Edge::Right => {
                let x = if matches!(self, Edge::Left) { bound.min.x } else { bound.max.x };
                let t = (x - a.x) / (b.x - a.x);
                Coord::new(x, a.y + t * (b.y - a.y))
            }
            Edge::Top | Edge::Bottom => {
                let y = if matches!(self, Edge::Top) { bound.min.y } else { bound.max.y };
                let t = (y - a.y) / (b.y - a.y);
                Coord::new(a.x + t * (b.x - a.x), y)
            }
        }
    }
}

fn clip_ring(ring: &[Coord], bound: &Bound) -> Ring {
    let mut out = ring.to_vec();
    for edge in [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom] {
        let input = std::mem::take(&mut out);
        let Some(&last) = input.last() else {
            break;
        };
        let mut prev = last;
        for &cur in &input {
            let cur_in = edge.inside(cur, bound);
            let prev_in = edge.inside(prev, bound);
            if cur_in {
                if !prev_in {
                    out.push(edge.intersect(prev, cur, bound));
                }
                out.push(cur);
            } else if prev_in {
                out.push(edge.intersect(prev, cur, bound));
            }
            prev = cur;
        }
    }
    out
}

fn clip_polygon(polygon: &[Ring], bound: &Bound) -> Option<Polygon> {
    let (exterior, holes) = polygon.split_first()?;
    let exterior = clip_ring(exterior, bound);
    if exterior.len() < 3 {
        return None;
    }
    let mut out = vec![exterior];
    out.extend(
        holes
            .iter()
            .map(|hole| clip_ring(hole, bound))
            .filter(|hole| hole.len() >= 3),
    );
    Some(out)
}

/// Twice the signed area by the surveyor's formula. Positive for exterior
/// rings in tile space (y pointing down).
fn signed_area(ring: &[Coord]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}

// -- Command stream ---------------------------------------------------------

fn zigzag_decode(n: u32) -> i64 {
    i64::from(n >> 1) ^ -i64::from(n & 1)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn zigzag_encode(n: i64) -> u32 {
    ((n << 1) ^ (n >> 63)) as u32
}

fn command(id: u32, count: usize) -> u32 {
    #[allow(clippy::cast_possible_truncation)]
    let count = count as u32;
    (id & 0x7) | (count << 3)
}

struct Cursor<'a> {
    commands: &'a [u32],
    pos: usize,
    x: i64,
    y: i64,
}

impl<'a> Cursor<'a> {
    fn new(commands: &'a [u32]) -> Self {
        Self {
            commands,
            pos: 0,
            x: 0,
            y: 0,
        }
    }

    fn next_command(&mut self) -> Option<(u32, usize)> {
        let c = *self.commands.get(self.pos)?;
        self.pos += 1;
        Some((c & 0x7, (c >> 3) as usize))
    }

    #[allow(clippy::cast_precision_loss)]
    fn next_point(&mut self) -> Result<Coord, &'static str> {
        let (Some(&dx), Some(&dy)) = (
            self.commands.get(self.pos),
            self.commands.get(self.pos + 1),
        ) else {
            return Err("truncated command parameters");
        };
        self.pos += 2;
        self.x += zigzag_decode(dx);
        self.y += zigzag_decode(dy);
        Ok(Coord::new(self.x as f64, self.y as f64))
    }
}

/// Decode a feature's command stream.
///
/// # Errors
///
/// Returns a static reason when the command stream is malformed for `kind`.
pub fn decode(kind: GeomType, commands: &[u32]) -> Result<Geometry, &'static str> {
    let mut cursor = Cursor::new(commands);
    match kind {
        GeomType::Unknown => Ok(Geometry::Unknown(commands.to_vec())),
        GeomType::Point => {
            let mut points = Vec::new();
            while let Some((id, count)) = cursor.next_command() {
                if id != MOVE_TO {
                    return Err("point geometry may only contain MoveTo");
                }
                for _ in 0..count {
                    points.push(cursor.next_point()?);
                }
            }
            Ok(Geometry::Points(points))
        }
        GeomType::Linestring => Ok(Geometry::Lines(paths(&mut cursor, false)?)),
        GeomType::Polygon => {
            let mut polygons: Vec<Polygon> = Vec::new();
            // Version 1 tiles need not follow the winding rule, so the first
            // ring is always an exterior whatever its orientation.
            for ring in paths(&mut cursor, true)? {
                match polygons.last_mut() {
                    Some(polygon) if signed_area(&ring) <= 0.0 => polygon.push(ring),
                    _ => polygons.push(vec![ring]),
                }
            }
            Ok(Geometry::Polygons(polygons))
        }
    }
}

fn paths(cursor: &mut Cursor<'_>, closed: bool) -> Result<Vec<Vec<Coord>>, &'static str> {
    let mut out = Vec::new();
    let mut current: Option<Vec<Coord>> = None;

    while let Some((id, count)) = cursor.next_command() {
        match id {
            MOVE_TO => {
                if count != 1 {
                    return Err("MoveTo in a path must have a count of 1");
                }
                if let Some(path) = current.take() {
                    if closed {
                        return Err("ring is missing ClosePath");
                    }
                    out.push(path);
                }
                current = Some(vec![cursor.next_point()?]);
            }
            LINE_TO => {
                let path = current.as_mut().ok_or("LineTo before MoveTo")?;
                for _ in 0..count {
                    path.push(cursor.next_point()?);
                }
            }
            CLOSE_PATH if closed => {
                let ring = current.take().ok_or("ClosePath before MoveTo")?;
                out.push(ring);
            }
            CLOSE_PATH => return Err("ClosePath in a line geometry"),
            _ => return Err("unknown geometry command"),
        }
    }

    if let Some(path) = current {
        if closed {
            return Err("ring is missing ClosePath");
        }
        out.push(path);
    }
    Ok(out)
}

#[allow(clippy::cast_possible_truncation)]
fn to_grid(c: Coord) -> (i64, i64) {
    (c.x.round() as i64, c.y.round() as i64)
}

fn snap(path: &[Coord]) -> Vec<(i64, i64)> {
    let mut out: Vec<(i64, i64)> = path.iter().map(|&c| to_grid(c)).collect();
    out.dedup();
    out
}

struct Encoder {
    out: Vec<u32>,
    x: i64,
    y: i64,
}

impl Encoder {
    fn point(&mut self, (x, y): (i64, i64)) {
        self.out.push(zigzag_encode(x - self.x));
        self.out.push(zigzag_encode(y - self.y));
        self.x = x;
        self.y = y;
    }

    fn path(&mut self, path: &[(i64, i64)], close: bool) {
        self.out.push(command(MOVE_TO, 1));
        self.point(path[0]);
        self.out.push(command(LINE_TO, path.len() - 1));
        for &p in &path[1..] {
            self.point(p);
        }
        if close {
            self.out.push(command(CLOSE_PATH, 1));
        }
    }
}

/// Encode a geometry onto the integer tile grid. Degenerate lines and rings
/// are dropped; returns `None` when nothing drawable remains.
#[must_use]
pub fn encode(geometry: &Geometry) -> Option<(GeomType, Vec<u32>)> {
    let mut enc = Encoder {
        out: Vec::new(),
        x: 0,
        y: 0,
    };

    match geometry {
        Geometry::Unknown(commands) => {
            return (!commands.is_empty()).then(|| (GeomType::Unknown, commands.clone()));
        }
        Geometry::Points(points) => {
            if !points.is_empty() {
                enc.out.push(command(MOVE_TO, points.len()));
                for &p in points {
                    enc.point(to_grid(p));
                }
            }
        }
        Geometry::Lines(lines) => {
            for line in lines {
                let line = snap(line);
                if line.len() >= 2 {
                    enc.path(&line, false);
                }
            }
        }
        Geometry::Polygons(polygons) => {
            for polygon in polygons {
                for (i, ring) in polygon.iter().enumerate() {
                    let mut ring = snap(ring);
                    if ring.len() > 1 && ring.first() == ring.last() {
                        ring.pop();
                    }
                    if ring.len() < 3 {
                        if i == 0 {
                            break;
                        }
                        continue;
                    }
                    enc.path(&ring, true);
                }
            }
        }
    }

    (!enc.out.is_empty()).then(|| (geometry.geom_type(), enc.out))
}
