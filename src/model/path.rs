//! Abbreviated path data
//!
//! OFD paths are a compact command string: `M x y`, `L x y`,
//! `Q cx cy x y`, `B x1 y1 x2 y2 x3 y3`, `A rx ry rot large sweep x y`
//! and `C` (close). Coordinate pairs following an `M` or `L` without an
//! intervening letter are implicit line-tos.

use std::fmt;
use std::fmt::Write as _;

use crate::error::{Error, Result};
use crate::model::scalar::Pos;

/// Parameters of an elliptical arc segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcData {
    pub rx: f64,
    pub ry: f64,
    /// X-axis rotation in degrees.
    pub rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
    pub end: Pos,
}

/// A single path command.
#[derive(Debug, Clone, PartialEq)]
pub enum PathCommand {
    Move(Pos),
    Line(Pos),
    /// Quadratic Bézier: control point, end point.
    Quad(Pos, Pos),
    /// Cubic Bézier: two control points, end point.
    Cubic(Pos, Pos, Pos),
    Arc(ArcData),
    Close,
}

/// An ordered list of path commands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathData(pub Vec<PathCommand>);

impl PathData {
    /// Parse an abbreviated-data string.
    pub fn parse(data: &str) -> Result<PathData> {
        let tokens: Vec<&str> = data.split_whitespace().collect();
        let mut commands = Vec::new();
        let mut idx = 0;
        let mut has_current = false;

        while idx < tokens.len() {
            match tokens[idx] {
                "M" | "S" => {
                    let p = take_point(&tokens, idx + 1, "M")?;
                    commands.push(PathCommand::Move(p));
                    has_current = true;
                    idx += 3;
                }
                "L" => {
                    require_current(has_current, "L")?;
                    let p = take_point(&tokens, idx + 1, "L")?;
                    commands.push(PathCommand::Line(p));
                    idx += 3;
                }
                "Q" => {
                    require_current(has_current, "Q")?;
                    let c = take_point(&tokens, idx + 1, "Q")?;
                    let p = take_point(&tokens, idx + 3, "Q")?;
                    commands.push(PathCommand::Quad(c, p));
                    idx += 5;
                }
                "B" => {
                    require_current(has_current, "B")?;
                    let c1 = take_point(&tokens, idx + 1, "B")?;
                    let c2 = take_point(&tokens, idx + 3, "B")?;
                    let p = take_point(&tokens, idx + 5, "B")?;
                    commands.push(PathCommand::Cubic(c1, c2, p));
                    idx += 7;
                }
                "A" => {
                    require_current(has_current, "A")?;
                    if idx + 7 >= tokens.len() {
                        return Err(Error::Parse("A command needs 7 parameters".to_string()));
                    }
                    let rx = take_number(&tokens, idx + 1, "A rx")?;
                    let ry = take_number(&tokens, idx + 2, "A ry")?;
                    let rotation = take_number(&tokens, idx + 3, "A rotation")?;
                    let large = take_number(&tokens, idx + 4, "A large-arc flag")?;
                    let sweep = take_number(&tokens, idx + 5, "A sweep flag")?;
                    let end = take_point(&tokens, idx + 6, "A")?;
                    commands.push(PathCommand::Arc(ArcData {
                        rx: rx.abs(),
                        ry: ry.abs(),
                        rotation,
                        large_arc: large != 0.0,
                        sweep: sweep != 0.0,
                        end,
                    }));
                    idx += 8;
                }
                "C" => {
                    commands.push(PathCommand::Close);
                    idx += 1;
                }
                token => {
                    // A bare coordinate pair after M/L continues as line-tos.
                    let implicit_ok = matches!(
                        commands.last(),
                        Some(PathCommand::Move(_)) | Some(PathCommand::Line(_))
                    );
                    if implicit_ok && token.parse::<f64>().is_ok() {
                        let p = take_point(&tokens, idx, "implicit L")?;
                        commands.push(PathCommand::Line(p));
                        idx += 2;
                    } else {
                        return Err(Error::Parse(format!("unrecognised path token '{token}'")));
                    }
                }
            }
        }

        Ok(PathData(commands))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, cmd: PathCommand) {
        self.0.push(cmd);
    }

    /// Axis-aligned envelope of all explicit points. Arc segments contribute
    /// their endpoints only.
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        let mut update = |p: &Pos| {
            bounds = Some(match bounds {
                None => (p.x, p.y, p.x, p.y),
                Some((x0, y0, x1, y1)) => (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
            });
        };
        for cmd in &self.0 {
            match cmd {
                PathCommand::Move(p) | PathCommand::Line(p) => update(p),
                PathCommand::Quad(c, p) => {
                    update(c);
                    update(p);
                }
                PathCommand::Cubic(c1, c2, p) => {
                    update(c1);
                    update(c2);
                    update(p);
                }
                PathCommand::Arc(arc) => update(&arc.end),
                PathCommand::Close => {}
            }
        }
        bounds
    }

    /// An axis-aligned rectangle as path data.
    pub fn rect(x: f64, y: f64, w: f64, h: f64) -> PathData {
        PathData(vec![
            PathCommand::Move(Pos::new(x, y)),
            PathCommand::Line(Pos::new(x + w, y)),
            PathCommand::Line(Pos::new(x + w, y + h)),
            PathCommand::Line(Pos::new(x, y + h)),
            PathCommand::Close,
        ])
    }
}

fn require_current(has_current: bool, cmd: &str) -> Result<()> {
    if has_current {
        Ok(())
    } else {
        Err(Error::Parse(format!("{cmd} command without a preceding M")))
    }
}

fn take_number(tokens: &[&str], idx: usize, what: &str) -> Result<f64> {
    let token = tokens
        .get(idx)
        .ok_or_else(|| Error::Parse(format!("{what}: missing value at token {idx}")))?;
    token
        .parse::<f64>()
        .map_err(|e| Error::Parse(format!("{what}: invalid number '{token}' at token {idx}: {e}")))
}

fn take_point(tokens: &[&str], idx: usize, cmd: &str) -> Result<Pos> {
    Ok(Pos::new(
        take_number(tokens, idx, &format!("{cmd} x"))?,
        take_number(tokens, idx + 1, &format!("{cmd} y"))?,
    ))
}

impl fmt::Display for PathData {
    /// Emits commands space-separated with two decimal places per
    /// coordinate; flags emit as `0`/`1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for (i, cmd) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            match cmd {
                PathCommand::Move(p) => write!(out, "M {:.2} {:.2}", p.x, p.y)?,
                PathCommand::Line(p) => write!(out, "L {:.2} {:.2}", p.x, p.y)?,
                PathCommand::Quad(c, p) => {
                    write!(out, "Q {:.2} {:.2} {:.2} {:.2}", c.x, c.y, p.x, p.y)?
                }
                PathCommand::Cubic(c1, c2, p) => write!(
                    out,
                    "B {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
                    c1.x, c1.y, c2.x, c2.y, p.x, p.y
                )?,
                PathCommand::Arc(arc) => write!(
                    out,
                    "A {:.2} {:.2} {:.2} {} {} {:.2} {:.2}",
                    arc.rx,
                    arc.ry,
                    arc.rotation,
                    arc.large_arc as u8,
                    arc.sweep as u8,
                    arc.end.x,
                    arc.end.y
                )?,
                PathCommand::Close => out.push('C'),
            }
        }
        f.write_str(&out)
    }
}
