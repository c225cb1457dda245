//! BVH reader
//!
//! Parses the `HIERARCHY` section into a [`Hierarchy`] and the `MOTION`
//! section into [`MotionData`]. Braces may be attached to other tokens;
//! channel labels are case-insensitive (`Xposition`, `zROTATION`, ...).

use crate::error::{MotionError, Result};
use crate::kinematics;
use crate::rig::{Axis, Channel, Hierarchy, JointDef, MotionData, Skeleton, Vec3};
use std::path::Path;

/// Parse BVH text
///
/// # Arguments
///
/// * `text` - Full file contents
///
/// # Returns
///
/// The validated joint hierarchy and the raw motion values
///
/// # Errors
///
/// - `MotionError::Hierarchy` for structural problems (missing or duplicate
///   ROOT, unbalanced braces, bad OFFSET/CHANNELS syntax)
/// - `MotionError::Channels` for unusable channel layouts
/// - `MotionError::Motion` for a missing MOTION section or headers
///
/// # Example
///
/// ```
/// use stratum_motion::io::parse_bvh;
///
/// let text = "HIERARCHY\nROOT Hips\n{\n OFFSET 0 0 0\n CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation\n End Site\n {\n  OFFSET 0 1 0\n }\n}\nMOTION\nFrames: 1\nFrame Time: 0.0333333\n0 0 0 0 0 0\n";
/// let (hierarchy, motion) = parse_bvh(text)?;
/// assert_eq!(hierarchy.len(), 2);
/// assert_eq!(motion.values.len(), 6);
/// # Ok::<(), stratum_motion::MotionError>(())
/// ```
pub fn parse_bvh(text: &str) -> Result<(Hierarchy, MotionData)> {
    let lines: Vec<&str> = text.lines().collect();
    let motion_line = lines
        .iter()
        .position(|l| l.trim().eq_ignore_ascii_case("MOTION"))
        .ok_or_else(|| MotionError::motion("missing MOTION section"))?;

    log::debug!(
        "Parsing BVH: {} hierarchy lines, {} motion lines",
        motion_line,
        lines.len() - motion_line - 1
    );

    let hierarchy = parse_hierarchy(&lines[..motion_line])?;
    let motion = parse_motion(&lines[motion_line + 1..])?;
    Ok((hierarchy, motion))
}

/// Read a BVH file and resolve its kinematics
///
/// # Errors
///
/// Any parse or resolution error, or `MotionError::Io` if the file cannot
/// be read.
pub fn load_bvh(path: impl AsRef<Path>) -> Result<Skeleton> {
    let path = path.as_ref();
    log::debug!("Loading BVH file: {}", path.display());
    let text = std::fs::read_to_string(path)?;
    let (hierarchy, motion) = parse_bvh(&text)?;
    kinematics::resolve(&hierarchy, &motion)
}

/// Whitespace token with braces split off, tagged with its 1-based line
struct Tokens<'a> {
    items: Vec<(usize, &'a str)>,
    pos: usize,
    last_line: usize,
}

impl<'a> Tokens<'a> {
    fn new(lines: &[&'a str]) -> Self {
        let mut items = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            for word in line.split_whitespace() {
                let mut rest = word;
                while !rest.is_empty() {
                    match rest.find(['{', '}']) {
                        Some(0) => {
                            items.push((i + 1, &rest[..1]));
                            rest = &rest[1..];
                        }
                        Some(k) => {
                            items.push((i + 1, &rest[..k]));
                            rest = &rest[k..];
                        }
                        None => {
                            items.push((i + 1, rest));
                            rest = "";
                        }
                    }
                }
            }
        }
        Self {
            items,
            pos: 0,
            last_line: lines.len(),
        }
    }

    fn peek(&self) -> Option<(usize, &'a str)> {
        self.items.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<(usize, &'a str)> {
        let item = self.peek();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn line(&self) -> usize {
        self.peek().map_or(self.last_line, |(l, _)| l)
    }

    fn expect_any(&mut self, what: &str) -> Result<(usize, &'a str)> {
        let line = self.line();
        self.next().ok_or_else(|| {
            MotionError::hierarchy(
                line,
                format!("unexpected end of hierarchy, expected {} (unbalanced braces?)", what),
            )
        })
    }

    fn expect(&mut self, keyword: &str) -> Result<usize> {
        let (line, tok) = self.expect_any(keyword)?;
        if tok.eq_ignore_ascii_case(keyword) {
            Ok(line)
        } else {
            Err(MotionError::hierarchy(
                line,
                format!("expected '{}', found '{}'", keyword, tok),
            ))
        }
    }

    fn number(&mut self, what: &str) -> Result<f64> {
        let (line, tok) = self.expect_any(what)?;
        tok.parse::<f64>()
            .map_err(|_| MotionError::hierarchy(line, format!("invalid {} value '{}'", what, tok)))
    }
}

fn parse_hierarchy(lines: &[&str]) -> Result<Hierarchy> {
    let mut tokens = Tokens::new(lines);
    tokens.expect("HIERARCHY")?;

    let (line, tok) = tokens.expect_any("ROOT")?;
    if !tok.eq_ignore_ascii_case("ROOT") {
        return Err(MotionError::hierarchy(line, format!("expected ROOT, found '{}'", tok)));
    }

    let mut hierarchy = Hierarchy::new();
    let (_, name) = tokens.expect_any("root name")?;
    parse_joint_body(&mut tokens, &mut hierarchy, name, None)?;

    if let Some((line, tok)) = tokens.next() {
        let message = if tok.eq_ignore_ascii_case("ROOT") {
            "duplicate ROOT".to_string()
        } else if tok == "}" {
            "unexpected '}' (unbalanced braces)".to_string()
        } else {
            format!("unexpected token '{}' after root", tok)
        };
        return Err(MotionError::hierarchy(line, message));
    }

    hierarchy.validate()?;
    log::debug!(
        "Parsed hierarchy: {} joints, {} channels",
        hierarchy.len(),
        hierarchy.channel_count()
    );
    Ok(hierarchy)
}

/// Parse `{ OFFSET .. CHANNELS .. children }` of a ROOT or JOINT.
fn parse_joint_body(
    tokens: &mut Tokens<'_>,
    hierarchy: &mut Hierarchy,
    name: &str,
    parent: Option<usize>,
) -> Result<()> {
    tokens.expect("{")?;

    let mut offset: Vec3 = [0.0; 3];
    let mut channels: Vec<Channel> = Vec::new();
    let mut index: Option<usize> = None;

    loop {
        let (line, tok) = tokens.expect_any("'}'")?;
        match tok.to_ascii_uppercase().as_str() {
            "OFFSET" => offset = parse_offset(tokens)?,
            "CHANNELS" => channels = parse_channels(tokens, name, line)?,
            "JOINT" | "END" => {
                // Register this joint before its children so indices stay parent-first.
                let me = match index {
                    Some(i) => i,
                    None => {
                        let i = push_joint(hierarchy, name, parent, offset, std::mem::take(&mut channels));
                        index = Some(i);
                        i
                    }
                };
                if tok.eq_ignore_ascii_case("JOINT") {
                    let (_, child) = tokens.expect_any("joint name")?;
                    parse_joint_body(tokens, hierarchy, child, Some(me))?;
                } else {
                    tokens.expect("Site")?;
                    parse_end_site(tokens, hierarchy, name, me)?;
                }
            }
            "}" => break,
            "ROOT" => return Err(MotionError::hierarchy(line, "duplicate ROOT")),
            _ => {
                return Err(MotionError::hierarchy(
                    line,
                    format!("unexpected token '{}' in joint '{}'", tok, name),
                ))
            }
        }
    }

    if index.is_none() {
        push_joint(hierarchy, name, parent, offset, channels);
    }
    Ok(())
}

fn push_joint(
    hierarchy: &mut Hierarchy,
    name: &str,
    parent: Option<usize>,
    offset: Vec3,
    channels: Vec<Channel>,
) -> usize {
    let def = match parent {
        None => JointDef::root(name, offset, channels),
        Some(p) => JointDef::joint(name, p, offset, channels),
    };
    hierarchy.push(def)
}

fn parse_end_site(
    tokens: &mut Tokens<'_>,
    hierarchy: &mut Hierarchy,
    parent_name: &str,
    parent: usize,
) -> Result<()> {
    tokens.expect("{")?;
    let mut offset: Vec3 = [0.0; 3];
    loop {
        let (line, tok) = tokens.expect_any("'}'")?;
        if tok.eq_ignore_ascii_case("OFFSET") {
            offset = parse_offset(tokens)?;
        } else if tok == "}" {
            break;
        } else {
            return Err(MotionError::hierarchy(
                line,
                format!("unexpected token '{}' in end site", tok),
            ));
        }
    }
    hierarchy.push(JointDef::end_site(format!("{}_End", parent_name), parent, offset));
    Ok(())
}

fn parse_offset(tokens: &mut Tokens<'_>) -> Result<Vec3> {
    Ok([
        tokens.number("OFFSET")?,
        tokens.number("OFFSET")?,
        tokens.number("OFFSET")?,
    ])
}

fn parse_channels(tokens: &mut Tokens<'_>, joint: &str, line: usize) -> Result<Vec<Channel>> {
    let (_, count_tok) = tokens.expect_any("channel count")?;
    let count: usize = count_tok.parse().map_err(|_| {
        MotionError::hierarchy(line, format!("invalid channel count '{}'", count_tok))
    })?;
    if count != 3 && count != 6 {
        return Err(MotionError::channels(
            joint,
            format!("expected 3 or 6 channels, got {}", count),
        ));
    }

    let mut channels = Vec::with_capacity(count);
    for _ in 0..count {
        let (_, label) = tokens.expect_any("channel label")?;
        channels.push(parse_channel_label(label).ok_or_else(|| {
            MotionError::channels(joint, format!("unknown channel label '{}'", label))
        })?);
    }
    Ok(channels)
}

fn parse_channel_label(label: &str) -> Option<Channel> {
    let mut chars = label.chars();
    let axis = Axis::from_letter(chars.next()?)?;
    let kind = chars.as_str().to_ascii_lowercase();
    match kind.as_str() {
        "position" => Some(Channel::Position(axis)),
        "rotation" => Some(Channel::Rotation(axis)),
        _ => None,
    }
}

fn parse_motion(lines: &[&str]) -> Result<MotionData> {
    let mut declared_frames: Option<usize> = None;
    let mut frame_time: Option<f64> = None;
    let mut data_start = lines.len();

    for (i, line) in lines.iter().enumerate() {
        let tok: Vec<&str> = line.split_whitespace().collect();
        if tok.is_empty() {
            continue;
        }
        let head = tok[0].to_ascii_lowercase();
        if declared_frames.is_none() && head.starts_with("frames") {
            let value = header_value(&tok, 1)
                .ok_or_else(|| MotionError::motion("missing value after 'Frames:'"))?;
            declared_frames = Some(value.parse().map_err(|_| {
                MotionError::motion(format!("invalid frame count '{}'", value))
            })?);
        } else if frame_time.is_none() && head == "frame" && tok.get(1).is_some_and(|t| t.to_ascii_lowercase().starts_with("time")) {
            let value = header_value(&tok, 2)
                .ok_or_else(|| MotionError::motion("missing value after 'Frame Time:'"))?;
            frame_time = Some(value.parse().map_err(|_| {
                MotionError::motion(format!("invalid frame time '{}'", value))
            })?);
        }
        if declared_frames.is_some() && frame_time.is_some() {
            data_start = i + 1;
            break;
        }
    }

    let declared_frames = declared_frames.ok_or_else(|| MotionError::motion("missing 'Frames:' header"))?;
    let frame_time = frame_time.ok_or_else(|| MotionError::motion("missing 'Frame Time:' header"))?;

    // Stray non-numeric tokens are skipped.
    let values: Vec<f64> = lines[data_start..]
        .iter()
        .flat_map(|l| l.split_whitespace())
        .filter_map(|s| s.parse::<f64>().ok())
        .collect();

    log::debug!(
        "Parsed motion: declared {} frames, frame_time={}, {} values",
        declared_frames,
        frame_time,
        values.len()
    );
    Ok(MotionData {
        frame_time,
        declared_frames,
        values,
    })
}

/// Value of `Frames: 12` / `Frame Time: 0.03`, also accepting `Frames:12`.
fn header_value<'a>(tok: &[&'a str], index: usize) -> Option<&'a str> {
    let key = tok[index - 1];
    match key.split_once(':') {
        Some((_, rest)) if !rest.is_empty() => Some(rest),
        _ => tok.get(index).copied(),
    }
}
